use std::path::Path;

use anyhow::Result;

use crate::config::types::WorkspaceConfig;

/// Load a directory of `.tf` files into a `WorkspaceConfig`.
///
/// This crate's environment is built straight from parsed HCL, so loading
/// here is just the HCL half of a broader workspace loader.
pub fn load_workspace(path: &Path) -> Result<WorkspaceConfig> {
    tracing::info!(path = %path.display(), "Loading Terraform configuration");
    crate::hcl::parse_directory(path)
}
