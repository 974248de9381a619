//! Crate-level configuration, loaded from an optional `tfexpr.toml`.
//!
//! Mirrors `config::loader`'s shape of "typed struct with a `Default` impl,
//! optionally overridden from a file on disk" — just with `toml`/`serde`
//! instead of HCL, since this is the CLI's own settings file, not a
//! Terraform configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// The identifier to use when the caller doesn't pin one explicitly.
fn default_count_index() -> String {
    "i".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TfExprConfig {
    /// Default `count.index` identifier used when emitting resource
    /// attributes bound inside a `count` scope.
    pub count_index: String,
}

impl Default for TfExprConfig {
    fn default() -> Self {
        Self {
            count_index: default_count_index(),
        }
    }
}

/// Load `tfexpr.toml` from `path`, or fall back to `TfExprConfig::default()`
/// if it doesn't exist.
pub fn load_or_default(path: &Path) -> Result<TfExprConfig> {
    if !path.exists() {
        return Ok(TfExprConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_count_index_is_i() {
        assert_eq!(TfExprConfig::default().count_index, "i");
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let config = load_or_default(Path::new("/nonexistent/tfexpr.toml")).unwrap();
        assert_eq!(config.count_index, "i");
    }
}
