//! The closed, classified error set the binder surfaces at its boundary.
//!
//! `thiserror` instead of `anyhow::bail!` here: callers need to match on the
//! *kind* of failure (is this something the user can fix by editing their
//! config, or not?) rather than just display a message. `anyhow` is still
//! used at the CLI layer, where a chain of "caused by" context is exactly
//! what's wanted.

use crate::env::ResourceId;

/// A binder failure. Fatal for the expression being bound; never partial.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum BindError {
    #[error("unknown resource: {0}")]
    UnknownResource(ResourceId),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("unsupported count field: count.{0}")]
    UnsupportedCountField(String),

    #[error("count.index referenced outside a counted resource")]
    CountIndexNotInScope,

    #[error("unsupported function call: {0}")]
    UnsupportedCall(String),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("unexpected node kind: {0}")]
    UnexpectedNodeKind(&'static str),

    #[error("unexpected literal type")]
    UnexpectedLiteralType,
}
