#![allow(dead_code)]

pub mod ast;
pub mod binder;
pub mod bound;
pub mod config;
pub mod emitter;
pub mod env;
pub mod error;
pub mod hcl;
pub mod lattice;
pub mod schema;

use crate::binder::BindFlags;
use crate::bound::BoundNode;
use crate::emitter::EmitContext;
use crate::env::Environment;
use crate::error::BindError;

/// Bind a source AST node against an environment, producing a typed bound
/// tree. The top-level entry point a containing program drives.
pub fn bind(node: &ast::Node, env: &Environment, flags: BindFlags) -> Result<BoundNode, BindError> {
    binder::bind(node, env, flags)
}

/// Emit a bound tree as a target-language expression string.
pub fn emit(node: &BoundNode, ctx: &EmitContext) -> String {
    emitter::emit(node, ctx)
}
