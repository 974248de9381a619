//! The closed, untyped interpolation AST the binder consumes.
//!
//! Narrowed from `config::types::Expression`'s general-purpose HCL IR down
//! to exactly the seven node shapes this crate's binder accepts. `from_hcl`
//! is the adapter: it walks an `Expression` tree the same way
//! `hcl::parser::hcl_expr_to_expression` produces it, and fails closed on
//! anything outside the closed set (`ForExpr`, `GetAttr`, `UnaryOp`, and
//! `Splat` have no counterpart here).

use crate::config::types::{BinOp, Expression, TemplatePart, Value};
use crate::error::BindError;

/// The untyped source AST. One variant per shape the binder dispatches on.
#[derive(Debug, Clone)]
pub enum Node {
    /// An n-ary arithmetic/comparison/logical operation.
    Arithmetic { op: BinOp, operands: Vec<Node> },
    /// A call to one of the closed set of supported functions.
    Call { name: String, args: Vec<Node> },
    Conditional {
        cond: Box<Node>,
        true_val: Box<Node>,
        false_val: Box<Node>,
    },
    Index { target: Box<Node>, key: Box<Node> },
    Literal(Value),
    /// String interpolation: an ordered sequence of sub-expressions.
    Output(Vec<Node>),
    /// An unresolved variable reference, as a dotted path
    /// (`["var", "name"]`, `["aws_s3_bucket", "b", "arn"]`, `["count", "index"]`, ...).
    VariableAccess(Vec<String>),
}

/// Convert the general-purpose HCL IR into this crate's closed source AST.
///
/// Fails with `UnexpectedNodeKind` for any `Expression` shape outside the
/// closed set — this is how the binder's module/local/self/path/terraform
/// exclusions actually get enforced: those variables parse fine into
/// `Reference`, but `ForExpr`/`GetAttr`/`UnaryOp`/`Splat` never reach the
/// binder at all.
pub fn from_hcl(expr: &Expression) -> Result<Node, BindError> {
    match expr {
        Expression::Literal(v) => Ok(Node::Literal(v.clone())),

        Expression::Reference(path) => {
            Ok(Node::VariableAccess(path.iter().map(|s| strip_brackets(s)).collect()))
        }

        Expression::FunctionCall { name, args } => {
            let args = args.iter().map(from_hcl).collect::<Result<Vec<_>, _>>()?;
            Ok(Node::Call {
                name: name.clone(),
                args,
            })
        }

        Expression::Conditional {
            condition,
            true_val,
            false_val,
        } => Ok(Node::Conditional {
            cond: Box::new(from_hcl(condition)?),
            true_val: Box::new(from_hcl(true_val)?),
            false_val: Box::new(from_hcl(false_val)?),
        }),

        Expression::Template(parts) => {
            let children = parts
                .iter()
                .map(|part| match part {
                    TemplatePart::Literal(s) => Ok(Node::Literal(Value::String(s.clone()))),
                    TemplatePart::Interpolation(e) | TemplatePart::Directive(e) => from_hcl(e),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::Output(children))
        }

        Expression::Index { collection, key } => Ok(Node::Index {
            target: Box::new(from_hcl(collection)?),
            key: Box::new(from_hcl(key)?),
        }),

        Expression::BinaryOp { op, left, right } => Ok(Node::Arithmetic {
            op: *op,
            operands: vec![from_hcl(left)?, from_hcl(right)?],
        }),

        Expression::ForExpr { .. } => Err(BindError::UnexpectedNodeKind("for_expr")),
        Expression::GetAttr { .. } => Err(BindError::UnexpectedNodeKind("get_attr")),
        Expression::UnaryOp { .. } => Err(BindError::UnexpectedNodeKind("unary_op")),
        Expression::Splat { .. } => Err(BindError::UnexpectedNodeKind("splat")),
    }
}

/// `hcl::parser::hcl_expr_to_expression` renders traversal index/splat
/// operators as bracket-wrapped segments (`"[0]"`, `"[*]"`) so a `Reference`
/// path stays a flat `Vec<String>`. The binder's multi-reference handling
/// expects the bare marker (`"0"`, `"*"`) instead, so strip the brackets
/// here rather than teach the binder about traversal syntax.
fn strip_brackets(segment: &str) -> String {
    match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => inner.to_string(),
        None => segment.to_string(),
    }
}
