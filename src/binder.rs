//! The binder: source AST → typed, environment-resolved bound tree.
//!
//! Pure recursive descent with one case per `ast::Node` variant, the same
//! one-function-per-IR-variant shape as `hcl::parser::hcl_expr_to_expression`,
//! but producing a typed tree instead of a same-language IR, and able to
//! fail closed with a classified `BindError` instead of panicking on a
//! malformed input.

use crate::ast::Node;
use crate::bound::{BoundNode, Function, Handle, LiteralValue, ResourceIndex, VarClass};
use crate::config::types::Value;
use crate::env::{Environment, ResourceId};
use crate::error::BindError;
use crate::lattice::Type;

/// Binder-local state threaded through a single `bind` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindFlags {
    /// Whether the expression being bound is inside a resource with
    /// `count`, so `count.index` is in scope.
    pub has_count_index: bool,
}

/// Bind a source AST node against `env`, producing a typed bound tree.
///
/// Binding is pure: it never mutates `node` or `env`, and binding the same
/// inputs twice yields structurally equal bound trees.
pub fn bind(node: &Node, env: &Environment, flags: BindFlags) -> Result<BoundNode, BindError> {
    match node {
        Node::Literal(value) => bind_literal(value),

        Node::Arithmetic { op, operands } => {
            let bound_operands = operands
                .iter()
                .map(|o| bind(o, env, flags))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BoundNode::Arithmetic {
                op: *op,
                operands: bound_operands,
                ty: Type::NUMBER,
            })
        }

        Node::Call { name, args } => bind_call(name, args, env, flags),

        Node::Conditional {
            cond,
            true_val,
            false_val,
        } => {
            let cond = bind(cond, env, flags)?;
            let true_val = bind(true_val, env, flags)?;
            let false_val = bind(false_val, env, flags)?;
            let ty = if true_val.typ() == false_val.typ() {
                true_val.typ()
            } else {
                Type::UNKNOWN
            };
            Ok(BoundNode::Conditional {
                cond: Box::new(cond),
                true_val: Box::new(true_val),
                false_val: Box::new(false_val),
                ty,
            })
        }

        Node::Index { target, key } => {
            let target = bind(target, env, flags)?;
            let key = bind(key, env, flags)?;
            let ty = if target.typ().is_list() {
                target.typ().element_type()
            } else {
                Type::UNKNOWN
            };
            Ok(BoundNode::Index {
                target: Box::new(target),
                key: Box::new(key),
                ty,
            })
        }

        Node::Output(children) => {
            let mut bound_children = children
                .iter()
                .map(|c| bind(c, env, flags))
                .collect::<Result<Vec<_>, _>>()?;
            if bound_children.len() == 1 {
                tracing::debug!("single-child Output collapsed to its child");
                return Ok(bound_children.remove(0));
            }
            Ok(BoundNode::Output {
                children: bound_children,
            })
        }

        Node::VariableAccess(path) => bind_variable_access(path, env, flags),
    }
}

fn bind_literal(value: &Value) -> Result<BoundNode, BindError> {
    match value {
        Value::Bool(b) => Ok(BoundNode::Literal {
            value: LiteralValue::Bool(*b),
            ty: Type::BOOL,
        }),
        Value::Int(i) => Ok(BoundNode::Literal {
            value: LiteralValue::Int(*i),
            ty: Type::NUMBER,
        }),
        Value::Float(f) => Ok(BoundNode::Literal {
            value: LiteralValue::Float(*f),
            ty: Type::NUMBER,
        }),
        Value::String(s) => Ok(BoundNode::Literal {
            value: LiteralValue::Str(s.clone()),
            ty: Type::STRING,
        }),
        Value::Null | Value::List(_) | Value::Map(_) => Err(BindError::UnexpectedLiteralType),
    }
}

fn bind_call(
    name: &str,
    args: &[Node],
    env: &Environment,
    flags: BindFlags,
) -> Result<BoundNode, BindError> {
    let bound_args = args
        .iter()
        .map(|a| bind(a, env, flags))
        .collect::<Result<Vec<_>, _>>()?;

    let function = Function::resolve(name, bound_args.len())
        .ok_or_else(|| BindError::UnsupportedCall(name.to_string()))?;

    let ty = match function {
        Function::Element => {
            tracing::debug!(function = "element", "call resolves to UNKNOWN");
            Type::UNKNOWN
        }
        Function::Lookup => {
            tracing::debug!(function = "lookup", "call resolves to UNKNOWN");
            Type::UNKNOWN
        }
        Function::File => Type::STRING,
        // No element-kind bit set on purpose: the source revision this is
        // grounded on leaves split's element type unspecified (see DESIGN.md).
        Function::Split => Type::LIST,
    };

    Ok(BoundNode::Call {
        function,
        args: bound_args,
        ty,
    })
}

fn bind_variable_access(
    path: &[String],
    env: &Environment,
    flags: BindFlags,
) -> Result<BoundNode, BindError> {
    match path {
        [] => Err(BindError::UnexpectedNodeKind("empty_variable_path")),
        [_only] => Err(BindError::NotImplemented("simple")),
        [head, rest @ ..] => match head.as_str() {
            "count" => bind_count(rest, flags),
            "local" => Err(BindError::NotImplemented("local")),
            "module" => Err(BindError::NotImplemented("module")),
            "path" => Err(BindError::NotImplemented("path")),
            "self" => Err(BindError::NotImplemented("self")),
            "terraform" => Err(BindError::NotImplemented("terraform")),
            "var" => bind_input_variable(rest, env),
            resource_type => bind_resource_access(resource_type, rest, env),
        },
    }
}

fn bind_count(rest: &[String], flags: BindFlags) -> Result<BoundNode, BindError> {
    match rest {
        ["index"] if flags.has_count_index => Ok(BoundNode::VariableAccess {
            classification: VarClass::CountIndex,
            field_path: Vec::new(),
            handle: None,
            ty: Type::NUMBER,
        }),
        ["index"] => Err(BindError::CountIndexNotInScope),
        other => Err(BindError::UnsupportedCountField(other.join("."))),
    }
}

fn bind_input_variable(rest: &[String], env: &Environment) -> Result<BoundNode, BindError> {
    let (name, elem) = rest
        .split_first()
        .ok_or(BindError::UnexpectedNodeKind("empty_var_path"))?;
    if !elem.is_empty() {
        return Err(BindError::NotImplemented("user_elem"));
    }
    let variable = env
        .variable(name)
        .ok_or_else(|| BindError::UnknownVariable(name.clone()))?;
    let ty = if variable.has_non_string_default {
        Type::UNKNOWN
    } else {
        Type::STRING
    };
    Ok(BoundNode::VariableAccess {
        classification: VarClass::InputVariable,
        field_path: Vec::new(),
        handle: Some(Handle::Variable {
            name: variable.name.clone(),
        }),
        ty,
    })
}

fn bind_resource_access(
    resource_type: &str,
    rest: &[String],
    env: &Environment,
) -> Result<BoundNode, BindError> {
    let (name, tail) = rest
        .split_first()
        .ok_or(BindError::UnexpectedNodeKind("missing_resource_name"))?;
    let id = ResourceId::new(resource_type, name.clone());
    let resource = env
        .resource(&id)
        .ok_or_else(|| BindError::UnknownResource(id.clone()))?;

    let (index, field_path_raw) = if resource.multi {
        match tail.split_first() {
            Some((seg, rest)) if seg == "*" => (ResourceIndex::Splat, rest),
            Some((seg, rest)) => {
                if let Ok(idx) = seg.parse::<i64>() {
                    (ResourceIndex::At(idx), rest)
                } else {
                    (ResourceIndex::Single, tail)
                }
            }
            None => (ResourceIndex::Single, tail),
        }
    } else {
        (ResourceIndex::Single, tail)
    };

    let (schema_ty, field_path) = resource.provider.schema.walk(field_path_raw);

    let ty = match index {
        ResourceIndex::Splat => schema_ty.list_of(),
        ResourceIndex::Single | ResourceIndex::At(_) => schema_ty,
    };

    Ok(BoundNode::VariableAccess {
        classification: VarClass::ResourceAttribute,
        field_path,
        handle: Some(Handle::Resource {
            id,
            multi: resource.multi,
            index,
        }),
        ty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::env::{InputVariable, ProviderBinding, Resource};
    use crate::schema::{FieldType, ProviderSchema};

    fn test_env() -> Environment {
        Environment::new()
            .with_resource(Resource {
                id: ResourceId::new("aws_s3_bucket", "b"),
                multi: false,
                provider: ProviderBinding {
                    schema: ProviderSchema::new().with_field("arn", FieldType::String, None),
                },
            })
            .with_resource(Resource {
                id: ResourceId::new("aws_instance", "web"),
                multi: true,
                provider: ProviderBinding {
                    schema: ProviderSchema::new().with_field("id", FieldType::String, None),
                },
            })
            .with_variable(InputVariable {
                name: "name".to_string(),
                has_non_string_default: false,
            })
    }

    // ─── Invariants ──────────────────────────────────────────────────────────

    #[test]
    fn bind_is_pure() {
        let env = test_env();
        let node = Node::VariableAccess(vec!["var".into(), "name".into()]);
        let a = bind(&node, &env, BindFlags::default()).unwrap();
        let b = bind(&node, &env, BindFlags::default()).unwrap();
        assert_eq!(a.typ(), b.typ());
    }

    #[test]
    fn single_child_output_collapses() {
        let env = test_env();
        let node = Node::Output(vec![Node::Literal(Value::String("x".into()))]);
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert!(matches!(bound, BoundNode::Literal { .. }));
    }

    #[test]
    fn conditional_type_matches_when_branches_agree() {
        let env = test_env();
        let node = Node::Conditional {
            cond: Box::new(Node::Literal(Value::Bool(true))),
            true_val: Box::new(Node::Literal(Value::Int(1))),
            false_val: Box::new(Node::Literal(Value::Int(2))),
        };
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert_eq!(bound.typ(), Type::NUMBER);
    }

    #[test]
    fn conditional_type_is_unknown_when_branches_disagree() {
        let env = test_env();
        let node = Node::Conditional {
            cond: Box::new(Node::Literal(Value::Bool(true))),
            true_val: Box::new(Node::Literal(Value::Int(1))),
            false_val: Box::new(Node::Literal(Value::String("x".into()))),
        };
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert_eq!(bound.typ(), Type::UNKNOWN);
    }

    #[test]
    fn index_on_non_list_target_is_unknown() {
        let env = test_env();
        let node = Node::Index {
            target: Box::new(Node::Literal(Value::String("x".into()))),
            key: Box::new(Node::Literal(Value::Int(0))),
        };
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert_eq!(bound.typ(), Type::UNKNOWN);
    }

    #[test]
    fn int_and_float_literals_bind_to_number() {
        let env = test_env();
        let int_bound = bind(&Node::Literal(Value::Int(1)), &env, BindFlags::default()).unwrap();
        let float_bound =
            bind(&Node::Literal(Value::Float(1.5)), &env, BindFlags::default()).unwrap();
        assert_eq!(int_bound.typ(), Type::NUMBER);
        assert_eq!(float_bound.typ(), Type::NUMBER);
    }

    #[test]
    fn unknown_resource_fails_to_bind() {
        let env = test_env();
        let node = Node::VariableAccess(vec!["aws_vpc".into(), "missing".into(), "id".into()]);
        let err = bind(&node, &env, BindFlags::default()).unwrap_err();
        assert_eq!(err, BindError::UnknownResource(ResourceId::new("aws_vpc", "missing")));
    }

    #[test]
    fn unknown_variable_fails_to_bind() {
        let env = test_env();
        let node = Node::VariableAccess(vec!["var".into(), "missing".into()]);
        let err = bind(&node, &env, BindFlags::default()).unwrap_err();
        assert_eq!(err, BindError::UnknownVariable("missing".to_string()));
    }

    // ─── Exclusions ──────────────────────────────────────────────────────────

    #[test]
    fn count_index_requires_flag() {
        let env = test_env();
        let node = Node::VariableAccess(vec!["count".into(), "index".into()]);
        assert_eq!(
            bind(&node, &env, BindFlags::default()).unwrap_err(),
            BindError::CountIndexNotInScope
        );
        let bound = bind(
            &node,
            &env,
            BindFlags {
                has_count_index: true,
            },
        )
        .unwrap();
        assert_eq!(bound.typ(), Type::NUMBER);
    }

    #[test]
    fn unsupported_count_field_is_rejected() {
        let env = test_env();
        let node = Node::VariableAccess(vec!["count".into(), "length".into()]);
        assert_eq!(
            bind(&node, &env, BindFlags::default()).unwrap_err(),
            BindError::UnsupportedCountField("length".to_string())
        );
    }

    #[test]
    fn local_module_path_self_terraform_are_not_implemented() {
        let env = test_env();
        for (prefix, expect) in [
            ("local", "local"),
            ("module", "module"),
            ("path", "path"),
            ("self", "self"),
            ("terraform", "terraform"),
        ] {
            let node = Node::VariableAccess(vec![prefix.into(), "x".into()]);
            assert_eq!(
                bind(&node, &env, BindFlags::default()).unwrap_err(),
                BindError::NotImplemented(expect)
            );
        }
    }

    #[test]
    fn bare_simple_variable_is_not_implemented() {
        let env = test_env();
        let node = Node::VariableAccess(vec!["simple".into()]);
        assert_eq!(
            bind(&node, &env, BindFlags::default()).unwrap_err(),
            BindError::NotImplemented("simple")
        );
    }

    #[test]
    fn var_with_elem_suffix_is_not_implemented() {
        let env = test_env();
        let node = Node::VariableAccess(vec!["var".into(), "name".into(), "elem".into()]);
        assert_eq!(
            bind(&node, &env, BindFlags::default()).unwrap_err(),
            BindError::NotImplemented("user_elem")
        );
    }

    // ─── Resource attribute resolution ──────────────────────────────────────

    #[test]
    fn resource_attribute_resolves_through_schema() {
        let env = test_env();
        let node = Node::VariableAccess(vec!["aws_s3_bucket".into(), "b".into(), "arn".into()]);
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert_eq!(bound.typ(), Type::STRING);
    }

    #[test]
    fn splat_on_multi_resource_yields_a_list() {
        let env = test_env();
        let node = Node::VariableAccess(vec![
            "aws_instance".into(),
            "web".into(),
            "*".into(),
            "id".into(),
        ]);
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert!(bound.typ().is_list());
        assert_eq!(bound.typ().element_type(), Type::STRING);
    }

    #[test]
    fn splat_segment_on_non_multi_resource_is_treated_as_a_literal_field_name() {
        // Boundary: a `*` segment can only arise structurally for multi
        // resources; for a non-multi resource it's just an ordinary field
        // path segment, which will fail the schema walk and fall back to
        // UNKNOWN rather than being treated as a splat.
        let env = test_env();
        let node = Node::VariableAccess(vec!["aws_s3_bucket".into(), "b".into(), "*".into()]);
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert_eq!(bound.typ(), Type::UNKNOWN);
    }

    #[test]
    fn indexed_multi_resource_access_yields_the_field_type() {
        let env = test_env();
        let node = Node::VariableAccess(vec![
            "aws_instance".into(),
            "web".into(),
            "0".into(),
            "id".into(),
        ]);
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert_eq!(bound.typ(), Type::STRING);
    }

    // ─── Arithmetic and calls ───────────────────────────────────────────────

    #[test]
    fn arithmetic_always_binds_to_number() {
        use crate::config::types::BinOp;
        let env = test_env();
        let node = Node::Arithmetic {
            op: BinOp::And,
            operands: vec![
                Node::Literal(Value::Bool(true)),
                Node::Literal(Value::Bool(false)),
            ],
        };
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert_eq!(bound.typ(), Type::NUMBER);
    }

    #[test]
    fn split_call_binds_to_list_with_no_element_bit() {
        let env = test_env();
        let node = Node::Call {
            name: "split".into(),
            args: vec![
                Node::Literal(Value::String(",".into())),
                Node::Literal(Value::String("a,b".into())),
            ],
        };
        let bound = bind(&node, &env, BindFlags::default()).unwrap();
        assert!(bound.typ().is_list());
        assert_eq!(bound.typ().element_type(), Type::empty());
    }

    #[test]
    fn unsupported_call_is_rejected() {
        let env = test_env();
        let node = Node::Call {
            name: "join".into(),
            args: vec![Node::Literal(Value::String(",".into()))],
        };
        assert_eq!(
            bind(&node, &env, BindFlags::default()).unwrap_err(),
            BindError::UnsupportedCall("join".to_string())
        );
    }
}
