//! The emitter: bound tree → target-language source string.
//!
//! A straight recursive walk, one function per `BoundNode` variant, writing
//! into an owned `String` the caller gets back on completion — the same
//! accumulate-and-return shape as `output::formatter`'s print helpers, just
//! returning the buffer instead of printing it.
//!
//! Emission assumes its input was produced by [`crate::binder::bind`]. A
//! bound tree whose invariants don't hold (e.g. a `VariableAccess` whose
//! `classification` doesn't match its `handle` variant) is an internal
//! contract violation, not a user-facing error, and is reported with a
//! panic rather than a `Result`.

use crate::bound::{BoundNode, Function, Handle, LiteralValue, ResourceIndex, VarClass};
use crate::config::types::BinOp;
use crate::env::ResourceId;
use crate::lattice::Type;

/// Per-emission context. `count_index` is the identifier used wherever a
/// `count.index` reference is emitted in the enclosing resource scope.
#[derive(Debug, Clone)]
pub struct EmitContext {
    pub count_index: String,
}

impl Default for EmitContext {
    fn default() -> Self {
        Self {
            count_index: "i".to_string(),
        }
    }
}

/// Emit a bound tree as a target-language expression.
pub fn emit(node: &BoundNode, ctx: &EmitContext) -> String {
    match node {
        BoundNode::Arithmetic { op, operands, .. } => emit_arithmetic(*op, operands, ctx),
        BoundNode::Call { function, args, .. } => emit_call(*function, args, ctx),
        BoundNode::Conditional {
            cond,
            true_val,
            false_val,
            ..
        } => format!(
            "({} ? {} : {})",
            emit(cond, ctx),
            emit(true_val, ctx),
            emit(false_val, ctx)
        ),
        BoundNode::Index { target, key, .. } => {
            format!("{}[{}]", emit(target, ctx), emit(key, ctx))
        }
        BoundNode::Literal { value, .. } => emit_literal(value),
        BoundNode::Output { children } => emit_output(children, ctx),
        BoundNode::VariableAccess {
            classification,
            field_path,
            handle,
            ..
        } => emit_variable_access(*classification, field_path, handle, ctx),
    }
}

fn arith_spelling(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::And => "&&",
        BinOp::Or => "||",
        BinOp::Eq => "===",
        BinOp::NotEq => "!==",
        BinOp::Lt => "<",
        BinOp::Lte => "<=",
        BinOp::Gt => ">",
        BinOp::Gte => ">=",
    }
}

fn emit_arithmetic(op: BinOp, operands: &[BoundNode], ctx: &EmitContext) -> String {
    let spelling = arith_spelling(op);
    let separator = format!(" {} ", spelling);
    let parts: Vec<String> = operands.iter().map(|o| emit(o, ctx)).collect();
    format!("({})", parts.join(&separator))
}

fn emit_call(function: Function, args: &[BoundNode], ctx: &EmitContext) -> String {
    match function {
        Function::Element => format!("{}[{}]", emit(&args[0], ctx), emit(&args[1], ctx)),
        Function::File => format!("fs.readFileSync({}, \"utf-8\")", emit(&args[0], ctx)),
        Function::Lookup => {
            let base = format!("(<any>{})[{}]", emit(&args[0], ctx), emit(&args[1], ctx));
            match args.get(2) {
                Some(default) => format!("({} || {})", base, emit(default, ctx)),
                None => base,
            }
        }
        // Terraform passes the separator first; the target-language method
        // is called on the string being split, so the arguments swap.
        Function::Split => format!("{}.split({})", emit(&args[1], ctx), emit(&args[0], ctx)),
    }
}

fn emit_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Int(i) => i.to_string(),
        LiteralValue::Float(f) => f.to_string(),
        LiteralValue::Str(s) => emit_quoted_string(s),
    }
}

fn emit_quoted_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn emit_output(children: &[BoundNode], ctx: &EmitContext) -> String {
    if children.is_empty() {
        return "\"\"".to_string();
    }
    let pieces: Vec<String> = children
        .iter()
        .map(|child| {
            let rendered = emit(child, ctx);
            if child.typ() == Type::STRING {
                rendered
            } else {
                format!("`${{{}}}`", rendered)
            }
        })
        .collect();
    pieces.join(" + ")
}

fn resource_identifier(id: &ResourceId) -> String {
    snake_to_camel(&id.name)
}

fn emit_variable_access(
    classification: VarClass,
    field_path: &[String],
    handle: &Option<Handle>,
    ctx: &EmitContext,
) -> String {
    match classification {
        VarClass::CountIndex => ctx.count_index.clone(),

        VarClass::InputVariable => match handle {
            Some(Handle::Variable { name }) => snake_to_camel(name),
            _ => unreachable!("InputVariable classification without a Variable handle"),
        },

        VarClass::ResourceAttribute => match handle {
            Some(Handle::Resource { id, multi, index }) => {
                let receiver = resource_identifier(id);
                let path = field_path.join(".");
                match (multi, index) {
                    (true, ResourceIndex::Splat) => {
                        format!("{}.map(v => v.{})", receiver, path)
                    }
                    (true, ResourceIndex::At(k)) => {
                        let indexed = format!("{}[{}]", receiver, k);
                        if path.is_empty() {
                            indexed
                        } else {
                            format!("{}.{}", indexed, path)
                        }
                    }
                    _ => {
                        if path.is_empty() {
                            receiver
                        } else {
                            format!("{}.{}", receiver, path)
                        }
                    }
                }
            }
            _ => unreachable!("ResourceAttribute classification without a Resource handle"),
        },
    }
}

fn snake_to_camel(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, part) in s.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            result.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::{Function, Handle, LiteralValue, ResourceIndex, VarClass};

    fn ctx() -> EmitContext {
        EmitContext::default()
    }

    fn lit_str(s: &str) -> BoundNode {
        BoundNode::Literal {
            value: LiteralValue::Str(s.to_string()),
            ty: Type::STRING,
        }
    }

    fn var_name() -> BoundNode {
        BoundNode::VariableAccess {
            classification: VarClass::InputVariable,
            field_path: vec![],
            handle: Some(Handle::Variable {
                name: "name".to_string(),
            }),
            ty: Type::STRING,
        }
    }

    // ─── End-to-end scenarios ────────────────────────────────────────────────

    #[test]
    fn scenario_1_output_of_literal_and_string_variable() {
        let node = BoundNode::Output {
            children: vec![lit_str("hello "), var_name()],
        };
        assert_eq!(emit(&node, &ctx()), "\"hello \" + name");
    }

    #[test]
    fn scenario_2_single_child_output_already_collapsed_by_binder() {
        let node = BoundNode::VariableAccess {
            classification: VarClass::ResourceAttribute,
            field_path: vec!["arn".to_string()],
            handle: Some(Handle::Resource {
                id: ResourceId::new("aws_s3_bucket", "b"),
                multi: false,
                index: ResourceIndex::Single,
            }),
            ty: Type::STRING,
        };
        assert_eq!(emit(&node, &ctx()), "b.arn");
    }

    #[test]
    fn scenario_3_conditional() {
        let node = BoundNode::Conditional {
            cond: Box::new(BoundNode::Literal {
                value: LiteralValue::Bool(true),
                ty: Type::BOOL,
            }),
            true_val: Box::new(BoundNode::Literal {
                value: LiteralValue::Int(1),
                ty: Type::NUMBER,
            }),
            false_val: Box::new(BoundNode::Literal {
                value: LiteralValue::Int(2),
                ty: Type::NUMBER,
            }),
            ty: Type::NUMBER,
        };
        assert_eq!(emit(&node, &ctx()), "(true ? 1 : 2)");
    }

    #[test]
    fn scenario_4_split_call() {
        let node = BoundNode::Call {
            function: Function::Split,
            args: vec![lit_str(","), lit_str("a,b")],
            ty: Type::LIST,
        };
        assert_eq!(emit(&node, &ctx()), "\"a,b\".split(\",\")");
    }

    #[test]
    fn scenario_5_count_index_in_scope() {
        let node = BoundNode::VariableAccess {
            classification: VarClass::CountIndex,
            field_path: vec![],
            handle: None,
            ty: Type::NUMBER,
        };
        let ctx = EmitContext {
            count_index: "i".to_string(),
        };
        assert_eq!(emit(&node, &ctx), "i");
    }

    #[test]
    fn scenario_7_lookup_with_default() {
        let node = BoundNode::Call {
            function: Function::Lookup,
            args: vec![
                BoundNode::VariableAccess {
                    classification: VarClass::ResourceAttribute,
                    field_path: vec!["tags".to_string()],
                    handle: Some(Handle::Resource {
                        id: ResourceId::new("aws_s3_bucket", "b"),
                        multi: false,
                        index: ResourceIndex::Single,
                    }),
                    ty: Type::UNKNOWN,
                },
                lit_str("k"),
                lit_str("d"),
            ],
            ty: Type::UNKNOWN,
        };
        assert_eq!(emit(&node, &ctx()), "((<any>b.tags)[\"k\"] || \"d\")");
    }

    // ─── Boundaries ──────────────────────────────────────────────────────────

    #[test]
    fn empty_output_emits_the_empty_string_literal() {
        let node = BoundNode::Output { children: vec![] };
        assert_eq!(emit(&node, &ctx()), "\"\"");
    }

    #[test]
    fn single_operand_arithmetic_has_no_operator_but_stays_parenthesized() {
        let node = BoundNode::Arithmetic {
            op: BinOp::Add,
            operands: vec![BoundNode::Literal {
                value: LiteralValue::Int(1),
                ty: Type::NUMBER,
            }],
            ty: Type::NUMBER,
        };
        assert_eq!(emit(&node, &ctx()), "(1)");
    }

    #[test]
    fn lookup_without_default_has_no_outer_fallback() {
        let node = BoundNode::Call {
            function: Function::Lookup,
            args: vec![var_name(), lit_str("k")],
            ty: Type::UNKNOWN,
        };
        assert_eq!(emit(&node, &ctx()), "(<any>name)[\"k\"]");
    }

    #[test]
    fn output_with_all_string_children_has_no_template_wrapping() {
        let node = BoundNode::Output {
            children: vec![var_name(), lit_str(" suffix")],
        };
        assert_eq!(emit(&node, &ctx()), "name + \" suffix\"");
    }

    #[test]
    fn output_with_non_string_child_wraps_it_in_a_template() {
        let number = BoundNode::Literal {
            value: LiteralValue::Int(1),
            ty: Type::NUMBER,
        };
        let node = BoundNode::Output {
            children: vec![lit_str("count: "), number],
        };
        assert_eq!(emit(&node, &ctx()), "\"count: \" + `${1}`");
    }

    #[test]
    fn arithmetic_operators_spell_out_per_the_mapping_table() {
        for (op, expected) in [
            (BinOp::Add, "+"),
            (BinOp::Eq, "==="),
            (BinOp::NotEq, "!=="),
            (BinOp::And, "&&"),
            (BinOp::Or, "||"),
        ] {
            assert_eq!(arith_spelling(op), expected);
        }
    }

    #[test]
    fn string_escapes_round_trip() {
        assert_eq!(emit_quoted_string("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
    }

    #[test]
    fn snake_to_camel_converts_multi_word_identifiers() {
        assert_eq!(snake_to_camel("bucket_name"), "bucketName");
        assert_eq!(snake_to_camel("name"), "name");
    }

    #[test]
    fn splat_access_wraps_in_map() {
        let node = BoundNode::VariableAccess {
            classification: VarClass::ResourceAttribute,
            field_path: vec!["id".to_string()],
            handle: Some(Handle::Resource {
                id: ResourceId::new("aws_instance", "web"),
                multi: true,
                index: ResourceIndex::Splat,
            }),
            ty: Type::STRING.list_of(),
        };
        assert_eq!(emit(&node, &ctx()), "web.map(v => v.id)");
    }

    #[test]
    fn indexed_multi_access_indexes_the_receiver() {
        let node = BoundNode::VariableAccess {
            classification: VarClass::ResourceAttribute,
            field_path: vec!["id".to_string()],
            handle: Some(Handle::Resource {
                id: ResourceId::new("aws_instance", "web"),
                multi: true,
                index: ResourceIndex::At(0),
            }),
            ty: Type::STRING,
        };
        assert_eq!(emit(&node, &ctx()), "web[0].id");
    }
}
