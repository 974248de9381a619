use std::collections::HashMap;
use std::fmt;

// ─── Workspace (the collection of all infrastructure in scope) ──────────────

/// A workspace holds all providers, resources, modules, variables, and outputs
/// parsed out of a set of `.tf` files. This is the unified IR the HCL parser
/// produces and that `ast::from_hcl` consumes to build source ASTs for
/// binding.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceConfig {
    pub providers: Vec<ProviderConfig>,
    pub resources: Vec<ResourceConfig>,
    pub data_sources: Vec<ResourceConfig>,
    pub modules: Vec<ModuleRef>,
    pub variables: Vec<VariableConfig>,
    pub outputs: Vec<OutputConfig>,
    pub locals: HashMap<String, Expression>,
    pub terraform_settings: Option<TerraformSettings>,
}

/// terraform {} block settings (required_providers, backend, etc.)
#[derive(Debug, Clone, Default)]
pub struct TerraformSettings {
    pub required_providers: HashMap<String, RequiredProvider>,
    pub required_version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequiredProvider {
    pub source: String,
    pub version: Option<String>,
}

// ─── Provider ───────────────────────────────────────────────────────────────

/// A provider configuration (e.g. provider "aws" { region = "us-east-1" }).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub source: String,
    pub version_constraint: Option<String>,
    pub alias: Option<String>,
    pub config: HashMap<String, Expression>,
}

// ─── Resource ───────────────────────────────────────────────────────────────

/// A resource definition parsed from HCL.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub resource_type: String,
    pub name: String,
    pub provider_ref: Option<String>,
    pub count: Option<Expression>,
    pub for_each: Option<Expression>,
    pub depends_on: Vec<String>,
    pub lifecycle: LifecycleConfig,
    pub attributes: HashMap<String, Expression>,
    pub provisioners: Vec<ProvisionerConfig>,
    pub source_location: Option<SourceLocation>,
}

#[derive(Debug, Clone, Default)]
pub struct LifecycleConfig {
    pub create_before_destroy: bool,
    pub prevent_destroy: bool,
    pub ignore_changes: Vec<String>,
    pub replace_triggered_by: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub provisioner_type: String,
    pub config: HashMap<String, Expression>,
    pub when: ProvisionerWhen,
}

#[derive(Debug, Clone, Default)]
pub enum ProvisionerWhen {
    #[default]
    Create,
    Destroy,
}

// ─── Module Reference ───────────────────────────────────────────────────────

/// A module block from HCL.
#[derive(Debug, Clone)]
pub struct ModuleRef {
    pub name: String,
    pub source: String,
    pub version: Option<String>,
    pub depends_on: Vec<String>,
    pub variables: HashMap<String, Expression>,
    pub providers: HashMap<String, String>,
    pub outputs: Vec<String>,
}

// ─── Variable & Output ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VariableConfig {
    pub name: String,
    pub var_type: Option<String>,
    pub default: Option<Expression>,
    pub description: Option<String>,
    pub sensitive: bool,
    pub validation: Vec<ValidationRule>,
}

#[derive(Debug, Clone)]
pub struct ValidationRule {
    pub condition: Expression,
    pub error_message: String,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub name: String,
    pub value: Expression,
    pub description: Option<String>,
    pub sensitive: bool,
    pub depends_on: Vec<String>,
}

// ─── Expression (the core value type) ───────────────────────────────────────

/// Expression represents any value or computation parsed out of HCL.
/// This is the unified IR the HCL parser produces; `ast::from_hcl` narrows it down to the
/// closed source-AST shape the binder actually accepts.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A literal value (string, number, bool, null, list, map).
    Literal(Value),

    /// A reference path like var.region, aws_vpc.main.id, count.index.
    Reference(Vec<String>),

    /// A function call like join(",", var.list).
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },

    /// Ternary: condition ? true_val : false_val.
    Conditional {
        condition: Box<Expression>,
        true_val: Box<Expression>,
        false_val: Box<Expression>,
    },

    /// for expression: [for x in list : transform]. Not part of the closed
    /// source-AST this crate's binder accepts (see ast::Node); retained here
    /// because the HCL parser still needs to represent it for well-formed
    /// parsing of files that contain one, even though `ast::from_hcl` turns
    /// it into an `UnexpectedNodeKind` bind error.
    ForExpr {
        collection: Box<Expression>,
        key_var: Option<String>,
        val_var: String,
        key_expr: Option<Box<Expression>>,
        value_expr: Box<Expression>,
        condition: Option<Box<Expression>>,
        grouping: bool,
    },

    /// String template with interpolations: "Hello ${var.name}".
    Template(Vec<TemplatePart>),

    /// Index access: expr[key].
    Index {
        collection: Box<Expression>,
        key: Box<Expression>,
    },

    /// Attribute access: expr.name. Not part of the closed source AST either
    /// (the HCL traversal parser flattens `a.b.c` into `Reference` already);
    /// kept for the same reason as `ForExpr`.
    GetAttr {
        object: Box<Expression>,
        name: String,
    },

    /// Binary operation: a + b, a == b, a && b, etc.
    BinaryOp {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Unary operation: !a, -a. Not part of the closed source AST (see
    /// ast::Node::Arithmetic, which is strictly n-ary over a fixed operator
    /// set with no unary form); kept for the same reason as `ForExpr`.
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    /// Splat expression: aws_instance.web[*].id. The HCL traversal parser
    /// folds `[*]` into a `Reference` segment instead of producing this
    /// variant (see hcl::parser::hcl_expr_to_expression); kept for
    /// completeness of the IR.
    Splat {
        source: Box<Expression>,
        each: Box<Expression>,
    },
}

/// The concrete scalar/collection value types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::json!(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json()).collect())
            }
            Value::Map(entries) => {
                let map: serde_json::Map<String, serde_json::Value> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                serde_json::Value::Object(map)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::List(_) => write!(f, "{}", serde_json::to_string(&self.to_json()).unwrap()),
            Value::Map(_) => write!(f, "{}", serde_json::to_string(&self.to_json()).unwrap()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TemplatePart {
    Literal(String),
    Interpolation(Box<Expression>),
    Directive(Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

// ─── Source Location ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub config_type: ConfigType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigType {
    Hcl,
}
