use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reset SIGPIPE to default behavior so piping (e.g. `tfexpr bind-emit ... | less`)
/// exits cleanly instead of panicking on a broken pipe.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use tfexpr::ast;
use tfexpr::binder::BindFlags;
use tfexpr::config::loader;
use tfexpr::config::settings::{self, TfExprConfig};
use tfexpr::config::types::{Expression, ResourceConfig, Value, VariableConfig, WorkspaceConfig};
use tfexpr::emitter::EmitContext;
use tfexpr::env::{Environment, InputVariable, ProviderBinding, Resource, ResourceId};
use tfexpr::schema::{FieldType, ProviderSchema};

/// tfexpr - binds and emits Terraform interpolation expressions as lifted
/// TypeScript expressions
#[derive(Parser)]
#[command(name = "tfexpr", version, about, long_about = None)]
struct Cli {
    /// Path to a directory of .tf files
    #[arg(short, long, default_value = ".")]
    config: String,

    /// Path to tfexpr.toml (defaults to <config>/tfexpr.toml if present)
    #[arg(long)]
    settings: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind and emit one interpolation expression, or every resource
    /// attribute in the configuration
    BindEmit {
        /// A raw interpolation expression, e.g. '${var.name}'
        #[arg(long, conflicts_with = "all")]
        expr: Option<String>,

        /// Bind and emit every attribute of every resource in the config
        #[arg(long)]
        all: bool,

        /// Path to a JSON file of field-type overrides, keyed by resource
        /// type: `{"aws_s3_bucket": {"arn": "string"}}`
        #[arg(long)]
        schema: Option<String>,

        /// Override the count.index identifier for this run
        #[arg(long)]
        count_index: Option<String>,
    },
}

fn main() -> Result<()> {
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = Path::new(&cli.config);
    let settings_path = cli
        .settings
        .map(PathBuf::from)
        .unwrap_or_else(|| config_path.join("tfexpr.toml"));
    let tfexpr_config = settings::load_or_default(&settings_path)?;

    match cli.command {
        Commands::BindEmit {
            expr,
            all,
            schema,
            count_index,
        } => cmd_bind_emit(config_path, expr, all, schema, count_index, &tfexpr_config),
    }
}

fn cmd_bind_emit(
    config_path: &Path,
    expr: Option<String>,
    all: bool,
    schema_path: Option<String>,
    count_index: Option<String>,
    tfexpr_config: &TfExprConfig,
) -> Result<()> {
    let workspace = loader::load_workspace(config_path)?;

    let overrides = match schema_path {
        Some(path) => Some(load_schema_overrides(Path::new(&path))?),
        None => None,
    };
    let env = build_environment(&workspace, overrides.as_ref());

    let ctx = EmitContext {
        count_index: count_index.unwrap_or_else(|| tfexpr_config.count_index.clone()),
    };

    if all {
        return bind_emit_all(&workspace, &env, &ctx);
    }

    let expr = expr.context("either --expr or --all is required")?;
    match bind_emit_one(&expr, &env, &ctx, false) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn bind_emit_all(workspace: &WorkspaceConfig, env: &Environment, ctx: &EmitContext) -> Result<()> {
    let mut failures = 0;
    for resource in &workspace.resources {
        let has_count_index = resource.count.is_some();
        let mut attrs: Vec<&String> = resource.attributes.keys().collect();
        attrs.sort();
        for attr_name in attrs {
            let expression = &resource.attributes[attr_name];
            let label = format!("{}.{}.{}", resource.resource_type, resource.name, attr_name);
            match bind_emit_expression(expression, env, ctx, has_count_index) {
                Ok(output) => println!("{} {} {}", label.bold(), "=>".dimmed(), output),
                Err(e) => {
                    failures += 1;
                    tracing::warn!(attribute = %label, error = %e, "failed to bind");
                    println!("{} {} {}", label.bold(), "=>".dimmed(), format!("<error: {}>", e).red());
                }
            }
        }
    }
    if failures > 0 {
        println!();
        println!("{} {} attribute(s) failed to bind.", "!".yellow().bold(), failures);
    }
    Ok(())
}

fn bind_emit_one(
    raw_expr: &str,
    env: &Environment,
    ctx: &EmitContext,
    has_count_index: bool,
) -> Result<String> {
    let expression = parse_interpolation(raw_expr)?;
    bind_emit_expression(&expression, env, ctx, has_count_index)
}

fn bind_emit_expression(
    expression: &Expression,
    env: &Environment,
    ctx: &EmitContext,
    has_count_index: bool,
) -> Result<String> {
    let node = ast::from_hcl(expression)?;
    let flags = BindFlags { has_count_index };
    let bound = tfexpr::bind(&node, env, flags)?;
    Ok(tfexpr::emit(&bound, ctx))
}

/// Parse a raw interpolation string (e.g. `${var.name}`) the same way
/// `hcl::mod::parse_tfvars_file` turns an attribute's right-hand side into
/// an `Expression`: wrap it as a throwaway HCL attribute and reuse the
/// existing HCL-to-IR conversion.
fn parse_interpolation(raw_expr: &str) -> Result<Expression> {
    let escaped = raw_expr.replace('\\', "\\\\").replace('"', "\\\"");
    let src = format!("value = \"{}\"\n", escaped);
    let body: hcl::Body =
        hcl::from_str(&src).with_context(|| format!("failed to parse --expr {:?} as HCL", raw_expr))?;
    let attr = body
        .into_inner()
        .into_iter()
        .find_map(|structure| match structure {
            hcl::Structure::Attribute(attr) if attr.key.to_string() == "value" => Some(attr),
            _ => None,
        })
        .context("--expr did not parse to a value")?;
    Ok(tfexpr::hcl::parser::hcl_expr_to_expression(&attr.expr))
}

/// Field-type overrides loaded from `--schema <path.json>`, keyed by
/// resource type then field name.
type SchemaOverrides = HashMap<String, HashMap<String, FieldType>>;

fn load_schema_overrides(path: &Path) -> Result<SchemaOverrides> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mut overrides = SchemaOverrides::new();
    for (resource_type, fields) in raw {
        let mut parsed_fields = HashMap::new();
        for (field, kind) in fields {
            let field_type = match kind.as_str() {
                "bool" => FieldType::Bool,
                "string" => FieldType::String,
                "number" => FieldType::Number,
                _ => FieldType::Unknown,
            };
            parsed_fields.insert(field, field_type);
        }
        overrides.insert(resource_type, parsed_fields);
    }
    Ok(overrides)
}

/// Build an `Environment` from a parsed `WorkspaceConfig`.
///
/// This is the "containing program generator" in miniature: the real
/// provider schema registry is out of scope for this crate, so field
/// types are inferred from the literal shape of each resource's own
/// attributes (string-valued attributes type as `STRING`, everything else
/// as `UNKNOWN`) unless overridden via `--schema`.
fn build_environment(workspace: &WorkspaceConfig, overrides: Option<&SchemaOverrides>) -> Environment {
    let mut env = Environment::new();

    for resource in workspace
        .resources
        .iter()
        .chain(workspace.data_sources.iter())
    {
        let schema = resource_schema(resource, overrides);
        env = env.with_resource(Resource {
            id: ResourceId::new(resource.resource_type.clone(), resource.name.clone()),
            multi: resource.count.is_some() || resource.for_each.is_some(),
            provider: ProviderBinding { schema },
        });
    }

    for variable in &workspace.variables {
        env = env.with_variable(InputVariable {
            name: variable.name.clone(),
            has_non_string_default: has_non_string_default(variable),
        });
    }

    env
}

fn resource_schema(resource: &ResourceConfig, overrides: Option<&SchemaOverrides>) -> ProviderSchema {
    let mut schema = ProviderSchema::new();
    let override_fields = overrides.and_then(|o| o.get(&resource.resource_type));

    for (name, value) in &resource.attributes {
        let field_type = override_fields
            .and_then(|fields| fields.get(name).copied())
            .unwrap_or_else(|| inferred_field_type(value));
        schema = schema.with_field(name, field_type, None);
    }

    schema
}

fn inferred_field_type(value: &Expression) -> FieldType {
    match value {
        Expression::Literal(Value::String(_)) => FieldType::String,
        Expression::Literal(Value::Bool(_)) => FieldType::Bool,
        Expression::Literal(Value::Int(_)) | Expression::Literal(Value::Float(_)) => FieldType::Number,
        Expression::Template(_) => FieldType::String,
        _ => FieldType::Unknown,
    }
}

fn has_non_string_default(variable: &VariableConfig) -> bool {
    match &variable.default {
        None => false,
        Some(Expression::Literal(Value::String(_))) => false,
        Some(_) => true,
    }
}
