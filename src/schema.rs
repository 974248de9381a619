//! The schema adapter: given a field path under a resource's provider schema,
//! return a lattice type (and the target-language field name, if renamed).
//!
//! Modeled after the shape of `provider::protocol`'s `SchemaCache` /
//! `get_resource_schema(type_name)` (a `type name → schema` map fetched
//! once per provider and cached), reduced to the closed "walk a dotted
//! field path, get a type back" contract this crate needs — no gRPC, no
//! provider process, no JSON wire schema.

use std::collections::HashMap;

use crate::lattice::Type;

/// The element kind of a schema field, before any list/map wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    String,
    Number,
    Unknown,
}

impl FieldType {
    fn as_lattice(self) -> Type {
        match self {
            FieldType::Bool => Type::BOOL,
            FieldType::String => Type::STRING,
            FieldType::Number => Type::NUMBER,
            FieldType::Unknown => Type::UNKNOWN,
        }
    }
}

/// One field in a provider schema: its type, an optional nested schema (for
/// object-typed fields, so multi-segment paths can keep walking), and an
/// optional renaming applied when the emitter prints the field in the target
/// language (Terraform field names are snake_case; the host surface may use
/// a differently-cased or differently-named accessor).
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub ty: Type,
    pub rename: Option<String>,
    pub nested: Option<ProviderSchema>,
}

/// A resource type's schema: field name → `FieldSchema`.
#[derive(Debug, Clone, Default)]
pub struct ProviderSchema {
    fields: HashMap<String, FieldSchema>,
}

impl ProviderSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flat scalar (or already-wrapped) field.
    pub fn with_field(mut self, name: &str, field_type: FieldType, rename: Option<&str>) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSchema {
                ty: field_type.as_lattice(),
                rename: rename.map(str::to_string),
                nested: None,
            },
        );
        self
    }

    /// Add a field of an explicit lattice type (e.g. `Type::STRING.list_of()`).
    pub fn with_typed_field(mut self, name: &str, ty: Type, rename: Option<&str>) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSchema {
                ty,
                rename: rename.map(str::to_string),
                nested: None,
            },
        );
        self
    }

    /// Add an object-typed field with its own nested schema, so paths like
    /// `aws_instance.main.root_block_device.volume_size` keep resolving.
    pub fn with_nested_field(
        mut self,
        name: &str,
        ty: Type,
        rename: Option<&str>,
        nested: ProviderSchema,
    ) -> Self {
        self.fields.insert(
            name.to_string(),
            FieldSchema {
                ty,
                rename: rename.map(str::to_string),
                nested: Some(nested),
            },
        );
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Walk a dotted field path starting at this schema. Returns the
    /// resolved lattice type and the path with any per-field renames
    /// applied. If any step leaves the schema (unknown field, or a further
    /// segment under a field with no nested schema), the type is `UNKNOWN`
    /// and the remaining path segments are passed through unrenamed.
    pub fn walk(&self, path: &[String]) -> (Type, Vec<String>) {
        let Some((head, rest)) = path.split_first() else {
            return (Type::UNKNOWN, Vec::new());
        };

        let Some(field) = self.fields.get(head) else {
            tracing::debug!(field = %head, "schema walk left the schema, falling back to UNKNOWN");
            return (Type::UNKNOWN, path.to_vec());
        };

        let emitted_head = field.rename.clone().unwrap_or_else(|| head.clone());

        if rest.is_empty() {
            return (field.ty, vec![emitted_head]);
        }

        match &field.nested {
            Some(nested) => {
                let (ty, mut tail) = nested.walk(rest);
                let mut out = vec![emitted_head];
                out.append(&mut tail);
                (ty, out)
            }
            None => {
                tracing::debug!(
                    field = %head,
                    "schema walk continued past a leaf field, falling back to UNKNOWN"
                );
                let mut out = vec![emitted_head];
                out.extend(rest.iter().cloned());
                (Type::UNKNOWN, out)
            }
        }
    }
}
