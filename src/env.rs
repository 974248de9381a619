//! Read-only lookup of resources and input variables by identifier.
//!
//! Narrowed from the broader resource addressing machinery (`ResourceConfig`,
//! `dag::resource_graph`'s `type.name` address scheme) down to the single
//! contract the binder actually needs: "given a resource id or variable
//! name, hand back a schema-typed handle, or tell me it doesn't exist."
//! Building the real dependency graph, expanding `count`/`for_each`, and
//! wiring up providers is the containing program's job, not this crate's.

use std::collections::HashMap;
use std::fmt;

use crate::schema::ProviderSchema;

/// `(resource_type, name)`, e.g. `("aws_s3_bucket", "b")` for `aws_s3_bucket.b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub resource_type: String,
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// A resource or data source entity hosted by the environment.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: ResourceId,
    /// True if this resource was declared with `count` or `for_each` and so
    /// may have more than one instance at runtime.
    pub multi: bool,
    pub provider: ProviderBinding,
}

/// The schema a resource's provider exposes for its own type.
#[derive(Debug, Clone)]
pub struct ProviderBinding {
    pub schema: ProviderSchema,
}

/// An input variable (`variable "name" { ... }`).
#[derive(Debug, Clone)]
pub struct InputVariable {
    pub name: String,
    /// True if the variable has a declared default that is NOT a string
    /// literal, this flips the inferred type to `UNKNOWN`.
    pub has_non_string_default: bool,
}

/// Two disjoint maps: resources (incl. data sources) keyed by address, and
/// input variables keyed by name. Read-only for the duration of a bind/emit
/// pair — callers must not mutate it mid-binding.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    resources: HashMap<ResourceId, Resource>,
    variables: HashMap<String, InputVariable>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.insert(resource.id.clone(), resource);
        self
    }

    pub fn with_variable(mut self, variable: InputVariable) -> Self {
        self.variables.insert(variable.name.clone(), variable);
        self
    }

    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn variable(&self, name: &str) -> Option<&InputVariable> {
        self.variables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, ProviderSchema};

    #[test]
    fn resource_id_displays_as_type_dot_name() {
        let id = ResourceId::new("aws_s3_bucket", "b");
        assert_eq!(id.to_string(), "aws_s3_bucket.b");
    }

    #[test]
    fn environment_round_trips_resource_lookup() {
        let id = ResourceId::new("aws_s3_bucket", "b");
        let env = Environment::new().with_resource(Resource {
            id: id.clone(),
            multi: false,
            provider: ProviderBinding {
                schema: ProviderSchema::new().with_field("arn", FieldType::String, None),
            },
        });
        assert!(env.resource(&id).is_some());
        assert!(env.resource(&ResourceId::new("aws_s3_bucket", "missing")).is_none());
    }

    #[test]
    fn environment_round_trips_variable_lookup() {
        let env = Environment::new().with_variable(InputVariable {
            name: "name".to_string(),
            has_non_string_default: false,
        });
        assert!(env.variable("name").is_some());
        assert!(env.variable("missing").is_none());
    }
}
