//! Enum Resolution
//!
//! Turns a referenced type name into an [`EnumDescriptor`]. Names that are
//! unknown, or that denote something other than an enum (flags types
//! included), resolve to a descriptor with no values rather than an error:
//! callers probe every name any argument mentions.

use tracing::{debug, instrument, trace};
use vipsgen_ir::{EnumDescriptor, EnumValue};

use crate::error::{Capacity, IntrospectError, Result};
use crate::registry::TypeRegistry;

/// Resolves enum type names against a registry
pub struct EnumResolver<'r> {
    registry: &'r dyn TypeRegistry,
    sentinel_nick: &'r str,
    max_values: Option<usize>,
}

impl<'r> EnumResolver<'r> {
    /// Create a resolver that drops entries nicknamed `sentinel_nick`
    pub fn new(registry: &'r dyn TypeRegistry, sentinel_nick: &'r str) -> Self {
        Self {
            registry,
            sentinel_nick,
            max_values: None,
        }
    }

    /// Fail loudly when an enum has more than `limit` values
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.max_values = limit;
        self
    }

    /// Resolve one type name
    pub fn resolve(&self, type_name: &str) -> Result<EnumDescriptor> {
        let Some(ty) = self.registry.lookup(type_name) else {
            debug!(type_name, "enum type not registered");
            return Ok(EnumDescriptor::unresolved(type_name));
        };

        let is_enum = self
            .registry
            .describe(ty)
            .is_some_and(|descriptor| descriptor.is_enum());
        let raw = match self.registry.enum_values(ty) {
            Some(raw) if is_enum => raw,
            _ => {
                debug!(type_name, "type is not an enum");
                return Ok(EnumDescriptor::unresolved(type_name));
            }
        };

        let mut values = Vec::with_capacity(raw.len());
        for entry in raw {
            let nick = entry.nick.unwrap_or_default();
            if nick == self.sentinel_nick {
                trace!(type_name, nick = %nick, "dropping sentinel value");
                continue;
            }
            if let Some(limit) = self.max_values {
                if values.len() >= limit {
                    return Err(IntrospectError::CapacityExceeded {
                        capacity: Capacity::EnumValues,
                        context: type_name.to_string(),
                        limit,
                    });
                }
            }
            values.push(EnumValue {
                name: entry.name.unwrap_or_default(),
                nick,
                value: entry.value,
            });
        }

        Ok(EnumDescriptor {
            type_name: type_name.to_string(),
            values,
        })
    }

    /// Resolve several names, one descriptor per name in request order
    #[instrument(skip_all, fields(count = type_names.len()))]
    pub fn resolve_all<S: AsRef<str>>(&self, type_names: &[S]) -> Result<Vec<EnumDescriptor>> {
        type_names
            .iter()
            .map(|name| self.resolve(name.as_ref()))
            .collect()
    }
}
