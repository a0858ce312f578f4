//! IR document
//!
//! The complete output of one discovery run, as handed to the generator.
//! Documents round-trip through JSON and can check their own invariants.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::enums::EnumDescriptor;
use crate::error::{IrError, IrResult};
use crate::operation::OperationDescriptor;

/// Operations and the enums they reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Introspection {
    /// Discovered operations
    #[serde(default)]
    pub operations: Vec<OperationDescriptor>,
    /// Resolved enum types
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
}

impl Introspection {
    /// Parse a document from JSON
    pub fn from_json(json: &str) -> IrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as compact JSON
    pub fn to_json(&self) -> IrResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as indented JSON
    pub fn to_json_pretty(&self) -> IrResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up an operation by name
    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Look up an enum by type name
    pub fn enum_type(&self, type_name: &str) -> Option<&EnumDescriptor> {
        self.enums.iter().find(|e| e.type_name == type_name)
    }

    /// Enum type names referenced by this document's operations
    pub fn referenced_enum_types(&self) -> Vec<String> {
        referenced_enum_types(&self.operations)
    }

    /// Check the document invariants
    ///
    /// Operation names are unique, argument names are unique per operation,
    /// categories are non-empty, numeric fields are zero for non-numeric
    /// kinds, non-empty enum type names appear exactly on enum and flags arguments,
    /// and no enum lists the `sentinel_nick` entry.
    pub fn validate(&self, sentinel_nick: &str) -> IrResult<()> {
        let mut op_names = FxHashSet::default();
        for op in &self.operations {
            if !op_names.insert(op.name.as_str()) {
                return Err(IrError::DuplicateOperation {
                    name: op.name.clone(),
                });
            }
            if op.category.is_empty() {
                return Err(IrError::EmptyCategory {
                    operation: op.name.clone(),
                });
            }

            let mut arg_names = FxHashSet::default();
            for arg in &op.arguments {
                if !arg_names.insert(arg.name.as_str()) {
                    return Err(IrError::DuplicateArgument {
                        operation: op.name.clone(),
                        argument: arg.name.clone(),
                    });
                }
                if !arg.kind.is_numeric() && arg.has_numeric_bounds() {
                    return Err(IrError::StrayNumericBounds {
                        operation: op.name.clone(),
                        argument: arg.name.clone(),
                        kind: arg.kind.to_string(),
                    });
                }
                let has_type_name = arg.enum_type_name.as_deref().is_some_and(|n| !n.is_empty());
                if arg.kind.references_enum_type() != has_type_name {
                    return Err(IrError::EnumTypeMismatch {
                        operation: op.name.clone(),
                        argument: arg.name.clone(),
                    });
                }
            }
        }

        for e in &self.enums {
            if let Some(v) = e.values.iter().find(|v| v.nick == sentinel_nick) {
                return Err(IrError::SentinelValue {
                    type_name: e.type_name.clone(),
                    nick: v.nick.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Deduplicated, sorted enum type names referenced by any argument
pub fn referenced_enum_types(operations: &[OperationDescriptor]) -> Vec<String> {
    operations
        .iter()
        .flat_map(|op| op.arguments.iter())
        .filter_map(|arg| arg.enum_type_name.as_deref())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
