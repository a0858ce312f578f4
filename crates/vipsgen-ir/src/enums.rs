//! Enum descriptors

use serde::{Deserialize, Serialize};

/// One member of an enumerated type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Symbolic name (e.g. `VIPS_KERNEL_LANCZOS3`)
    pub name: String,
    /// Short nick (e.g. `lanczos3`)
    pub nick: String,
    /// Integer value
    pub value: i32,
}

/// An enumerated type referenced by some argument
///
/// `values` is empty when the requested name did not resolve to a
/// registered enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Foreign type name, as requested
    pub type_name: String,
    /// Members in declaration order
    #[serde(default)]
    pub values: Vec<EnumValue>,
}

impl EnumDescriptor {
    /// Descriptor for a name that did not resolve to an enum
    pub fn unresolved(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            values: Vec::new(),
        }
    }

    /// Whether any members were found
    pub fn is_resolved(&self) -> bool {
        !self.values.is_empty()
    }

    /// Look up a member by nick
    pub fn by_nick(&self, nick: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.nick == nick)
    }

    /// Look up a member by integer value
    pub fn by_value(&self, value: i32) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.value == value)
    }
}
