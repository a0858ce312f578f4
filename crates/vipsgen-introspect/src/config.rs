//! Introspection configuration (vipsgen.toml)
//!
//! Every field has a default, so an empty document yields the stock
//! libvips behaviour.
//!
//! ```toml
//! base_type = "VipsOperation"
//! root_types = ["VipsOperation", "VipsObject"]
//! sentinel_nick = "last"
//!
//! [limits]
//! max_operations = 2048
//!
//! [ordering]
//! operations = "name"
//! arguments = "priority"
//!
//! [categories.overrides]
//! gaussblur = "convolution"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IntrospectError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct IntrospectConfig {
    /// Type whose subtypes are discovered as operations
    pub base_type: String,

    /// Ancestors at which the category walk stops
    pub root_types: Vec<String>,

    /// Enum nick marking the end-of-list entry
    pub sentinel_nick: String,

    /// Optional hard ceilings
    pub limits: Limits,

    /// Output ordering
    pub ordering: Ordering,

    /// Category adjustments
    pub categories: CategoryConfig,
}

fn default_base_type() -> String {
    "VipsOperation".to_string()
}

fn default_root_types() -> Vec<String> {
    vec!["VipsOperation".to_string(), "VipsObject".to_string()]
}

fn default_sentinel_nick() -> String {
    "last".to_string()
}

impl Default for IntrospectConfig {
    fn default() -> Self {
        Self {
            base_type: default_base_type(),
            root_types: default_root_types(),
            sentinel_nick: default_sentinel_nick(),
            limits: Limits::default(),
            ordering: Ordering::default(),
            categories: CategoryConfig::default(),
        }
    }
}

/// Capacity ceilings; `None` means unbounded
///
/// Crossing a configured ceiling aborts the run with
/// [`IntrospectError::CapacityExceeded`]. Nothing is truncated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Operations per run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_operations: Option<usize>,

    /// Arguments per operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_arguments: Option<usize>,

    /// Values per enum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_enum_values: Option<usize>,
}

/// Output ordering policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Ordering {
    /// Operation order
    pub operations: OperationOrder,
    /// Argument order within an operation
    pub arguments: ArgumentOrder,
}

/// How operations are ordered
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationOrder {
    /// Foreign registration order (stable within a process only)
    #[default]
    Registration,
    /// Lexicographic by short name
    Name,
}

/// How arguments are ordered
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentOrder {
    /// Order in which the runtime enumerated them
    #[default]
    Discovery,
    /// Ascending library priority; ties keep discovery order
    Priority,
}

/// Category adjustments applied after ancestor resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryConfig {
    /// Operation short name to category
    pub overrides: BTreeMap<String, String>,
}

impl IntrospectConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| IntrospectError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse configuration from TOML
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: IntrospectConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.base_type.trim().is_empty() {
            return Err(IntrospectError::InvalidConfig(
                "base_type cannot be empty".to_string(),
            ));
        }

        if self.sentinel_nick.is_empty() {
            return Err(IntrospectError::InvalidConfig(
                "sentinel_nick cannot be empty".to_string(),
            ));
        }

        if let Some(root) = self.root_types.iter().find(|r| r.trim().is_empty()) {
            return Err(IntrospectError::InvalidConfig(format!(
                "root_types contains an empty name: {root:?}"
            )));
        }

        let limits = [
            ("max_operations", self.limits.max_operations),
            ("max_arguments", self.limits.max_arguments),
            ("max_enum_values", self.limits.max_enum_values),
        ];
        for (name, limit) in limits {
            if limit == Some(0) {
                return Err(IntrospectError::InvalidConfig(format!(
                    "limits.{name} must be at least 1"
                )));
            }
        }

        for (op, category) in &self.categories.overrides {
            if category.trim().is_empty() {
                return Err(IntrospectError::InvalidConfig(format!(
                    "category override for {op} cannot be empty"
                )));
            }
        }

        Ok(())
    }
}
