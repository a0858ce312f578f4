//! Registry snapshots
//!
//! A snapshot is a JSON list of type definitions captured from a real
//! runtime. Loading one on top of [`InMemoryRegistry::new`] reproduces the
//! runtime's operation hierarchy without linking against it.
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "VipsArithmetic", "parent": "VipsOperation", "abstract": true },
//!     {
//!       "name": "VipsAdd",
//!       "parent": "VipsArithmetic",
//!       "nickname": "add",
//!       "arguments": [
//!         { "name": "left", "type": "VipsImage", "flags": ["required", "construct", "input"] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{InMemoryRegistry, TypeDefinition};
use crate::error::{IntrospectError, Result};

/// Serialized set of type definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySnapshot {
    /// Definitions in registration order; parents before children
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

impl RegistrySnapshot {
    /// Load a snapshot file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| IntrospectError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse snapshot JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Register every definition on top of the standard types
    pub fn into_registry(self) -> Result<InMemoryRegistry> {
        let mut registry = InMemoryRegistry::new();
        registry.register_all(self.types)?;
        Ok(registry)
    }
}
