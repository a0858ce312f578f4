//! Introspection errors
//!
//! Only conditions that must abort a discovery run are errors. Types that
//! fail to instantiate, unclassifiable parameters and names that are not
//! enums are recorded or skipped, never raised.

use thiserror::Error;

/// Result type for introspection calls
pub type Result<T> = std::result::Result<T, IntrospectError>;

/// Which configured ceiling was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Operations per run
    Operations,
    /// Arguments per operation
    Arguments,
    /// Values per enum
    EnumValues,
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capacity::Operations => write!(f, "operations"),
            Capacity::Arguments => write!(f, "arguments"),
            Capacity::EnumValues => write!(f, "enum values"),
        }
    }
}

/// Errors that abort introspection
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// The foreign runtime refused to start
    #[error("Runtime initialization failed: {reason}")]
    RuntimeInit {
        /// Reason reported by the backend
        reason: String,
    },

    /// The configured base type is not registered
    #[error("Unknown base type: {name}")]
    UnknownBaseType {
        /// Configured type name
        name: String,
    },

    /// A configured limit was exceeded
    #[error("Too many {capacity} in {context}: limit is {limit}")]
    CapacityExceeded {
        /// Which limit
        capacity: Capacity,
        /// Operation or enum being collected
        context: String,
        /// Configured limit
        limit: usize,
    },

    /// Failed to read a configuration or snapshot file
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration TOML
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but is not usable
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Failed to parse a registry snapshot
    #[error("Failed to parse snapshot: {0}")]
    SnapshotParse(#[from] serde_json::Error),

    /// A type definition does not fit the registry it is added to
    #[error("Invalid registry: {0}")]
    InvalidRegistry(String),
}
