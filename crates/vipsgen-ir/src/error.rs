//! IR invariant and encoding errors

use thiserror::Error;

/// Result type for IR operations
pub type IrResult<T> = Result<T, IrError>;

/// Errors raised when an IR document breaks one of its invariants or
/// cannot be encoded
#[derive(Debug, Error)]
pub enum IrError {
    /// Two operations share a short name
    #[error("Duplicate operation name: {name}")]
    DuplicateOperation {
        /// Offending operation name
        name: String,
    },

    /// Two arguments of one operation share a name
    #[error("Duplicate argument {argument} in operation {operation}")]
    DuplicateArgument {
        /// Operation that owns the arguments
        operation: String,
        /// Offending argument name
        argument: String,
    },

    /// An operation was recorded without a category
    #[error("Operation {operation} has an empty category")]
    EmptyCategory {
        /// Operation name
        operation: String,
    },

    /// A non-numeric argument carries numeric bounds
    #[error("Argument {argument} of {operation} is {kind} but carries numeric bounds")]
    StrayNumericBounds {
        /// Operation name
        operation: String,
        /// Argument name
        argument: String,
        /// Argument kind name
        kind: String,
    },

    /// An enum type name is present on an argument that is neither enum nor flags,
    /// or missing on one that is
    #[error("Argument {argument} of {operation} has an inconsistent enum type name")]
    EnumTypeMismatch {
        /// Operation name
        operation: String,
        /// Argument name
        argument: String,
    },

    /// The sentinel entry leaked into an enum's value list
    #[error("Enum {type_name} contains the sentinel value {nick}")]
    SentinelValue {
        /// Enum type name
        type_name: String,
        /// Sentinel nick that was found
        nick: String,
    },

    /// JSON encoding or decoding failed
    #[error("IR JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
