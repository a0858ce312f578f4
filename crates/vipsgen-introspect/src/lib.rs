//! Vipsgen Introspection Engine
//!
//! Walks the type registry of an image-processing runtime, discovers every
//! concrete operation type, classifies each operation's construction-time
//! arguments into a closed schema, and resolves the enumerated types those
//! arguments reference. The result is the [`vipsgen_ir`] representation
//! consumed by the bindings generator.
//!
//! The engine only describes the *shape* of operations; it never runs one.
//!
//! ## Pipeline
//!
//! ```text
//! TypeRegistry ──► OperationInspector ──► ArgumentClassifier / CategoryResolver ──► Introspector ──► IR
//! TypeRegistry ──► EnumResolver ───────────────────────────────────────────────────────────────────► IR
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let registry = RegistrySnapshot::from_file(path)?.into_registry()?;
//! let ir = vipsgen_introspect::introspect(registry, &IntrospectConfig::default())?;
//! println!("{}", ir.to_json_pretty()?);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod aggregate;
pub mod category;
pub mod classify;
pub mod config;
pub mod enums;
pub mod error;
pub mod inspect;
pub mod memory;
pub mod registry;
pub mod runtime;

pub use aggregate::Introspector;
pub use category::{category_for_ancestor, CategoryResolver, ANCESTOR_CATEGORIES};
pub use classify::{classify_argument, classify_kind, convert_flags, extract_bounds, NumericBounds};
pub use config::{ArgumentOrder, CategoryConfig, IntrospectConfig, Limits, OperationOrder, Ordering};
pub use enums::EnumResolver;
pub use error::{Capacity, IntrospectError, Result};
pub use inspect::OperationInspector;
pub use memory::{
    ArgumentDefinition, InMemoryRegistry, ParamFlag, RegistrySnapshot, TypeBuilder, TypeDefinition,
    WellKnown,
};
pub use registry::{
    ForeignEnumValue, Fundamental, InstanceHandle, ParamFlags, ParamSpec, ParamValue,
    TypeDescriptor, TypeHandle, TypeRegistry,
};
pub use runtime::{Instance, Runtime, RuntimeState};

pub use vipsgen_ir as ir;

use vipsgen_ir::Introspection;

/// Validate `config`, initialize `backend` if needed, and run a full discovery
///
/// The foreign runtime stays up afterwards; see [`Runtime::shutdown`].
pub fn introspect<R: TypeRegistry>(backend: R, config: &IntrospectConfig) -> Result<Introspection> {
    config.validate()?;
    let runtime = Runtime::init(backend)?;
    let introspection = Introspector::new(&runtime, config).run()?;
    Ok(introspection)
}
