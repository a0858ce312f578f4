//! Vipsgen Intermediate Representation
//!
//! Immutable value records describing the shape of libvips operations and
//! the enumerated types their arguments reference. Produced once per
//! discovery run and handed to the bindings generator; nothing here holds
//! a reference back into the foreign runtime.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod arg;
pub mod document;
pub mod enums;
pub mod error;
pub mod operation;

pub use arg::{ArgFlags, ArgKind, ArgumentDescriptor};
pub use document::{referenced_enum_types, Introspection};
pub use enums::{EnumDescriptor, EnumValue};
pub use error::{IrError, IrResult};
pub use operation::OperationDescriptor;
