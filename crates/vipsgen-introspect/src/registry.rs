//! Foreign Type Registry Contract
//!
//! The engine never talks to a concrete object system directly. Everything
//! it needs from the foreign runtime is expressed here:
//!
//! - [`TypeRegistry`]: subtype enumeration, abstractness, parents, names,
//!   transient instantiation and release, argument enumeration, enum
//!   reflection.
//! - [`TypeDescriptor`]: the finite set of "is-a" predicates argument
//!   classification is built on.
//!
//! All queries take `&self`. Implementations that mutate process-wide state
//! (a GObject type system, for instance) must not be driven from two
//! threads at once; [`crate::Runtime`] serializes discovery runs.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::runtime::{RuntimeState, PROCESS_RUNTIME};

/// Opaque identity of a registered foreign type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(u64);

impl TypeHandle {
    /// Wrap a raw backend identifier
    pub const fn from_raw(raw: u64) -> Self {
        TypeHandle(raw)
    }

    /// Raw backend identifier
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.0)
    }
}

/// Opaque identity of a live transient instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle(u64);

impl InstanceHandle {
    /// Wrap a raw backend identifier
    pub const fn from_raw(raw: u64) -> Self {
        InstanceHandle(raw)
    }

    /// Raw backend identifier
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Root of a type's lineage in the foreign type system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fundamental {
    /// Instantiable object types
    Object,
    /// Reference-counted boxed structs (arrays, blobs)
    Boxed,
    /// Raw pointers
    Pointer,
    /// Enumerations
    Enum,
    /// Bit flags
    Flags,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `int`
    Int,
    /// `unsigned int`
    UInt,
    /// `long`
    Long,
    /// `unsigned long`
    ULong,
    /// 64-bit signed integer
    Int64,
    /// 64-bit unsigned integer
    UInt64,
    /// Boolean
    Boolean,
    /// NUL-terminated string
    String,
    /// Anything else
    Other,
}

impl Fundamental {
    /// Floating point of any width
    pub fn is_floating(self) -> bool {
        matches!(self, Fundamental::Float | Fundamental::Double)
    }

    /// Integer of any width or signedness
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Fundamental::Int
                | Fundamental::UInt
                | Fundamental::Long
                | Fundamental::ULong
                | Fundamental::Int64
                | Fundamental::UInt64
        )
    }
}

/// Capability predicates over a parameter's value type
///
/// Each predicate answers "is this type, or does it derive from, X".
/// Several may hold at once; the classifier decides precedence.
pub trait TypeDescriptor {
    /// Image handle
    fn is_image(&self) -> bool;
    /// Interpolation strategy
    fn is_interpolate(&self) -> bool;
    /// Streaming source
    fn is_source(&self) -> bool;
    /// Streaming target
    fn is_target(&self) -> bool;
    /// Opaque binary blob
    fn is_blob(&self) -> bool;
    /// Array of doubles
    fn is_array_double(&self) -> bool;
    /// Array of ints
    fn is_array_int(&self) -> bool;
    /// Array of images
    fn is_array_image(&self) -> bool;
    /// Fundamental lineage
    fn fundamental(&self) -> Fundamental;

    /// Enumerated type
    fn is_enum(&self) -> bool {
        self.fundamental() == Fundamental::Enum
    }

    /// Bit-flags type
    fn is_flags(&self) -> bool {
        self.fundamental() == Fundamental::Flags
    }
}

/// Per-parameter classification bits as the foreign runtime reports them
///
/// Bit values follow libvips' `VipsArgumentFlags`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamFlags(u32);

impl ParamFlags {
    /// No bits set
    pub const NONE: ParamFlags = ParamFlags(0);
    /// Must be set before the object is built
    pub const REQUIRED: ParamFlags = ParamFlags(1 << 0);
    /// Settable at construction time
    pub const CONSTRUCT: ParamFlags = ParamFlags(1 << 1);
    /// May only be set once
    pub const SET_ONCE: ParamFlags = ParamFlags(1 << 2);
    /// Set regardless of whether a value was given
    pub const SET_ALWAYS: ParamFlags = ParamFlags(1 << 3);
    /// Input argument
    pub const INPUT: ParamFlags = ParamFlags(1 << 4);
    /// Output argument
    pub const OUTPUT: ParamFlags = ParamFlags(1 << 5);
    /// Kept for compatibility only
    pub const DEPRECATED: ParamFlags = ParamFlags(1 << 6);
    /// Modified in place
    pub const MODIFY: ParamFlags = ParamFlags(1 << 7);
    /// Excluded from operation cache hashing
    pub const NON_HASHABLE: ParamFlags = ParamFlags(1 << 8);

    /// Wrap raw bits
    pub const fn from_bits(bits: u32) -> Self {
        ParamFlags(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if every bit of `other` is set
    pub const fn contains(self, other: ParamFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ParamFlags {
    type Output = ParamFlags;

    fn bitor(self, rhs: ParamFlags) -> ParamFlags {
        ParamFlags(self.0 | rhs.0)
    }
}

/// Concrete specification attached to a parameter
///
/// Only the variants carrying values expose defaults or bounds; everything
/// else is `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "spec", rename_all = "snake_case")]
pub enum ParamValue {
    /// Double-valued specification
    Double {
        /// Default
        default: f64,
        /// Minimum
        minimum: f64,
        /// Maximum
        maximum: f64,
    },
    /// Signed int specification
    Int {
        /// Default
        default: i32,
        /// Minimum
        minimum: i32,
        /// Maximum
        maximum: i32,
    },
    /// Unsigned int specification
    #[serde(rename = "uint")]
    UInt {
        /// Default
        default: u32,
        /// Minimum
        minimum: u32,
        /// Maximum
        maximum: u32,
    },
    /// Boolean specification
    Boolean {
        /// Default
        default: bool,
    },
    /// Enum specification
    Enum {
        /// Default member value
        default: i32,
    },
    /// Any other specification
    #[default]
    Other,
}

/// One parameter specification of an instantiated object
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Declared value type
    pub value_type: TypeHandle,
    /// Classification bits
    pub flags: ParamFlags,
    /// Library ordering hint
    pub priority: i32,
    /// Concrete specification
    pub value: ParamValue,
}

/// One raw entry of a foreign enum class
///
/// Names are optional because foreign tables may carry null strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignEnumValue {
    /// Symbolic name
    #[serde(default)]
    pub name: Option<String>,
    /// Short nick
    #[serde(default)]
    pub nick: Option<String>,
    /// Integer value
    pub value: i32,
}

/// Read-only view over a foreign runtime's type system
pub trait TypeRegistry {
    /// One-time runtime start-up
    ///
    /// Called at most once per [`TypeRegistry::runtime_state`].
    fn initialize(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Runtime tear-down
    fn shutdown(&self) {}

    /// Initialization record of the runtime behind this registry
    ///
    /// Defaults to a single state for the whole process.
    fn runtime_state(&self) -> &RuntimeState {
        &PROCESS_RUNTIME
    }

    /// Visit `base` and every type transitively deriving from it
    ///
    /// Depth-first, parents before children, siblings in registration order.
    /// Abstract types are visited too; callers filter them.
    fn for_each_subtype(&self, base: TypeHandle, visit: &mut dyn FnMut(TypeHandle));

    /// Whether `ty` cannot be instantiated
    fn is_abstract(&self, ty: TypeHandle) -> bool;

    /// Immediate ancestor, or `None` at the hierarchy root
    fn parent_of(&self, ty: TypeHandle) -> Option<TypeHandle>;

    /// Canonical nickname, or `None` for unnamed/internal types
    fn short_name(&self, ty: TypeHandle) -> Option<String>;

    /// Full registered type name
    fn type_name(&self, ty: TypeHandle) -> Option<String>;

    /// Resolve a full type name
    fn lookup(&self, name: &str) -> Option<TypeHandle>;

    /// Predicate view of a type
    fn describe(&self, ty: TypeHandle) -> Option<Box<dyn TypeDescriptor + '_>>;

    /// Create a transient instance, `None` on failure
    fn instantiate(&self, ty: TypeHandle) -> Option<InstanceHandle>;

    /// Drop a transient instance
    fn release(&self, instance: InstanceHandle);

    /// Class description text of an instance
    fn description(&self, instance: InstanceHandle) -> Option<String>;

    /// Visit every parameter specification of an instance, in declaration order
    fn for_each_argument(&self, instance: InstanceHandle, visit: &mut dyn FnMut(&ParamSpec));

    /// Members of an enum type, `None` if `ty` is not an enum
    fn enum_values(&self, ty: TypeHandle) -> Option<Vec<ForeignEnumValue>>;
}

impl<T: TypeRegistry + ?Sized> TypeRegistry for &T {
    fn initialize(&self) -> std::result::Result<(), String> {
        (**self).initialize()
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }

    fn runtime_state(&self) -> &RuntimeState {
        (**self).runtime_state()
    }

    fn for_each_subtype(&self, base: TypeHandle, visit: &mut dyn FnMut(TypeHandle)) {
        (**self).for_each_subtype(base, visit)
    }

    fn is_abstract(&self, ty: TypeHandle) -> bool {
        (**self).is_abstract(ty)
    }

    fn parent_of(&self, ty: TypeHandle) -> Option<TypeHandle> {
        (**self).parent_of(ty)
    }

    fn short_name(&self, ty: TypeHandle) -> Option<String> {
        (**self).short_name(ty)
    }

    fn type_name(&self, ty: TypeHandle) -> Option<String> {
        (**self).type_name(ty)
    }

    fn lookup(&self, name: &str) -> Option<TypeHandle> {
        (**self).lookup(name)
    }

    fn describe(&self, ty: TypeHandle) -> Option<Box<dyn TypeDescriptor + '_>> {
        (**self).describe(ty)
    }

    fn instantiate(&self, ty: TypeHandle) -> Option<InstanceHandle> {
        (**self).instantiate(ty)
    }

    fn release(&self, instance: InstanceHandle) {
        (**self).release(instance)
    }

    fn description(&self, instance: InstanceHandle) -> Option<String> {
        (**self).description(instance)
    }

    fn for_each_argument(&self, instance: InstanceHandle, visit: &mut dyn FnMut(&ParamSpec)) {
        (**self).for_each_argument(instance, visit)
    }

    fn enum_values(&self, ty: TypeHandle) -> Option<Vec<ForeignEnumValue>> {
        (**self).enum_values(ty)
    }
}
