//! Argument descriptors
//!
//! An argument is one construction-time parameter of an operation, reduced
//! to a closed [`ArgKind`], a small [`ArgFlags`] bitset and, for
//! numeric-shaped kinds, its default and bounds.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Normalized argument kind
///
/// Discriminants are stable and shared with the generator's templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ArgKind {
    /// No classification predicate matched
    Unknown = 0,
    /// Image handle
    Image = 1,
    /// Floating point scalar
    Double = 2,
    /// Integer scalar of any width or signedness
    Int = 3,
    /// Boolean scalar
    Bool = 4,
    /// String
    String = 5,
    /// Enumerated type
    Enum = 6,
    /// Bit-flags type
    Flags = 7,
    /// Array of doubles
    ArrayDouble = 8,
    /// Array of ints
    ArrayInt = 9,
    /// Array of images
    ArrayImage = 10,
    /// Opaque binary blob
    Blob = 11,
    /// Interpolation strategy
    Interpolate = 12,
    /// Streaming source
    Source = 13,
    /// Streaming target
    Target = 14,
}

impl ArgKind {
    /// Every kind, in discriminant order
    pub const ALL: [ArgKind; 15] = [
        ArgKind::Unknown,
        ArgKind::Image,
        ArgKind::Double,
        ArgKind::Int,
        ArgKind::Bool,
        ArgKind::String,
        ArgKind::Enum,
        ArgKind::Flags,
        ArgKind::ArrayDouble,
        ArgKind::ArrayInt,
        ArgKind::ArrayImage,
        ArgKind::Blob,
        ArgKind::Interpolate,
        ArgKind::Source,
        ArgKind::Target,
    ];

    /// Short display name used in listings
    pub fn name(self) -> &'static str {
        match self {
            ArgKind::Unknown => "unknown",
            ArgKind::Image => "image",
            ArgKind::Double => "double",
            ArgKind::Int => "int",
            ArgKind::Bool => "bool",
            ArgKind::String => "string",
            ArgKind::Enum => "enum",
            ArgKind::Flags => "flags",
            ArgKind::ArrayDouble => "[]double",
            ArgKind::ArrayInt => "[]int",
            ArgKind::ArrayImage => "[]image",
            ArgKind::Blob => "blob",
            ArgKind::Interpolate => "interpolate",
            ArgKind::Source => "source",
            ArgKind::Target => "target",
        }
    }

    /// Whether default/min/max are meaningful for this kind
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ArgKind::Double | ArgKind::Int | ArgKind::Bool | ArgKind::Enum
        )
    }

    /// Whether arguments of this kind name a foreign enumerated type
    pub fn references_enum_type(self) -> bool {
        matches!(self, ArgKind::Enum | ArgKind::Flags)
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Argument direction and requirement bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgFlags(u32);

impl ArgFlags {
    /// No bits set
    pub const NONE: ArgFlags = ArgFlags(0);
    /// Argument is an input
    pub const INPUT: ArgFlags = ArgFlags(1 << 0);
    /// Argument is an output
    pub const OUTPUT: ArgFlags = ArgFlags(1 << 1);
    /// Argument must be supplied
    pub const REQUIRED: ArgFlags = ArgFlags(1 << 2);
    /// Argument is modified in place
    pub const MODIFY: ArgFlags = ArgFlags(1 << 3);

    /// Raw bit representation
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits, dropping unknown ones
    pub const fn from_bits_truncate(bits: u32) -> Self {
        ArgFlags(bits & 0b1111)
    }

    /// True if every bit of `other` is set in `self`
    pub const fn contains(self, other: ArgFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if no bits are set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ArgFlags {
    type Output = ArgFlags;

    fn bitor(self, rhs: ArgFlags) -> ArgFlags {
        ArgFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ArgFlags {
    fn bitor_assign(&mut self, rhs: ArgFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ArgFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (ArgFlags::INPUT, "input"),
            (ArgFlags::OUTPUT, "output"),
            (ArgFlags::REQUIRED, "required"),
            (ArgFlags::MODIFY, "modify"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// One construction-time argument of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    /// Argument name, unique within its operation
    pub name: String,
    /// Normalized kind
    pub kind: ArgKind,
    /// Direction and requirement bits
    pub flags: ArgFlags,
    /// Library-declared ordering hint
    pub priority: i32,
    /// Default value (numeric kinds only, zero otherwise)
    #[serde(default)]
    pub default: f64,
    /// Minimum (numeric kinds only, zero otherwise)
    #[serde(default)]
    pub min: f64,
    /// Maximum (numeric kinds only, zero otherwise)
    #[serde(default)]
    pub max: f64,
    /// Foreign type name for enum and flags arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_type_name: Option<String>,
}

impl ArgumentDescriptor {
    /// Create a descriptor with zeroed numeric fields
    pub fn new(name: impl Into<String>, kind: ArgKind, flags: ArgFlags, priority: i32) -> Self {
        Self {
            name: name.into(),
            kind,
            flags,
            priority,
            default: 0.0,
            min: 0.0,
            max: 0.0,
            enum_type_name: None,
        }
    }

    /// Whether this argument is an input
    pub fn is_input(&self) -> bool {
        self.flags.contains(ArgFlags::INPUT)
    }

    /// Whether this argument is an output
    pub fn is_output(&self) -> bool {
        self.flags.contains(ArgFlags::OUTPUT)
    }

    /// Whether this argument is required
    pub fn is_required(&self) -> bool {
        self.flags.contains(ArgFlags::REQUIRED)
    }

    /// Whether this argument is modified in place
    pub fn is_modify(&self) -> bool {
        self.flags.contains(ArgFlags::MODIFY)
    }

    /// Whether any numeric field is non-zero
    pub fn has_numeric_bounds(&self) -> bool {
        self.default != 0.0 || self.min != 0.0 || self.max != 0.0
    }

    /// Type label for listings: the enum type name if present, else the kind name
    pub fn type_label(&self) -> &str {
        self.enum_type_name.as_deref().unwrap_or(self.kind.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_union_and_contains() {
        let flags = ArgFlags::INPUT | ArgFlags::REQUIRED;
        assert!(flags.contains(ArgFlags::INPUT));
        assert!(flags.contains(ArgFlags::REQUIRED));
        assert!(!flags.contains(ArgFlags::OUTPUT));
        assert_eq!(flags.bits(), 0b0101);
        assert_eq!(flags.to_string(), "input|required");
        assert_eq!(ArgFlags::NONE.to_string(), "none");
    }

    #[test]
    fn test_from_bits_truncate_drops_unknown_bits() {
        assert_eq!(ArgFlags::from_bits_truncate(0xF0 | 0b0010), ArgFlags::OUTPUT);
    }

    #[test]
    fn test_numeric_kinds() {
        let numeric: Vec<_> = ArgKind::ALL.iter().filter(|k| k.is_numeric()).collect();
        assert_eq!(
            numeric,
            vec![&ArgKind::Double, &ArgKind::Int, &ArgKind::Bool, &ArgKind::Enum]
        );
    }

    #[test]
    fn test_type_label_prefers_enum_name() {
        let mut arg = ArgumentDescriptor::new("kernel", ArgKind::Enum, ArgFlags::INPUT, 3);
        assert_eq!(arg.type_label(), "enum");
        arg.enum_type_name = Some("VipsKernel".to_string());
        assert_eq!(arg.type_label(), "VipsKernel");

        let arr = ArgumentDescriptor::new("a", ArgKind::ArrayInt, ArgFlags::INPUT, 1);
        assert_eq!(arr.type_label(), "[]int");
    }
}
