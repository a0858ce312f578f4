//! Argument Classification
//!
//! Reduces a foreign parameter specification to an [`ArgumentDescriptor`].
//!
//! Kind resolution is first-match over an ordered predicate list. Capability
//! checks (image, interpolate, source, target, blob, arrays) run before the
//! enum/flags checks, which run before the fundamental-type checks, because
//! a foreign type can satisfy several predicates at once.

use tracing::debug;
use vipsgen_ir::{ArgFlags, ArgKind, ArgumentDescriptor};

use crate::registry::{
    Fundamental, ParamFlags, ParamSpec, ParamValue, TypeDescriptor, TypeRegistry,
};

/// Resolve the kind of a value type
pub fn classify_kind(ty: &dyn TypeDescriptor) -> ArgKind {
    if ty.is_image() {
        return ArgKind::Image;
    }
    if ty.is_interpolate() {
        return ArgKind::Interpolate;
    }
    if ty.is_source() {
        return ArgKind::Source;
    }
    if ty.is_target() {
        return ArgKind::Target;
    }
    if ty.is_blob() {
        return ArgKind::Blob;
    }
    if ty.is_array_double() {
        return ArgKind::ArrayDouble;
    }
    if ty.is_array_int() {
        return ArgKind::ArrayInt;
    }
    if ty.is_array_image() {
        return ArgKind::ArrayImage;
    }
    if ty.is_enum() {
        return ArgKind::Enum;
    }
    if ty.is_flags() {
        return ArgKind::Flags;
    }

    match ty.fundamental() {
        f if f.is_floating() => ArgKind::Double,
        f if f.is_integer() => ArgKind::Int,
        Fundamental::Boolean => ArgKind::Bool,
        Fundamental::String => ArgKind::String,
        _ => ArgKind::Unknown,
    }
}

/// Map foreign classification bits onto IR flags
///
/// Each bit is independent; deprecated/construct bits are not carried.
pub fn convert_flags(flags: ParamFlags) -> ArgFlags {
    let mut out = ArgFlags::NONE;
    if flags.contains(ParamFlags::INPUT) {
        out |= ArgFlags::INPUT;
    }
    if flags.contains(ParamFlags::OUTPUT) {
        out |= ArgFlags::OUTPUT;
    }
    if flags.contains(ParamFlags::REQUIRED) {
        out |= ArgFlags::REQUIRED;
    }
    if flags.contains(ParamFlags::MODIFY) {
        out |= ArgFlags::MODIFY;
    }
    out
}

/// Default, minimum and maximum of a parameter
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericBounds {
    /// Default value
    pub default: f64,
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
}

/// Pull numeric fields from a specification
///
/// Non-numeric kinds always yield zeros. Booleans carry only a 1.0/0.0
/// default; enums only their default member value.
pub fn extract_bounds(kind: ArgKind, value: &ParamValue) -> NumericBounds {
    if !kind.is_numeric() {
        return NumericBounds::default();
    }

    match *value {
        ParamValue::Double {
            default,
            minimum,
            maximum,
        } => NumericBounds {
            default,
            min: minimum,
            max: maximum,
        },
        ParamValue::Int {
            default,
            minimum,
            maximum,
        } => NumericBounds {
            default: f64::from(default),
            min: f64::from(minimum),
            max: f64::from(maximum),
        },
        ParamValue::UInt {
            default,
            minimum,
            maximum,
        } => NumericBounds {
            default: f64::from(default),
            min: f64::from(minimum),
            max: f64::from(maximum),
        },
        ParamValue::Boolean { default } => NumericBounds {
            default: if default { 1.0 } else { 0.0 },
            ..NumericBounds::default()
        },
        ParamValue::Enum { default } => NumericBounds {
            default: f64::from(default),
            ..NumericBounds::default()
        },
        ParamValue::Other => NumericBounds::default(),
    }
}

/// Classify one parameter specification
///
/// A value type the registry cannot describe is `Unknown`.
pub fn classify_argument(registry: &dyn TypeRegistry, spec: &ParamSpec) -> ArgumentDescriptor {
    let kind = registry
        .describe(spec.value_type)
        .map(|ty| classify_kind(&*ty))
        .unwrap_or(ArgKind::Unknown);

    let mut arg = ArgumentDescriptor::new(
        spec.name.clone(),
        kind,
        convert_flags(spec.flags),
        spec.priority,
    );

    if kind.references_enum_type() {
        let type_name = registry.type_name(spec.value_type).unwrap_or_default();
        if type_name.is_empty() {
            debug!(argument = %spec.name, %kind, "enum-typed argument has no type name");
        }
        arg.enum_type_name = Some(type_name);
    }

    let bounds = extract_bounds(kind, &spec.value);
    arg.default = bounds.default;
    arg.min = bounds.min;
    arg.max = bounds.max;
    arg
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Predicate fixture: every capability switched off unless listed
    #[derive(Default)]
    struct Fake {
        caps: Vec<ArgKind>,
        fundamental: Option<Fundamental>,
    }

    impl Fake {
        fn with(caps: &[ArgKind], fundamental: Fundamental) -> Self {
            Self {
                caps: caps.to_vec(),
                fundamental: Some(fundamental),
            }
        }
    }

    impl TypeDescriptor for Fake {
        fn is_image(&self) -> bool {
            self.caps.contains(&ArgKind::Image)
        }
        fn is_interpolate(&self) -> bool {
            self.caps.contains(&ArgKind::Interpolate)
        }
        fn is_source(&self) -> bool {
            self.caps.contains(&ArgKind::Source)
        }
        fn is_target(&self) -> bool {
            self.caps.contains(&ArgKind::Target)
        }
        fn is_blob(&self) -> bool {
            self.caps.contains(&ArgKind::Blob)
        }
        fn is_array_double(&self) -> bool {
            self.caps.contains(&ArgKind::ArrayDouble)
        }
        fn is_array_int(&self) -> bool {
            self.caps.contains(&ArgKind::ArrayInt)
        }
        fn is_array_image(&self) -> bool {
            self.caps.contains(&ArgKind::ArrayImage)
        }
        fn fundamental(&self) -> Fundamental {
            self.fundamental.unwrap_or(Fundamental::Other)
        }
    }

    #[test]
    fn test_fundamentals() {
        let cases = [
            (Fundamental::Double, ArgKind::Double),
            (Fundamental::Float, ArgKind::Double),
            (Fundamental::Int, ArgKind::Int),
            (Fundamental::UInt, ArgKind::Int),
            (Fundamental::Int64, ArgKind::Int),
            (Fundamental::UInt64, ArgKind::Int),
            (Fundamental::Long, ArgKind::Int),
            (Fundamental::ULong, ArgKind::Int),
            (Fundamental::Boolean, ArgKind::Bool),
            (Fundamental::String, ArgKind::String),
            (Fundamental::Enum, ArgKind::Enum),
            (Fundamental::Flags, ArgKind::Flags),
            (Fundamental::Pointer, ArgKind::Unknown),
            (Fundamental::Object, ArgKind::Unknown),
            (Fundamental::Other, ArgKind::Unknown),
        ];
        for (fundamental, expected) in cases {
            assert_eq!(
                classify_kind(&Fake::with(&[], fundamental)),
                expected,
                "{fundamental:?}"
            );
        }
    }

    #[test]
    fn test_capabilities_beat_fundamentals() {
        // An array boxed type whose fundamental looks like something else
        let t = Fake::with(&[ArgKind::ArrayInt], Fundamental::Int);
        assert_eq!(classify_kind(&t), ArgKind::ArrayInt);

        // An enum-backed capability type still reports the capability
        let t = Fake::with(&[ArgKind::Interpolate], Fundamental::Enum);
        assert_eq!(classify_kind(&t), ArgKind::Interpolate);
    }

    #[test]
    fn test_capability_precedence() {
        let t = Fake::with(&[ArgKind::Blob, ArgKind::Image], Fundamental::Object);
        assert_eq!(classify_kind(&t), ArgKind::Image);

        let t = Fake::with(&[ArgKind::Target, ArgKind::Source], Fundamental::Object);
        assert_eq!(classify_kind(&t), ArgKind::Source);

        let t = Fake::with(
            &[ArgKind::ArrayImage, ArgKind::ArrayDouble, ArgKind::ArrayInt],
            Fundamental::Boxed,
        );
        assert_eq!(classify_kind(&t), ArgKind::ArrayDouble);
    }

    #[test]
    fn test_unknown_only_when_nothing_matches() {
        assert_eq!(classify_kind(&Fake::default()), ArgKind::Unknown);
    }

    #[test]
    fn test_flags_are_independent() {
        let all = ParamFlags::INPUT
            | ParamFlags::OUTPUT
            | ParamFlags::REQUIRED
            | ParamFlags::MODIFY
            | ParamFlags::CONSTRUCT
            | ParamFlags::DEPRECATED;
        assert_eq!(
            convert_flags(all),
            ArgFlags::INPUT | ArgFlags::OUTPUT | ArgFlags::REQUIRED | ArgFlags::MODIFY
        );
        assert_eq!(
            convert_flags(ParamFlags::CONSTRUCT | ParamFlags::OUTPUT),
            ArgFlags::OUTPUT
        );
        assert_eq!(convert_flags(ParamFlags::NONE), ArgFlags::NONE);
    }

    #[test]
    fn test_double_bounds() {
        let value = ParamValue::Double {
            default: 0.0,
            minimum: -1.0,
            maximum: 1.0,
        };
        assert_eq!(
            extract_bounds(ArgKind::Double, &value),
            NumericBounds {
                default: 0.0,
                min: -1.0,
                max: 1.0
            }
        );
    }

    #[test]
    fn test_int_and_uint_bounds() {
        let int = ParamValue::Int {
            default: 3,
            minimum: -100,
            maximum: 100,
        };
        assert_eq!(
            extract_bounds(ArgKind::Int, &int),
            NumericBounds {
                default: 3.0,
                min: -100.0,
                max: 100.0
            }
        );

        let uint = ParamValue::UInt {
            default: 1,
            minimum: 0,
            maximum: u32::MAX,
        };
        assert_eq!(extract_bounds(ArgKind::Int, &uint).max, f64::from(u32::MAX));
    }

    #[test]
    fn test_bool_bounds() {
        let t = extract_bounds(ArgKind::Bool, &ParamValue::Boolean { default: true });
        assert_eq!(t, NumericBounds { default: 1.0, min: 0.0, max: 0.0 });

        let f = extract_bounds(ArgKind::Bool, &ParamValue::Boolean { default: false });
        assert_eq!(f, NumericBounds::default());
    }

    #[test]
    fn test_enum_bounds() {
        let b = extract_bounds(ArgKind::Enum, &ParamValue::Enum { default: 5 });
        assert_eq!(b, NumericBounds { default: 5.0, min: 0.0, max: 0.0 });
    }

    #[test]
    fn test_non_numeric_kind_ignores_param_value() {
        let value = ParamValue::Double {
            default: 2.0,
            minimum: 1.0,
            maximum: 3.0,
        };
        assert_eq!(extract_bounds(ArgKind::ArrayDouble, &value), NumericBounds::default());
        assert_eq!(
            extract_bounds(ArgKind::Unknown, &ParamValue::Int { default: 1, minimum: 0, maximum: 2 }),
            NumericBounds::default()
        );
        assert_eq!(extract_bounds(ArgKind::Int, &ParamValue::Other), NumericBounds::default());
    }
}
