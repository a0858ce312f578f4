//! Integration tests for the IR document
//!
//! Exercises JSON encoding and invariant validation on realistic documents.

use vipsgen_ir::{
    referenced_enum_types, ArgFlags, ArgKind, ArgumentDescriptor, EnumDescriptor, EnumValue,
    Introspection, IrError, OperationDescriptor,
};

fn resize() -> OperationDescriptor {
    let mut kernel = ArgumentDescriptor::new("kernel", ArgKind::Enum, ArgFlags::INPUT, 4);
    kernel.enum_type_name = Some("VipsKernel".to_string());
    kernel.default = 5.0;

    let mut scale = ArgumentDescriptor::new(
        "scale",
        ArgKind::Double,
        ArgFlags::INPUT | ArgFlags::REQUIRED,
        3,
    );
    scale.max = 10_000_000.0;

    OperationDescriptor {
        name: "resize".to_string(),
        description: "resize an image".to_string(),
        category: "resample".to_string(),
        arguments: vec![
            ArgumentDescriptor::new("in", ArgKind::Image, ArgFlags::INPUT | ArgFlags::REQUIRED, 1),
            ArgumentDescriptor::new("out", ArgKind::Image, ArgFlags::OUTPUT | ArgFlags::REQUIRED, 2),
            scale,
            kernel,
        ],
    }
}

fn kernel_enum() -> EnumDescriptor {
    EnumDescriptor {
        type_name: "VipsKernel".to_string(),
        values: vec![
            EnumValue {
                name: "VIPS_KERNEL_NEAREST".to_string(),
                nick: "nearest".to_string(),
                value: 0,
            },
            EnumValue {
                name: "VIPS_KERNEL_LANCZOS3".to_string(),
                nick: "lanczos3".to_string(),
                value: 5,
            },
        ],
    }
}

#[test]
fn test_valid_document_passes() {
    let doc = Introspection {
        operations: vec![resize()],
        enums: vec![kernel_enum()],
    };
    assert!(doc.validate("last").is_ok());
}

#[test]
fn test_json_keeps_operations_and_enums() {
    let doc = Introspection {
        operations: vec![resize()],
        enums: vec![kernel_enum(), EnumDescriptor::unresolved("VipsForeignKeep")],
    };

    let json = doc.to_json_pretty().unwrap();
    assert!(json.contains("\"kind\": \"enum\""));
    assert!(json.contains("\"enum_type_name\": \"VipsKernel\""));

    let parsed = Introspection::from_json(&json).unwrap();
    assert_eq!(parsed, doc);
    assert!(!parsed.enum_type("VipsForeignKeep").unwrap().is_resolved());
    assert_eq!(
        parsed.enum_type("VipsKernel").unwrap().by_nick("lanczos3").map(|v| v.value),
        Some(5)
    );
}

#[test]
fn test_unknown_kind_string_is_rejected() {
    let json = r#"{"operations":[{"name":"x","category":"x","arguments":[
        {"name":"a","kind":"matrix","flags":1,"priority":0}]}]}"#;
    assert!(matches!(Introspection::from_json(json), Err(IrError::Json(_))));
}

#[test]
fn test_duplicate_operation_rejected() {
    let doc = Introspection {
        operations: vec![resize(), resize()],
        enums: vec![],
    };
    assert!(matches!(
        doc.validate("last"),
        Err(IrError::DuplicateOperation { name }) if name == "resize"
    ));
}

#[test]
fn test_duplicate_argument_rejected() {
    let mut op = resize();
    op.arguments.push(ArgumentDescriptor::new("in", ArgKind::Image, ArgFlags::INPUT, 9));
    let doc = Introspection {
        operations: vec![op],
        enums: vec![],
    };
    assert!(matches!(
        doc.validate("last"),
        Err(IrError::DuplicateArgument { argument, .. }) if argument == "in"
    ));
}

#[test]
fn test_empty_category_rejected() {
    let mut op = resize();
    op.category.clear();
    let doc = Introspection {
        operations: vec![op],
        enums: vec![],
    };
    assert!(matches!(doc.validate("last"), Err(IrError::EmptyCategory { .. })));
}

#[test]
fn test_stray_bounds_rejected() {
    let mut op = resize();
    let mut arr = ArgumentDescriptor::new("ink", ArgKind::ArrayDouble, ArgFlags::INPUT, 5);
    arr.max = 1.0;
    op.arguments.push(arr);
    let doc = Introspection {
        operations: vec![op],
        enums: vec![],
    };
    assert!(matches!(
        doc.validate("last"),
        Err(IrError::StrayNumericBounds { kind, .. }) if kind == "[]double"
    ));
}

#[test]
fn test_enum_type_name_on_wrong_kind_rejected() {
    let mut op = resize();
    op.arguments[0].enum_type_name = Some("VipsImage".to_string());
    let doc = Introspection {
        operations: vec![op],
        enums: vec![],
    };
    assert!(matches!(doc.validate("last"), Err(IrError::EnumTypeMismatch { .. })));
}

#[test]
fn test_empty_enum_type_name_rejected() {
    let mut op = resize();
    op.arguments[3].enum_type_name = Some(String::new());
    let doc = Introspection {
        operations: vec![op],
        enums: vec![],
    };
    assert!(matches!(
        doc.validate("last"),
        Err(IrError::EnumTypeMismatch { ref argument, .. }) if argument == "kernel"
    ));
}

#[test]
fn test_sentinel_value_rejected() {
    let mut e = kernel_enum();
    e.values.push(EnumValue {
        name: "VIPS_KERNEL_LAST".to_string(),
        nick: "last".to_string(),
        value: 6,
    });
    let doc = Introspection {
        operations: vec![],
        enums: vec![e],
    };
    assert!(matches!(
        doc.validate("last"),
        Err(IrError::SentinelValue { type_name, .. }) if type_name == "VipsKernel"
    ));
}

#[test]
fn test_referenced_enum_types_sorted_and_deduplicated() {
    let mut flip = OperationDescriptor {
        name: "flip".to_string(),
        description: String::new(),
        category: "conversion".to_string(),
        arguments: vec![],
    };
    let mut direction = ArgumentDescriptor::new("direction", ArgKind::Enum, ArgFlags::INPUT, 3);
    direction.enum_type_name = Some("VipsDirection".to_string());
    flip.arguments.push(direction);

    let mut keep = ArgumentDescriptor::new("keep", ArgKind::Flags, ArgFlags::INPUT, 9);
    keep.enum_type_name = Some("VipsForeignKeep".to_string());
    flip.arguments.push(keep);

    let ops = vec![resize(), flip, resize()];
    assert_eq!(
        referenced_enum_types(&ops),
        vec!["VipsDirection", "VipsForeignKeep", "VipsKernel"]
    );
}
