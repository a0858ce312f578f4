//! Declarative type definitions
//!
//! The unit of registration for [`super::InMemoryRegistry`], written either
//! through [`TypeBuilder`] or as JSON inside a [`super::RegistrySnapshot`].
//! Parents and argument value types are referenced by type name and
//! resolved when the definition is registered.

use serde::{Deserialize, Serialize};

use crate::registry::{ForeignEnumValue, Fundamental, ParamFlags, ParamValue};

/// Named classification bit, as written in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamFlag {
    /// See [`ParamFlags::REQUIRED`]
    Required,
    /// See [`ParamFlags::CONSTRUCT`]
    Construct,
    /// See [`ParamFlags::SET_ONCE`]
    SetOnce,
    /// See [`ParamFlags::SET_ALWAYS`]
    SetAlways,
    /// See [`ParamFlags::INPUT`]
    Input,
    /// See [`ParamFlags::OUTPUT`]
    Output,
    /// See [`ParamFlags::DEPRECATED`]
    Deprecated,
    /// See [`ParamFlags::MODIFY`]
    Modify,
    /// See [`ParamFlags::NON_HASHABLE`]
    NonHashable,
}

impl ParamFlag {
    /// Bit this name stands for
    pub fn bits(self) -> ParamFlags {
        match self {
            ParamFlag::Required => ParamFlags::REQUIRED,
            ParamFlag::Construct => ParamFlags::CONSTRUCT,
            ParamFlag::SetOnce => ParamFlags::SET_ONCE,
            ParamFlag::SetAlways => ParamFlags::SET_ALWAYS,
            ParamFlag::Input => ParamFlags::INPUT,
            ParamFlag::Output => ParamFlags::OUTPUT,
            ParamFlag::Deprecated => ParamFlags::DEPRECATED,
            ParamFlag::Modify => ParamFlags::MODIFY,
            ParamFlag::NonHashable => ParamFlags::NON_HASHABLE,
        }
    }
}

/// Union of named bits
pub fn flags_from(names: &[ParamFlag]) -> ParamFlags {
    names
        .iter()
        .fold(ParamFlags::NONE, |acc, flag| acc | flag.bits())
}

/// One argument of an operation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentDefinition {
    /// Argument name
    pub name: String,
    /// Value type name
    #[serde(rename = "type")]
    pub value_type: String,
    /// Classification bits
    #[serde(default)]
    pub flags: Vec<ParamFlag>,
    /// Ordering hint
    #[serde(default)]
    pub priority: i32,
    /// Concrete specification
    #[serde(default)]
    pub value: ParamValue,
}

/// One registered type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDefinition {
    /// Full type name, unique in the registry
    pub name: String,
    /// Parent type name; `None` for a root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Short name; `None` for unnamed/internal types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Fundamental lineage; inherited from the parent when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundamental: Option<Fundamental>,
    /// Cannot be instantiated
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Instantiation fails even though the type is concrete
    #[serde(default)]
    pub broken: bool,
    /// Class description text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter specifications, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentDefinition>,
    /// Enum members, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ForeignEnumValue>,
}

/// Fluent construction of a [`TypeDefinition`]
///
/// ```ignore
/// let invert = TypeBuilder::new("VipsInvert")
///     .parent("VipsUnary")
///     .nickname("invert")
///     .input("in", "VipsImage", 0, ParamValue::Other)
///     .output("out", "VipsImage", 1, ParamValue::Other)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    def: TypeDefinition,
}

impl TypeBuilder {
    /// Start a concrete type named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            def: TypeDefinition {
                name: name.into(),
                parent: None,
                nickname: None,
                fundamental: None,
                is_abstract: false,
                broken: false,
                description: None,
                arguments: Vec::new(),
                values: Vec::new(),
            },
        }
    }

    /// Start an enum type deriving from `GEnum`
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name).parent("GEnum")
    }

    /// Start a flags type deriving from `GFlags`
    pub fn flags(name: impl Into<String>) -> Self {
        Self::new(name).parent("GFlags")
    }

    /// Set the parent type
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.def.parent = Some(parent.into());
        self
    }

    /// Set the short name
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.def.nickname = Some(nickname.into());
        self
    }

    /// Override the fundamental lineage
    pub fn fundamental(mut self, fundamental: Fundamental) -> Self {
        self.def.fundamental = Some(fundamental);
        self
    }

    /// Mark abstract
    pub fn abstract_type(mut self) -> Self {
        self.def.is_abstract = true;
        self
    }

    /// Make instantiation fail
    pub fn broken(mut self) -> Self {
        self.def.broken = true;
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.def.description = Some(description.into());
        self
    }

    /// Add an argument with explicit flags
    pub fn argument(
        mut self,
        name: impl Into<String>,
        value_type: impl Into<String>,
        flags: &[ParamFlag],
        priority: i32,
        value: ParamValue,
    ) -> Self {
        self.def.arguments.push(ArgumentDefinition {
            name: name.into(),
            value_type: value_type.into(),
            flags: flags.to_vec(),
            priority,
            value,
        });
        self
    }

    /// Add a required construct-time input
    pub fn input(
        self,
        name: impl Into<String>,
        value_type: impl Into<String>,
        priority: i32,
        value: ParamValue,
    ) -> Self {
        self.argument(
            name,
            value_type,
            &[ParamFlag::Required, ParamFlag::Construct, ParamFlag::Input],
            priority,
            value,
        )
    }

    /// Add an optional construct-time input
    pub fn optional(
        self,
        name: impl Into<String>,
        value_type: impl Into<String>,
        priority: i32,
        value: ParamValue,
    ) -> Self {
        self.argument(
            name,
            value_type,
            &[ParamFlag::Construct, ParamFlag::Input],
            priority,
            value,
        )
    }

    /// Add a required construct-time output
    pub fn output(
        self,
        name: impl Into<String>,
        value_type: impl Into<String>,
        priority: i32,
        value: ParamValue,
    ) -> Self {
        self.argument(
            name,
            value_type,
            &[ParamFlag::Required, ParamFlag::Construct, ParamFlag::Output],
            priority,
            value,
        )
    }

    /// Add an enum member
    pub fn value(mut self, name: impl Into<String>, nick: impl Into<String>, value: i32) -> Self {
        self.def.values.push(ForeignEnumValue {
            name: Some(name.into()),
            nick: Some(nick.into()),
            value,
        });
        self
    }

    /// Finish the definition
    pub fn build(self) -> TypeDefinition {
        self.def
    }
}

impl From<TypeBuilder> for TypeDefinition {
    fn from(builder: TypeBuilder) -> Self {
        builder.build()
    }
}
