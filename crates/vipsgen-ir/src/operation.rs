//! Operation descriptors

use serde::{Deserialize, Serialize};

use crate::arg::ArgumentDescriptor;

/// One discovered operation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Short name (the foreign nickname), unique across a run
    pub name: String,
    /// Free-text description, possibly empty
    #[serde(default)]
    pub description: String,
    /// Grouping label; never empty
    pub category: String,
    /// Construction-time arguments in discovery order
    #[serde(default)]
    pub arguments: Vec<ArgumentDescriptor>,
}

impl OperationDescriptor {
    /// Look up an argument by name
    pub fn argument(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Inputs that must be supplied
    pub fn required_inputs(&self) -> Vec<&ArgumentDescriptor> {
        self.arguments
            .iter()
            .filter(|a| a.is_input() && a.is_required())
            .collect()
    }

    /// Inputs that may be omitted
    pub fn optional_inputs(&self) -> Vec<&ArgumentDescriptor> {
        self.arguments
            .iter()
            .filter(|a| a.is_input() && !a.is_required())
            .collect()
    }

    /// All output arguments
    pub fn outputs(&self) -> Vec<&ArgumentDescriptor> {
        self.arguments.iter().filter(|a| a.is_output()).collect()
    }
}
