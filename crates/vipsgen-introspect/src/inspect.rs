//! Operation Inspection
//!
//! Describes one concrete operation type: instantiate it transiently, read
//! its description, resolve its category, classify its construction-time
//! arguments, and release the instance. The instance is an [`Instance`]
//! guard, so release happens on every path out of [`OperationInspector::inspect`].

use rustc_hash::FxHashSet;
use tracing::{debug, warn};
use vipsgen_ir::OperationDescriptor;

use crate::category::CategoryResolver;
use crate::classify::classify_argument;
use crate::error::{Capacity, IntrospectError, Result};
use crate::registry::{ParamFlags, ParamSpec, TypeHandle, TypeRegistry};
use crate::runtime::Instance;

/// Builds operation descriptors from concrete types
pub struct OperationInspector<'r> {
    registry: &'r dyn TypeRegistry,
    categories: CategoryResolver<'r>,
    max_arguments: Option<usize>,
}

impl<'r> OperationInspector<'r> {
    /// Create an inspector
    pub fn new(registry: &'r dyn TypeRegistry, categories: CategoryResolver<'r>) -> Self {
        Self {
            registry,
            categories,
            max_arguments: None,
        }
    }

    /// Fail loudly when an operation has more than `limit` arguments
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.max_arguments = limit;
        self
    }

    /// Describe `ty`, known by `short_name`
    ///
    /// `Ok(None)` means the type could not be instantiated and was skipped.
    /// Errors are reserved for configured capacity limits.
    pub fn inspect(&self, ty: TypeHandle, short_name: &str) -> Result<Option<OperationDescriptor>> {
        let Some(instance) = Instance::acquire(self.registry, ty) else {
            warn!(operation = short_name, "failed to instantiate, skipping");
            return Ok(None);
        };

        let description = self
            .registry
            .description(instance.handle())
            .unwrap_or_default();
        let category = self.categories.resolve(ty, short_name);

        let mut arguments = Vec::new();
        let mut seen = FxHashSet::default();
        let mut overflow = false;
        self.registry
            .for_each_argument(instance.handle(), &mut |spec: &ParamSpec| {
                if overflow {
                    return;
                }
                if spec.flags.contains(ParamFlags::DEPRECATED) {
                    debug!(operation = short_name, argument = %spec.name, "skipping deprecated argument");
                    return;
                }
                if !spec.flags.contains(ParamFlags::CONSTRUCT) {
                    debug!(operation = short_name, argument = %spec.name, "skipping non-construct argument");
                    return;
                }
                if !seen.insert(spec.name.clone()) {
                    warn!(operation = short_name, argument = %spec.name, "duplicate argument name, keeping first");
                    return;
                }
                if self.max_arguments.is_some_and(|limit| arguments.len() >= limit) {
                    overflow = true;
                    return;
                }
                arguments.push(classify_argument(self.registry, spec));
            });

        if overflow {
            return Err(IntrospectError::CapacityExceeded {
                capacity: Capacity::Arguments,
                context: short_name.to_string(),
                limit: self.max_arguments.unwrap_or_default(),
            });
        }

        Ok(Some(OperationDescriptor {
            name: short_name.to_string(),
            description,
            category,
            arguments,
        }))
    }
}
