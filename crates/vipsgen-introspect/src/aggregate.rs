//! Discovery Aggregation
//!
//! Drives one discovery run: enumerate every subtype of the configured base
//! type, inspect each concrete named one, then apply category overrides,
//! ordering and de-duplication. Enum resolution is a second pass over the
//! type names the caller asks for.
//!
//! Each public entry point validates the configuration first, then holds the
//! process-wide discovery lock for its duration.

use rustc_hash::FxHashSet;
use tracing::{debug, info, instrument, warn};
use vipsgen_ir::{referenced_enum_types, EnumDescriptor, Introspection, OperationDescriptor};

use crate::category::CategoryResolver;
use crate::config::{ArgumentOrder, IntrospectConfig, OperationOrder};
use crate::enums::EnumResolver;
use crate::error::{Capacity, IntrospectError, Result};
use crate::inspect::OperationInspector;
use crate::registry::{TypeHandle, TypeRegistry};
use crate::runtime::{discovery_lock, Runtime};

/// Discovery session over an initialized runtime
pub struct Introspector<'r> {
    registry: &'r dyn TypeRegistry,
    config: &'r IntrospectConfig,
}

impl<'r> Introspector<'r> {
    /// Create a session
    pub fn new<R: TypeRegistry>(runtime: &'r Runtime<R>, config: &'r IntrospectConfig) -> Self {
        Self {
            registry: runtime.registry(),
            config,
        }
    }

    /// Discover every operation
    pub fn discover_operations(&self) -> Result<Vec<OperationDescriptor>> {
        self.config.validate()?;
        let _lock = discovery_lock();
        self.collect_operations()
    }

    /// Resolve enum descriptors for `type_names`, in request order
    pub fn resolve_enums<S: AsRef<str>>(&self, type_names: &[S]) -> Result<Vec<EnumDescriptor>> {
        self.config.validate()?;
        let _lock = discovery_lock();
        self.enum_resolver().resolve_all(type_names)
    }

    /// Discover operations, then resolve every enum type they reference
    pub fn run(&self) -> Result<Introspection> {
        self.config.validate()?;
        let _lock = discovery_lock();
        let operations = self.collect_operations()?;
        let enum_names = referenced_enum_types(&operations);
        let enums = self.enum_resolver().resolve_all(&enum_names)?;
        info!(
            operations = operations.len(),
            enums = enums.len(),
            "introspection complete"
        );
        Ok(Introspection { operations, enums })
    }

    fn enum_resolver(&self) -> EnumResolver<'r> {
        EnumResolver::new(self.registry, &self.config.sentinel_nick)
            .with_limit(self.config.limits.max_enum_values)
    }

    #[instrument(skip_all, fields(base = %self.config.base_type))]
    fn collect_operations(&self) -> Result<Vec<OperationDescriptor>> {
        let base = self.registry.lookup(&self.config.base_type).ok_or_else(|| {
            IntrospectError::UnknownBaseType {
                name: self.config.base_type.clone(),
            }
        })?;

        let mut types: Vec<TypeHandle> = Vec::new();
        self.registry
            .for_each_subtype(base, &mut |ty: TypeHandle| types.push(ty));

        let categories = CategoryResolver::new(self.registry, &self.config.root_types);
        let inspector = OperationInspector::new(self.registry, categories)
            .with_limit(self.config.limits.max_arguments);

        let mut operations = Vec::new();
        let mut skipped = 0usize;
        for ty in types {
            if self.registry.is_abstract(ty) {
                continue;
            }
            let Some(name) = self.registry.short_name(ty).filter(|n| !n.is_empty()) else {
                debug!(%ty, "no short name, skipping");
                skipped += 1;
                continue;
            };
            if let Some(limit) = self.config.limits.max_operations {
                if operations.len() >= limit {
                    return Err(IntrospectError::CapacityExceeded {
                        capacity: Capacity::Operations,
                        context: self.config.base_type.clone(),
                        limit,
                    });
                }
            }
            match inspector.inspect(ty, &name)? {
                Some(op) => operations.push(op),
                None => skipped += 1,
            }
        }

        let operations = self.finish(operations);
        info!(operations = operations.len(), skipped, "operation discovery complete");
        Ok(operations)
    }

    /// Overrides, ordering and de-duplication
    fn finish(&self, mut operations: Vec<OperationDescriptor>) -> Vec<OperationDescriptor> {
        for op in &mut operations {
            if let Some(category) = self.config.categories.overrides.get(&op.name) {
                op.category = category.clone();
            }
            if self.config.ordering.arguments == ArgumentOrder::Priority {
                op.arguments.sort_by_key(|arg| arg.priority);
            }
        }

        if self.config.ordering.operations == OperationOrder::Name {
            operations.sort_by(|a, b| a.name.cmp(&b.name));
        }

        // Several foreign types can share one nickname; first in output order wins
        let mut seen = FxHashSet::default();
        operations.retain(|op| {
            let fresh = seen.insert(op.name.clone());
            if !fresh {
                warn!(operation = %op.name, "duplicate operation name, dropping");
            }
            fresh
        });

        operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryRegistry, TypeBuilder};
    use crate::registry::ParamValue;
    use vipsgen_ir::{ArgFlags, ArgKind, ArgumentDescriptor};

    fn op(name: &str, category: &str, priorities: &[(&str, i32)]) -> OperationDescriptor {
        OperationDescriptor {
            name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            arguments: priorities
                .iter()
                .map(|&(arg, priority)| {
                    ArgumentDescriptor::new(arg, ArgKind::Int, ArgFlags::INPUT, priority)
                })
                .collect(),
        }
    }

    fn with_config<T>(config: &IntrospectConfig, f: impl FnOnce(&Introspector<'_>) -> T) -> T {
        let registry = InMemoryRegistry::new();
        let runtime = Runtime::init(&registry).unwrap();
        let introspector = Introspector::new(&runtime, config);
        f(&introspector)
    }

    #[test]
    fn test_priority_sort_is_stable() {
        let mut config = IntrospectConfig::default();
        config.ordering.arguments = ArgumentOrder::Priority;

        let ops = with_config(&config, |i| {
            i.finish(vec![op("x", "x", &[("c", 2), ("a", 1), ("b", 1), ("z", 0)])])
        });
        let names: Vec<&str> = ops[0].arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "b", "c"]);
    }

    #[test]
    fn test_discovery_order_kept_by_default() {
        let config = IntrospectConfig::default();
        let ops = with_config(&config, |i| {
            i.finish(vec![op("b", "b", &[("y", 5), ("x", 1)]), op("a", "a", &[])])
        });

        assert_eq!(ops[0].name, "b");
        assert_eq!(ops[0].arguments[0].name, "y");
    }

    #[test]
    fn test_dedupe_after_name_sort() {
        let mut config = IntrospectConfig::default();
        config.ordering.operations = OperationOrder::Name;
        config
            .categories
            .overrides
            .insert("copy".to_string(), "conversion".to_string());

        let ops = with_config(&config, |i| {
            i.finish(vec![
                op("copy", "first", &[]),
                op("add", "arithmetic", &[]),
                op("copy", "second", &[]),
            ])
        });
        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["add", "copy"]);
        assert_eq!(ops[1].category, "conversion");
    }

    #[test]
    fn test_abstract_and_unnamed_types_skipped() {
        let mut registry = InMemoryRegistry::new();
        registry
            .register_all([
                TypeBuilder::new("VipsCreate").parent("VipsOperation").abstract_type().nickname("create"),
                TypeBuilder::new("VipsBlack")
                    .parent("VipsCreate")
                    .nickname("black")
                    .input("width", "gint", 1, ParamValue::Int { default: 1, minimum: 1, maximum: 100 }),
                TypeBuilder::new("VipsHidden").parent("VipsCreate").nickname(""),
            ])
            .unwrap();

        let config = IntrospectConfig::default();
        let runtime = Runtime::init(&registry).unwrap();
        let ops = Introspector::new(&runtime, &config).discover_operations().unwrap();

        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name, "black");
        assert_eq!(ops[0].category, "create");
        assert_eq!(registry.instantiation_count(), 1);
    }

    #[test]
    fn test_entry_points_validate_config() {
        let mut config = IntrospectConfig::default();
        config.limits.max_operations = Some(0);

        with_config(&config, |i| {
            assert!(matches!(i.discover_operations(), Err(IntrospectError::InvalidConfig(_))));
            assert!(matches!(i.resolve_enums(&["VipsKernel"]), Err(IntrospectError::InvalidConfig(_))));
            assert!(matches!(i.run(), Err(IntrospectError::InvalidConfig(_))));
        });
    }
}
