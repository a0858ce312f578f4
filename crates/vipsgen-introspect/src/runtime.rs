//! Runtime lifecycle and scoped instances
//!
//! A foreign runtime is initialized at most once and never re-initialized.
//! Each backend exposes a [`RuntimeState`] recording that: the default is one
//! shared state for the whole process, which is what a GObject-based backend
//! needs. [`Runtime::init`] consults it, so repeated sessions reuse the first
//! initialization, including a failed one. Shutdown is explicit through
//! [`Runtime::shutdown`]; dropping a [`Runtime`] leaves the foreign runtime up.
//!
//! [`Instance`] scopes one transient foreign object: it is released on every
//! exit path, including early returns.

use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{IntrospectError, Result};
use crate::registry::{InstanceHandle, TypeHandle, TypeRegistry};

/// Serializes discovery runs within the process
static DISCOVERY_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Lifecycle shared by backends that do not keep their own
pub(crate) static PROCESS_RUNTIME: RuntimeState = RuntimeState::new();

/// Hold the process-wide discovery lock
///
/// Not reentrant: take it once per public entry point.
pub(crate) fn discovery_lock() -> MutexGuard<'static, ()> {
    DISCOVERY_LOCK.lock()
}

/// One-time initialization outcome and shutdown marker of a foreign runtime
#[derive(Debug, Default)]
pub struct RuntimeState {
    init: OnceCell<std::result::Result<(), String>>,
    shut_down: AtomicBool,
}

impl RuntimeState {
    /// Fresh, uninitialized state
    pub const fn new() -> Self {
        Self {
            init: OnceCell::new(),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Whether initialization has been attempted
    pub fn is_initialized(&self) -> bool {
        self.init.get().is_some()
    }

    /// Whether the runtime has been shut down
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

/// Initialized foreign runtime
pub struct Runtime<R: TypeRegistry> {
    backend: R,
}

impl<R: TypeRegistry> Runtime<R> {
    /// Initialize `backend`, or reuse its earlier initialization
    ///
    /// Failure is fatal for the whole run and is remembered: a backend that
    /// failed once is never retried. A shut-down backend cannot be reopened.
    pub fn init(backend: R) -> Result<Self> {
        let _lock = discovery_lock();
        let state = backend.runtime_state();
        if state.is_shut_down() {
            return Err(IntrospectError::RuntimeInit {
                reason: "runtime already shut down".to_string(),
            });
        }

        let mut first = false;
        let outcome = state.init.get_or_init(|| {
            first = true;
            backend.initialize()
        });
        if let Err(reason) = outcome {
            return Err(IntrospectError::RuntimeInit {
                reason: reason.clone(),
            });
        }
        if first {
            debug!("foreign runtime initialized");
        }
        Ok(Self { backend })
    }

    /// The initialized backend
    pub fn registry(&self) -> &R {
        &self.backend
    }

    /// Shut the foreign runtime down for the rest of the process
    ///
    /// Later [`Runtime::init`] calls on the same backend fail.
    pub fn shutdown(self) {
        let _lock = discovery_lock();
        if !self.backend.runtime_state().shut_down.swap(true, Ordering::AcqRel) {
            self.backend.shutdown();
            debug!("foreign runtime shut down");
        }
    }
}

/// A transient foreign object, released when dropped
pub struct Instance<'r> {
    registry: &'r dyn TypeRegistry,
    handle: InstanceHandle,
}

impl<'r> Instance<'r> {
    /// Instantiate `ty`, `None` if the runtime refuses
    pub fn acquire(registry: &'r dyn TypeRegistry, ty: TypeHandle) -> Option<Self> {
        let handle = registry.instantiate(ty)?;
        Some(Self { registry, handle })
    }

    /// Backend handle of the live object
    pub fn handle(&self) -> InstanceHandle {
        self.handle
    }
}

impl Drop for Instance<'_> {
    fn drop(&mut self) {
        self.registry.release(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryRegistry, TypeBuilder};

    fn registry() -> InMemoryRegistry {
        let mut registry = InMemoryRegistry::new();
        registry
            .register(TypeBuilder::new("VipsBlack").parent("VipsOperation").nickname("black"))
            .unwrap();
        registry
    }

    #[test]
    fn test_init_runs_once_per_backend() {
        let registry = registry();
        let first = Runtime::init(&registry).unwrap();
        drop(first);
        let _second = Runtime::init(&registry).unwrap();

        assert_eq!(registry.init_count(), 1);
        assert_eq!(registry.shutdown_count(), 0);
        assert!(registry.runtime_state().is_initialized());
    }

    #[test]
    fn test_failed_init_is_remembered() {
        let mut registry = registry();
        registry.fail_initialization("no libvips");

        for _ in 0..2 {
            let err = Runtime::init(&registry).err().unwrap();
            assert!(matches!(err, IntrospectError::RuntimeInit { ref reason } if reason == "no libvips"));
        }
        assert_eq!(registry.init_count(), 1);
    }

    #[test]
    fn test_shutdown_is_final() {
        let registry = registry();
        Runtime::init(&registry).unwrap().shutdown();
        assert_eq!(registry.shutdown_count(), 1);

        let err = Runtime::init(&registry).err().unwrap();
        assert!(matches!(err, IntrospectError::RuntimeInit { .. }));
        assert_eq!(registry.init_count(), 1);
        assert_eq!(registry.shutdown_count(), 1);
    }

    #[test]
    fn test_instance_released_on_drop() {
        let registry = registry();
        let black = registry.lookup("VipsBlack").unwrap();
        {
            let instance = Instance::acquire(&registry, black).unwrap();
            assert_eq!(registry.live_instances(), 1);
            assert_eq!(registry.description(instance.handle()), None);
        }
        assert_eq!(registry.live_instances(), 0);
    }

    #[test]
    fn test_instance_released_on_early_return() {
        fn first_argument(registry: &InMemoryRegistry, ty: TypeHandle) -> Option<String> {
            let instance = Instance::acquire(registry, ty)?;
            let mut name = None;
            registry.for_each_argument(instance.handle(), &mut |spec: &crate::registry::ParamSpec| {
                name.get_or_insert_with(|| spec.name.clone());
            });
            // No arguments: bail out while the instance is still live
            let name = name?;
            Some(name)
        }

        let registry = registry();
        let black = registry.lookup("VipsBlack").unwrap();
        assert_eq!(first_argument(&registry, black), None);
        assert_eq!(registry.live_instances(), 0);
        assert_eq!(registry.instantiation_count(), 1);
    }

    #[test]
    fn test_abstract_type_yields_no_instance() {
        let registry = registry();
        let operation = registry.lookup("VipsOperation").unwrap();
        assert!(Instance::acquire(&registry, operation).is_none());
        assert_eq!(registry.live_instances(), 0);
    }
}
