//! In-Memory Type Registry
//!
//! A self-contained [`TypeRegistry`] backend. Types are registered from
//! [`TypeDefinition`]s, either built in code with [`TypeBuilder`] or loaded
//! from a JSON [`RegistrySnapshot`] captured from a real runtime.
//!
//! [`InMemoryRegistry::new`] pre-registers the object, boxed, enum and scalar
//! types every libvips-shaped registry has (`VipsImage`, `VipsArrayDouble`,
//! `gdouble`, ...), so definitions only need to describe operations and enums.
//!
//! Each registry stands in for its own foreign process: it carries a private
//! [`RuntimeState`], so initializing one registry does not initialize another.
//! It tracks live transient instances and counts runtime initialization and
//! shutdown, which makes release and lifecycle discipline observable.

mod definition;
mod snapshot;

pub use definition::{flags_from, ArgumentDefinition, ParamFlag, TypeBuilder, TypeDefinition};
pub use snapshot::RegistrySnapshot;

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{IntrospectError, Result};
use crate::registry::{
    ForeignEnumValue, Fundamental, InstanceHandle, ParamSpec, TypeDescriptor, TypeHandle,
    TypeRegistry,
};
use crate::runtime::RuntimeState;

/// Types argument classification keys on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnown {
    /// `VipsImage`
    Image,
    /// `VipsInterpolate`
    Interpolate,
    /// `VipsSource`
    Source,
    /// `VipsTarget`
    Target,
    /// `VipsBlob`
    Blob,
    /// `VipsArrayDouble`
    ArrayDouble,
    /// `VipsArrayInt`
    ArrayInt,
    /// `VipsArrayImage`
    ArrayImage,
}

impl WellKnown {
    /// Registered type name
    pub fn type_name(self) -> &'static str {
        match self {
            WellKnown::Image => "VipsImage",
            WellKnown::Interpolate => "VipsInterpolate",
            WellKnown::Source => "VipsSource",
            WellKnown::Target => "VipsTarget",
            WellKnown::Blob => "VipsBlob",
            WellKnown::ArrayDouble => "VipsArrayDouble",
            WellKnown::ArrayInt => "VipsArrayInt",
            WellKnown::ArrayImage => "VipsArrayImage",
        }
    }
}

/// Pre-registered types: (name, parent, fundamental, abstract)
const BUILTIN_TYPES: &[(&str, Option<&str>, Fundamental, bool)] = &[
    ("GObject", None, Fundamental::Object, false),
    ("VipsObject", Some("GObject"), Fundamental::Object, true),
    ("VipsOperation", Some("VipsObject"), Fundamental::Object, true),
    ("VipsImage", Some("VipsObject"), Fundamental::Object, false),
    ("VipsInterpolate", Some("VipsObject"), Fundamental::Object, true),
    ("VipsConnection", Some("VipsObject"), Fundamental::Object, true),
    ("VipsSource", Some("VipsConnection"), Fundamental::Object, false),
    ("VipsTarget", Some("VipsConnection"), Fundamental::Object, false),
    ("GBoxed", None, Fundamental::Boxed, true),
    ("VipsArea", Some("GBoxed"), Fundamental::Boxed, false),
    ("VipsBlob", Some("GBoxed"), Fundamental::Boxed, false),
    ("VipsArrayDouble", Some("GBoxed"), Fundamental::Boxed, false),
    ("VipsArrayInt", Some("GBoxed"), Fundamental::Boxed, false),
    ("VipsArrayImage", Some("GBoxed"), Fundamental::Boxed, false),
    ("GEnum", None, Fundamental::Enum, true),
    ("GFlags", None, Fundamental::Flags, true),
    ("gdouble", None, Fundamental::Double, false),
    ("gfloat", None, Fundamental::Float, false),
    ("gint", None, Fundamental::Int, false),
    ("guint", None, Fundamental::UInt, false),
    ("glong", None, Fundamental::Long, false),
    ("gulong", None, Fundamental::ULong, false),
    ("gint64", None, Fundamental::Int64, false),
    ("guint64", None, Fundamental::UInt64, false),
    ("gboolean", None, Fundamental::Boolean, false),
    ("gchararray", None, Fundamental::String, false),
    ("gpointer", None, Fundamental::Pointer, false),
];

struct TypeEntry {
    name: String,
    parent: Option<TypeHandle>,
    children: Vec<TypeHandle>,
    nickname: Option<String>,
    fundamental: Fundamental,
    is_abstract: bool,
    broken: bool,
    description: Option<String>,
    arguments: Vec<ParamSpec>,
    values: Vec<ForeignEnumValue>,
}

/// A [`TypeRegistry`] held entirely in memory
pub struct InMemoryRegistry {
    types: Vec<TypeEntry>,
    by_name: FxHashMap<String, TypeHandle>,
    instances: Mutex<FxHashMap<u64, TypeHandle>>,
    next_instance: AtomicU64,
    instantiations: AtomicUsize,
    init_calls: AtomicUsize,
    shutdown_calls: AtomicUsize,
    fail_init: Option<String>,
    runtime: RuntimeState,
}

impl InMemoryRegistry {
    /// Registry with the standard object, boxed, enum and scalar types
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for &(name, parent, fundamental, is_abstract) in BUILTIN_TYPES {
            let parent = parent.and_then(|p| registry.by_name.get(p).copied());
            registry.insert(TypeEntry {
                name: name.to_string(),
                parent,
                children: Vec::new(),
                nickname: None,
                fundamental,
                is_abstract,
                broken: false,
                description: None,
                arguments: Vec::new(),
                values: Vec::new(),
            });
        }
        registry
    }

    /// Registry with no types at all
    pub fn empty() -> Self {
        Self {
            types: Vec::new(),
            by_name: FxHashMap::default(),
            instances: Mutex::new(FxHashMap::default()),
            next_instance: AtomicU64::new(1),
            instantiations: AtomicUsize::new(0),
            init_calls: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
            fail_init: None,
            runtime: RuntimeState::new(),
        }
    }

    /// Add a type
    ///
    /// The parent and every argument value type must already be registered.
    pub fn register(&mut self, definition: impl Into<TypeDefinition>) -> Result<TypeHandle> {
        let def = definition.into();
        if def.name.is_empty() {
            return Err(IntrospectError::InvalidRegistry(
                "type name must not be empty".to_string(),
            ));
        }
        if self.by_name.contains_key(&def.name) {
            return Err(IntrospectError::InvalidRegistry(format!(
                "type '{}' is already registered",
                def.name
            )));
        }

        let parent = match &def.parent {
            Some(name) => Some(self.by_name.get(name).copied().ok_or_else(|| {
                IntrospectError::InvalidRegistry(format!(
                    "type '{}' has unknown parent '{}'",
                    def.name, name
                ))
            })?),
            None => None,
        };

        let fundamental = match (def.fundamental, parent) {
            (Some(fundamental), _) => fundamental,
            (None, Some(parent)) => self.entry(parent).map_or(Fundamental::Other, |e| e.fundamental),
            (None, None) => Fundamental::Other,
        };

        let mut arguments = Vec::with_capacity(def.arguments.len());
        for arg in &def.arguments {
            let value_type = self.by_name.get(&arg.value_type).copied().ok_or_else(|| {
                IntrospectError::InvalidRegistry(format!(
                    "argument '{}' of '{}' has unknown type '{}'",
                    arg.name, def.name, arg.value_type
                ))
            })?;
            arguments.push(ParamSpec {
                name: arg.name.clone(),
                value_type,
                flags: flags_from(&arg.flags),
                priority: arg.priority,
                value: arg.value,
            });
        }

        Ok(self.insert(TypeEntry {
            name: def.name,
            parent,
            children: Vec::new(),
            nickname: def.nickname,
            fundamental,
            is_abstract: def.is_abstract,
            broken: def.broken,
            description: def.description,
            arguments,
            values: def.values,
        }))
    }

    /// Add several types in order
    pub fn register_all<I>(&mut self, definitions: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<TypeDefinition>,
    {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(())
    }

    /// Make [`TypeRegistry::initialize`] fail with `reason`
    pub fn fail_initialization(&mut self, reason: impl Into<String>) {
        self.fail_init = Some(reason.into());
    }

    /// Instances created and not yet released
    pub fn live_instances(&self) -> usize {
        self.instances.lock().len()
    }

    /// Successful instantiations so far
    pub fn instantiation_count(&self) -> usize {
        self.instantiations.load(Ordering::Relaxed)
    }

    /// Calls to [`TypeRegistry::initialize`] so far
    pub fn init_count(&self) -> usize {
        self.init_calls.load(Ordering::Relaxed)
    }

    /// Calls to [`TypeRegistry::shutdown`] so far
    pub fn shutdown_count(&self) -> usize {
        self.shutdown_calls.load(Ordering::Relaxed)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `ty` is `ancestor` or derives from it
    pub fn is_a(&self, ty: TypeHandle, ancestor: TypeHandle) -> bool {
        let mut current = Some(ty);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.entry(handle).and_then(|e| e.parent);
        }
        false
    }

    fn is_well_known(&self, ty: TypeHandle, well_known: WellKnown) -> bool {
        self.by_name
            .get(well_known.type_name())
            .is_some_and(|&ancestor| self.is_a(ty, ancestor))
    }

    fn insert(&mut self, entry: TypeEntry) -> TypeHandle {
        let handle = TypeHandle::from_raw(self.types.len() as u64 + 1);
        if let Some(parent) = entry.parent {
            if let Some(parent) = self.entry_mut(parent) {
                parent.children.push(handle);
            }
        }
        self.by_name.insert(entry.name.clone(), handle);
        self.types.push(entry);
        handle
    }

    fn entry(&self, ty: TypeHandle) -> Option<&TypeEntry> {
        let index = usize::try_from(ty.raw()).ok()?.checked_sub(1)?;
        self.types.get(index)
    }

    fn entry_mut(&mut self, ty: TypeHandle) -> Option<&mut TypeEntry> {
        let index = usize::try_from(ty.raw()).ok()?.checked_sub(1)?;
        self.types.get_mut(index)
    }

    fn instance_type(&self, instance: InstanceHandle) -> Option<TypeHandle> {
        self.instances.lock().get(&instance.raw()).copied()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRegistry")
            .field("types", &self.types.len())
            .field("live_instances", &self.live_instances())
            .finish()
    }
}

/// Predicate view of one registered type
struct TypeView<'a> {
    registry: &'a InMemoryRegistry,
    handle: TypeHandle,
    fundamental: Fundamental,
}

impl TypeDescriptor for TypeView<'_> {
    fn is_image(&self) -> bool {
        self.registry.is_well_known(self.handle, WellKnown::Image)
    }

    fn is_interpolate(&self) -> bool {
        self.registry.is_well_known(self.handle, WellKnown::Interpolate)
    }

    fn is_source(&self) -> bool {
        self.registry.is_well_known(self.handle, WellKnown::Source)
    }

    fn is_target(&self) -> bool {
        self.registry.is_well_known(self.handle, WellKnown::Target)
    }

    fn is_blob(&self) -> bool {
        self.registry.is_well_known(self.handle, WellKnown::Blob)
    }

    fn is_array_double(&self) -> bool {
        self.registry.is_well_known(self.handle, WellKnown::ArrayDouble)
    }

    fn is_array_int(&self) -> bool {
        self.registry.is_well_known(self.handle, WellKnown::ArrayInt)
    }

    fn is_array_image(&self) -> bool {
        self.registry.is_well_known(self.handle, WellKnown::ArrayImage)
    }

    fn fundamental(&self) -> Fundamental {
        self.fundamental
    }
}

impl TypeRegistry for InMemoryRegistry {
    fn initialize(&self) -> std::result::Result<(), String> {
        self.init_calls.fetch_add(1, Ordering::Relaxed);
        match &self.fail_init {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }

    fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::Relaxed);
    }

    fn runtime_state(&self) -> &RuntimeState {
        &self.runtime
    }

    fn for_each_subtype(&self, base: TypeHandle, visit: &mut dyn FnMut(TypeHandle)) {
        if self.entry(base).is_none() {
            return;
        }
        let mut stack = vec![base];
        while let Some(ty) = stack.pop() {
            visit(ty);
            if let Some(entry) = self.entry(ty) {
                stack.extend(entry.children.iter().rev().copied());
            }
        }
    }

    fn is_abstract(&self, ty: TypeHandle) -> bool {
        self.entry(ty).is_some_and(|e| e.is_abstract)
    }

    fn parent_of(&self, ty: TypeHandle) -> Option<TypeHandle> {
        self.entry(ty)?.parent
    }

    fn short_name(&self, ty: TypeHandle) -> Option<String> {
        self.entry(ty)?.nickname.clone()
    }

    fn type_name(&self, ty: TypeHandle) -> Option<String> {
        self.entry(ty).map(|e| e.name.clone())
    }

    fn lookup(&self, name: &str) -> Option<TypeHandle> {
        self.by_name.get(name).copied()
    }

    fn describe(&self, ty: TypeHandle) -> Option<Box<dyn TypeDescriptor + '_>> {
        let entry = self.entry(ty)?;
        Some(Box::new(TypeView {
            registry: self,
            handle: ty,
            fundamental: entry.fundamental,
        }))
    }

    fn instantiate(&self, ty: TypeHandle) -> Option<InstanceHandle> {
        let entry = self.entry(ty)?;
        if entry.is_abstract || entry.broken || entry.fundamental != Fundamental::Object {
            return None;
        }
        let raw = self.next_instance.fetch_add(1, Ordering::Relaxed);
        self.instances.lock().insert(raw, ty);
        self.instantiations.fetch_add(1, Ordering::Relaxed);
        Some(InstanceHandle::from_raw(raw))
    }

    fn release(&self, instance: InstanceHandle) {
        self.instances.lock().remove(&instance.raw());
    }

    fn description(&self, instance: InstanceHandle) -> Option<String> {
        let ty = self.instance_type(instance)?;
        self.entry(ty)?.description.clone()
    }

    fn for_each_argument(&self, instance: InstanceHandle, visit: &mut dyn FnMut(&ParamSpec)) {
        let Some(ty) = self.instance_type(instance) else {
            return;
        };

        // Inherited parameters come first, root to leaf
        let mut lineage = Vec::new();
        let mut current = Some(ty);
        while let Some(handle) = current {
            let Some(entry) = self.entry(handle) else {
                break;
            };
            lineage.push(entry);
            current = entry.parent;
        }
        for entry in lineage.iter().rev() {
            for spec in &entry.arguments {
                visit(spec);
            }
        }
    }

    fn enum_values(&self, ty: TypeHandle) -> Option<Vec<ForeignEnumValue>> {
        let entry = self.entry(ty)?;
        if entry.fundamental != Fundamental::Enum || entry.is_abstract {
            return None;
        }
        Some(entry.values.clone())
    }
}
