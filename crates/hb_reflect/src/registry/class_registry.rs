use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

use hb_utils::hash::HashMap;
use slotmap::SlotMap;

use super::RegistryConfig;
use crate::defaults::DefaultParams;
use crate::desc::{ClassDesc, DescId, FieldDesc, FunctionDesc, PropertyDesc, Resolved};
use crate::error::IntegrityError;
use crate::name::{metatable_name, strip_type_prefix};
use crate::native::{NativeTypes, StructId, StructKind};

// -----------------------------------------------------------------------------
// ClassRegistry

/// The store of [reflected type](crate) descriptors.
///
/// Every native type gets exactly one [`ClassDesc`], created on first
/// registration together with the descriptors of its ancestors and of the
/// interfaces it implements. Descriptors are addressed by [`DescId`] and
/// keep their identity across unload/reload cycles of the native type.
///
/// Field resolution goes through the registry because an inherited member
/// is registered at the descriptor of the ancestor that declares it.
///
/// # Example
///
/// ```
/// use hb_reflect::native::MemoryTypes;
/// use hb_reflect::registry::ClassRegistry;
///
/// let mut types = MemoryTypes::new();
/// let object = types.class("Object").property("Outer", 8).finish();
/// let actor = types.class("Actor").parent(object).actor().finish();
///
/// let mut registry = ClassRegistry::new(types);
/// let actor = registry.register_reflected_type(actor);
/// let object = registry.find("UObject").unwrap();
///
/// let field = registry.register_field(actor, "Outer").unwrap().unwrap();
/// assert!(field.is_property());
/// assert_eq!(field.outer_class(), object);
/// assert_eq!(field.query_class(), actor);
/// ```
pub struct ClassRegistry<H> {
    native: H,
    config: RegistryConfig,
    defaults: DefaultParams,
    descs: SlotMap<DescId, ClassDesc>,
    by_name: HashMap<String, DescId>,
    by_native: HashMap<StructId, DescId>,
}

impl<H: NativeTypes> ClassRegistry<H> {
    /// Creates an empty registry over a host type system.
    #[inline]
    pub fn new(native: H) -> Self {
        Self::with_config(native, RegistryConfig::default())
    }

    pub fn with_config(native: H, config: RegistryConfig) -> Self {
        Self {
            native,
            config,
            defaults: DefaultParams::default(),
            descs: SlotMap::with_key(),
            by_name: HashMap::default(),
            by_native: HashMap::default(),
        }
    }

    /// Replaces the default-parameter table.
    ///
    /// Descriptors look their table up once, when they are created, so this
    /// only affects types registered afterwards.
    pub fn set_default_params(&mut self, defaults: DefaultParams) {
        self.defaults = defaults;
    }

    #[inline]
    pub fn default_params(&self) -> &DefaultParams {
        &self.defaults
    }

    #[inline]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    #[inline]
    pub fn native(&self) -> &H {
        &self.native
    }

    /// Mutable access to the host, e.g. to apply a hot reload.
    ///
    /// Destroying a native type without calling
    /// [`notify_struct_deleted`](Self::notify_struct_deleted) leaves its
    /// descriptor bound to a dead handle.
    #[inline]
    pub fn native_mut(&mut self) -> &mut H {
        &mut self.native
    }

    // -------------------------------------------------------------------------
    // Lookup

    #[inline]
    pub fn len(&self) -> usize {
        self.descs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: DescId) -> bool {
        self.descs.contains_key(id)
    }

    #[inline]
    pub fn get(&self, id: DescId) -> Option<&ClassDesc> {
        self.descs.get(id)
    }

    /// Finds a descriptor by its registered (prefixed) name.
    #[inline]
    pub fn find(&self, name: &str) -> Option<DescId> {
        self.by_name.get(name).copied()
    }

    /// Finds the descriptor currently bound to a native type.
    #[inline]
    pub fn find_by_struct(&self, ty: StructId) -> Option<DescId> {
        self.by_native.get(&ty).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DescId, &ClassDesc)> {
        self.descs.iter()
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Returns the descriptor of a native type, creating it if needed.
    ///
    /// Creating a class descriptor first registers every interface the
    /// class implements, then every ancestor, so all of them are
    /// resolvable as soon as this returns.
    pub fn register_reflected_type(&mut self, ty: StructId) -> DescId {
        if let Some(id) = self.by_native.get(&ty)
            && self.descs.contains_key(*id)
        {
            return *id;
        }

        let name = metatable_name(&self.native, ty);
        if let Some(id) = self.by_name.get(&name).copied() {
            // Same type reached through a new handle, e.g. after a reload.
            log::debug!("ClassRegistry: rebinding `{name}` to {ty:?}");
            self.by_native.insert(ty, id);
            return id;
        }

        if self.native.struct_kind(ty) == StructKind::Class {
            let interfaces = self.native.interfaces(ty).to_vec();
            for interface in interfaces {
                self.register_reflected_type(interface);
            }
        }

        let mut super_classes = Vec::new();
        let mut parent = self.native.super_struct(ty);
        while let Some(super_struct) = parent {
            super_classes.push(self.register_reflected_type(super_struct));
            parent = self.native.super_struct(super_struct);
        }

        let (native, config, defaults) = (&self.native, &self.config, &self.defaults);
        let id = self.descs.insert_with_key(|key| {
            ClassDesc::new(key, native, ty, name.clone(), super_classes, defaults, config)
        });

        log::debug!("ClassRegistry: registered `{name}` as {id:?}");
        self.by_name.insert(name, id);
        self.by_native.insert(ty, id);
        id
    }

    /// Registers a type by name, finding or loading it through the host.
    ///
    /// Accepts a descriptor name (`AActor`) as well as a bare type name
    /// (`Actor`). Returns `None` when the host knows no such type.
    pub fn register_by_name(&mut self, name: &str) -> Option<DescId> {
        if let Some(id) = self.find(name) {
            return Some(id);
        }

        let stripped = strip_type_prefix(name);
        let candidates = [Some(stripped), (stripped != name).then_some(name)];
        let ty = candidates.into_iter().flatten().find_map(|candidate| {
            self.native
                .find_struct(candidate)
                .or_else(|| self.native.load_struct(candidate))
        })?;
        Some(self.register_reflected_type(ty))
    }

    // -------------------------------------------------------------------------
    // Field resolution

    // Loads a descriptor if needed and keeps the native index in sync.
    fn load_desc<'a>(
        descs: &'a mut SlotMap<DescId, ClassDesc>,
        native: &mut H,
        by_native: &mut HashMap<StructId, DescId>,
        id: DescId,
    ) -> Result<&'a mut ClassDesc, IntegrityError> {
        let desc = descs.get_mut(id).ok_or(IntegrityError::StaleDescriptor(id))?;
        if desc.load(native)?
            && let Some(ty) = desc.native()
        {
            by_native.insert(ty, id);
        }
        Ok(desc)
    }

    /// Looks `name` up in the cache of `id` only.
    ///
    /// Loads the descriptor first if it was unloaded. Misses are not
    /// resolved; use [`register_field`](Self::register_field) for that.
    pub fn find_field(&mut self, id: DescId, name: &str) -> Result<Option<FieldDesc>, IntegrityError> {
        let desc = Self::load_desc(&mut self.descs, &mut self.native, &mut self.by_native, id)?;
        desc.find_field(&mut self.native, name)
    }

    /// Resolves `name` on `id`, registering it where it is declared.
    ///
    /// Returns `Ok(None)` if no type in the chain has such a member.
    #[inline]
    pub fn register_field(&mut self, id: DescId, name: &str) -> Result<Option<FieldDesc>, IntegrityError> {
        self.register_field_as(id, name, id)
    }

    /// Like [`register_field`](Self::register_field), recording `query` as
    /// the descriptor the lookup was issued against.
    ///
    /// An inherited member is handed over to the descriptor of the
    /// ancestor that declares it and is cached there. With
    /// [`RegistryConfig::cache_at_query`] it is additionally cached at
    /// `query`.
    pub fn register_field_as(
        &mut self,
        id: DescId,
        name: &str,
        query: DescId,
    ) -> Result<Option<FieldDesc>, IntegrityError> {
        let mut current = id;
        let mut expected = None;

        let field = loop {
            let desc = Self::load_desc(&mut self.descs, &mut self.native, &mut self.by_native, current)?;
            if let Some(outer) = expected
                && desc.native() != Some(outer)
            {
                return Err(IntegrityError::OwnerMismatch {
                    class: String::from(desc.name()),
                    field: name.into(),
                });
            }

            match desc.register_field(&mut self.native, name, query)? {
                None => return Ok(None),
                Some(Resolved::Local(field)) => break field,
                Some(Resolved::Inherited(outer)) => {
                    expected = Some(outer);
                    current = self.register_reflected_type(outer);
                }
            }
        };

        #[cfg(any(feature = "debug", debug_assertions))]
        self.check_field(&field);

        if self.config.cache_at_query
            && field.outer_class() != query
            && let Some(desc) = self.descs.get_mut(query)
            && desc.is_loaded()
        {
            desc.cache_foreign(name, field);
        }

        Ok(Some(field))
    }

    #[cfg(any(feature = "debug", debug_assertions))]
    fn check_field(&self, field: &FieldDesc) {
        let Some(outer) = self.descs.get(field.outer_class()) else {
            panic!("{field:?} points at an unregistered descriptor");
        };
        assert!(
            outer.property(field).is_some() || outer.function(field).is_some(),
            "{field:?} is out of bounds of `{}`",
            outer.name(),
        );
    }

    /// Self followed by every ancestor, immediate parent first.
    pub fn inheritance_chain(&self, id: DescId) -> Result<Vec<DescId>, IntegrityError> {
        self.descs
            .get(id)
            .map(ClassDesc::inheritance_chain)
            .ok_or(IntegrityError::StaleDescriptor(id))
    }

    /// The property entry a handle points at.
    pub fn property(&self, field: &FieldDesc) -> Option<&PropertyDesc> {
        self.descs.get(field.outer_class())?.property(field)
    }

    /// The function entry a handle points at.
    pub fn function(&self, field: &FieldDesc) -> Option<&FunctionDesc> {
        self.descs.get(field.outer_class())?.function(field)
    }

    // -------------------------------------------------------------------------
    // Lifecycle

    /// Makes sure a descriptor is bound to its native type.
    pub fn load(&mut self, id: DescId) -> Result<(), IntegrityError> {
        Self::load_desc(&mut self.descs, &mut self.native, &mut self.by_native, id).map(|_| ())
    }

    /// Unloads a descriptor, keeping its identity.
    ///
    /// Returns `false` if it was not loaded or is not registered.
    pub fn unload(&mut self, id: DescId) -> bool {
        let Some(desc) = self.descs.get_mut(id) else {
            return false;
        };
        let ty = desc.native();
        if !desc.unload() {
            return false;
        }

        if let Some(ty) = ty
            && self.by_native.get(&ty) == Some(&id)
        {
            self.by_native.remove(&ty);
        }
        if self.config.cache_at_query {
            self.forget_outer(id);
        }
        true
    }

    /// Unloads every descriptor. Returns how many were loaded.
    pub fn unload_all(&mut self) -> usize {
        let ids: Vec<DescId> = self.descs.keys().collect();
        ids.into_iter().filter(|id| self.unload(*id)).count()
    }

    /// Tells the registry the host is about to destroy a native type.
    ///
    /// The bound descriptor is unloaded and returned; it reloads by name on
    /// its next use.
    pub fn notify_struct_deleted(&mut self, ty: StructId) -> Option<DescId> {
        let id = self.find_by_struct(ty)?;
        self.unload(id);
        Some(id)
    }

    fn forget_outer(&mut self, outer: DescId) {
        let dropped: usize = self
            .descs
            .values_mut()
            .map(|desc| desc.forget_outer(outer))
            .sum();
        if dropped > 0 {
            log::trace!("ClassRegistry: dropped {dropped} handles into {outer:?}");
        }
    }

    // -------------------------------------------------------------------------
    // Ownership

    /// Returns `false` if `id` is not registered.
    pub fn add_ref(&mut self, id: DescId) -> bool {
        self.descs.get_mut(id).map(ClassDesc::add_ref).is_some()
    }

    /// Returns `false` if `id` is not registered.
    pub fn sub_ref(&mut self, id: DescId) -> bool {
        self.descs.get_mut(id).map(ClassDesc::sub_ref).is_some()
    }

    /// Destroys an unreferenced descriptor.
    ///
    /// Refused while its reference count is not zero. Keys of the evicted
    /// descriptor held elsewhere (superclass chains, field handles) become
    /// stale; handles cached in other descriptors that point into it are
    /// dropped.
    pub fn unregister(&mut self, id: DescId) -> bool {
        let Some(desc) = self.descs.get(id) else {
            return false;
        };
        if desc.ref_count() > 0 {
            log::warn!(
                "ClassRegistry: `{}` still has {} references, not unregistering",
                desc.name(),
                desc.ref_count(),
            );
            return false;
        }

        let Some(desc) = self.descs.remove(id) else {
            return false;
        };
        self.by_name.remove(desc.name());
        self.by_native.retain(|_, bound| *bound != id);
        self.forget_outer(id);

        log::debug!("ClassRegistry: unregistered `{}`", desc.name());
        true
    }
}

impl<H> Debug for ClassRegistry<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.descs.values()).finish()
    }
}
