use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::Debug;

use hb_utils::hash::HashMap;
use hb_utils::num::padding_for;

use super::{DescId, FieldDesc, FieldKind, FunctionDesc, PropertyDesc};
use crate::defaults::{DefaultParams, FunctionCollection};
use crate::error::IntegrityError;
use crate::name::{display_name, strip_type_prefix};
use crate::native::{FunctionId, NativeTypes, PropertyId, StructId, StructKind};
use crate::registry::RegistryConfig;

// -----------------------------------------------------------------------------
// Resolved

/// Outcome of resolving a name against one descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// The member is declared here; the handle is cached in this descriptor.
    Local(FieldDesc),
    /// The member is declared by an ancestor (or an implemented interface).
    /// Resolution must continue at that type's descriptor.
    Inherited(StructId),
}

#[derive(Clone, Copy)]
enum Member {
    Property(PropertyId),
    Function(FunctionId),
}

// -----------------------------------------------------------------------------
// ClassDesc

/// Descriptor of one reflected native type.
///
/// A `ClassDesc` is created once per native type by a
/// [`ClassRegistry`](crate::registry::ClassRegistry) and keeps its identity
/// for as long as the registry does. Its member tables fill lazily, one
/// name at a time, and are dropped by
/// [`ClassRegistry::unload`](crate::registry::ClassRegistry::unload) when
/// the native type goes away. The next access loads the type again by name.
///
/// Flags, size, padding and the superclass chain are computed at
/// construction and survive unloading. Outside this crate a `ClassDesc` is
/// read-only; every state change goes through the registry.
pub struct ClassDesc {
    id: DescId,
    name: String,
    native: Option<StructId>,

    is_class: bool,
    is_script_struct: bool,
    is_interface: bool,
    is_native: bool,
    size: usize,
    userdata_padding: usize,

    // Immediate parent first.
    super_classes: Vec<DescId>,
    function_collection: Option<Arc<FunctionCollection>>,

    fields: HashMap<String, FieldDesc>,
    properties: Vec<PropertyDesc>,
    functions: Vec<FunctionDesc>,

    ref_count: u32,
}

impl ClassDesc {
    pub(crate) fn new<H: NativeTypes + ?Sized>(
        id: DescId,
        native: &H,
        ty: StructId,
        name: String,
        super_classes: Vec<DescId>,
        defaults: &DefaultParams,
        config: &RegistryConfig,
    ) -> Self {
        let kind = native.struct_kind(ty);
        let is_script_struct = kind == StructKind::ScriptStruct;
        let is_class = kind == StructKind::Class;
        let is_interface = is_class && native.is_interface(ty) && !native.is_interface_root(ty);

        let mut size = 0;
        let mut userdata_padding = 0;
        let mut function_collection = None;

        if is_class {
            size = native.structure_size(ty);
            function_collection = defaults.find(&name).cloned();
        } else if is_script_struct {
            let (struct_size, alignment) = match native.struct_ops(ty) {
                Some(ops) => (ops.size, ops.alignment),
                None => (native.structure_size(ty), native.min_alignment(ty)),
            };
            size = struct_size;
            userdata_padding = padding_for(config.userdata_header_size, alignment);
        }

        Self {
            id,
            name,
            native: Some(ty),
            is_class,
            is_script_struct,
            is_interface,
            is_native: native.is_native(ty),
            size,
            userdata_padding,
            super_classes,
            function_collection,
            fields: HashMap::default(),
            properties: Vec::new(),
            functions: Vec::new(),
            ref_count: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors

    #[inline(always)]
    pub fn id(&self) -> DescId {
        self.id
    }

    /// The prefixed name the descriptor is registered under.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The native type, `None` while unloaded.
    #[inline]
    pub fn native(&self) -> Option<StructId> {
        self.native
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.native.is_some()
    }

    #[inline]
    pub fn is_class(&self) -> bool {
        self.is_class
    }

    #[inline]
    pub fn is_script_struct(&self) -> bool {
        self.is_script_struct
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    /// Whether the type was compiled into the host rather than generated.
    #[inline]
    pub fn is_native(&self) -> bool {
        self.is_native
    }

    /// Byte size of a native instance.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bytes to insert after a userdata header so that an embedded value
    /// struct is correctly aligned. Always zero for classes.
    #[inline]
    pub fn userdata_padding(&self) -> usize {
        self.userdata_padding
    }

    /// Ancestors, immediate parent first.
    #[inline]
    pub fn super_classes(&self) -> &[DescId] {
        &self.super_classes
    }

    /// Self followed by every ancestor, immediate parent first.
    pub fn inheritance_chain(&self) -> Vec<DescId> {
        let mut chain = Vec::with_capacity(self.super_classes.len() + 1);
        chain.push(self.id);
        chain.extend_from_slice(&self.super_classes);
        chain
    }

    /// Number of cached member names.
    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyDesc] {
        &self.properties
    }

    #[inline]
    pub fn functions(&self) -> &[FunctionDesc] {
        &self.functions
    }

    /// The property a handle points at, if the handle belongs to this descriptor.
    pub fn property(&self, field: &FieldDesc) -> Option<&PropertyDesc> {
        match field.kind()? {
            FieldKind::Property(index) if field.outer_class() == self.id => {
                self.properties.get(index)
            }
            _ => None,
        }
    }

    /// The function a handle points at, if the handle belongs to this descriptor.
    pub fn function(&self, field: &FieldDesc) -> Option<&FunctionDesc> {
        match field.kind()? {
            FieldKind::Function(index) if field.outer_class() == self.id => {
                self.functions.get(index)
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Reference counting

    #[inline]
    pub(crate) fn add_ref(&mut self) {
        self.ref_count += 1;
    }

    /// Drops one reference. Reaching zero does nothing by itself; eviction
    /// is up to the registry.
    #[inline]
    pub(crate) fn sub_ref(&mut self) {
        debug_assert!(self.ref_count > 0, "unbalanced ClassDesc::sub_ref");
        self.ref_count = self.ref_count.saturating_sub(1);
    }

    #[inline]
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    // -------------------------------------------------------------------------
    // Lifecycle

    /// Acquires the native type again if the descriptor was unloaded.
    ///
    /// The lookup name is the descriptor name without its type sigil. An
    /// instantiated type is preferred; otherwise it is loaded from storage.
    /// Returns `Ok(true)` when a load actually happened.
    pub(crate) fn load<H: NativeTypes + ?Sized>(&mut self, native: &mut H) -> Result<bool, IntegrityError> {
        if self.native.is_some() {
            return Ok(false);
        }

        let name = strip_type_prefix(&self.name);
        let ty = match native.find_struct(name) {
            Some(ty) => ty,
            None => native
                .load_struct(name)
                .ok_or_else(|| IntegrityError::TypeNotFound { name: name.into() })?,
        };

        log::debug!("ClassDesc: loaded `{}` as {ty:?}", self.name);
        self.native = Some(ty);
        Ok(true)
    }

    /// Drops every member descriptor and the native type, keeping identity,
    /// flags, size and ancestry.
    ///
    /// Returns `false` if the descriptor was already unloaded.
    pub(crate) fn unload(&mut self) -> bool {
        if self.native.is_none() {
            return false;
        }

        log::debug!(
            "ClassDesc: unloading `{}` ({} fields, {} properties, {} functions)",
            self.name,
            self.fields.len(),
            self.properties.len(),
            self.functions.len(),
        );
        self.fields.clear();
        self.properties.clear();
        self.functions.clear();
        self.native = None;
        true
    }

    // -------------------------------------------------------------------------
    // Field resolution

    #[inline]
    fn ensure_loaded<H: NativeTypes + ?Sized>(&mut self, native: &mut H) -> Result<StructId, IntegrityError> {
        self.load(native)?;
        self.native
            .ok_or_else(|| IntegrityError::TypeNotFound { name: self.name.clone() })
    }

    /// Looks `name` up in the local cache only, loading first if needed.
    ///
    /// Does not search ancestors: names resolved through
    /// [`ClassRegistry::register_field`](crate::registry::ClassRegistry::register_field)
    /// are cached at the descriptor that declares them. The cache is keyed
    /// by the exact query string.
    pub(crate) fn find_field<H: NativeTypes + ?Sized>(
        &mut self,
        native: &mut H,
        name: &str,
    ) -> Result<Option<FieldDesc>, IntegrityError> {
        self.ensure_loaded(native)?;
        Ok(self.fields.get(name).copied())
    }

    /// Caches a handle resolved at another descriptor under `name`.
    pub(crate) fn cache_foreign(&mut self, name: &str, field: FieldDesc) {
        debug_assert_ne!(field.outer_class(), self.id);
        self.fields.insert(name.into(), field);
    }

    /// Drops cached handles whose members live in `outer`.
    pub(crate) fn forget_outer(&mut self, outer: DescId) -> usize {
        let before = self.fields.len();
        self.fields.retain(|_, field| field.outer_class() != outer);
        before - self.fields.len()
    }

    /// Resolves `name` against this descriptor's native type.
    ///
    /// Returns `Ok(None)` when nothing matches; no table is touched in that
    /// case. Inherited members are reported as [`Resolved::Inherited`] and
    /// are *not* cached here.
    ///
    /// Names are matched with [`NativeTypes::names_match`]. Different
    /// spellings of one member get their own cache entry but share its
    /// table slot.
    pub(crate) fn register_field<H: NativeTypes + ?Sized>(
        &mut self,
        native: &mut H,
        name: &str,
        query: DescId,
    ) -> Result<Option<Resolved>, IntegrityError> {
        let ty = self.ensure_loaded(native)?;

        if let Some(field) = self.fields.get(name) {
            log::trace!("ClassDesc: `{}.{name}` cache hit", self.name);
            return Ok(Some(Resolved::Local(*field)));
        }

        let Some(member) = self.find_member(&*native, ty, name) else {
            return Ok(None);
        };

        let outer = match member {
            Member::Property(property) => native.property_info(property).outer,
            Member::Function(function) => native.function_info(function).outer,
        };
        let Some(outer) = outer else {
            return Err(IntegrityError::OuterNotStruct {
                class: self.name.clone(),
                field: name.into(),
            });
        };

        if outer != ty {
            log::trace!("ClassDesc: `{}.{name}` is inherited from {outer:?}", self.name);
            return Ok(Some(Resolved::Inherited(outer)));
        }

        if let Some(kind) = self.position_of(member) {
            let field = FieldDesc::new(query, self.id, kind);
            self.fields.insert(name.into(), field);
            log::trace!("ClassDesc: `{}.{name}` aliases {kind:?}", self.name);
            return Ok(Some(Resolved::Local(field)));
        }

        let kind = match member {
            Member::Property(property) => {
                self.properties.push(PropertyDesc::create(&*native, property));
                FieldKind::Property(self.properties.len() - 1)
            }
            Member::Function(function) => {
                let defaults = self
                    .function_collection
                    .as_ref()
                    .and_then(|functions| functions.find(name))
                    .cloned();
                self.functions.push(FunctionDesc::new(&*native, function, defaults));
                FieldKind::Function(self.functions.len() - 1)
            }
        };

        let field = FieldDesc::new(query, self.id, kind);
        self.fields.insert(name.into(), field);
        log::trace!("ClassDesc: registered `{}.{name}` as {kind:?}", self.name);
        Ok(Some(Resolved::Local(field)))
    }

    // Slot of a member that is already in the tables under another name.
    fn position_of(&self, member: Member) -> Option<FieldKind> {
        match member {
            Member::Property(property) => self
                .properties
                .iter()
                .position(|p| p.property() == property)
                .map(FieldKind::Property),
            Member::Function(function) => self
                .functions
                .iter()
                .position(|f| f.function() == function)
                .map(FieldKind::Function),
        }
    }

    fn find_member<H: NativeTypes + ?Sized>(&self, native: &H, ty: StructId, name: &str) -> Option<Member> {
        if let Some(property) = native.find_property(ty, name) {
            return Some(Member::Property(property));
        }
        if self.is_class
            && let Some(function) = native.find_function(ty, name)
        {
            return Some(Member::Function(function));
        }
        if self.is_script_struct && !self.is_native {
            return find_generated_property(native, ty, name).map(Member::Property);
        }
        None
    }
}

/// Matches `name` against the human-authored part of the generated names
/// declared directly by `ty`. Deprecated members never match.
fn find_generated_property<H: NativeTypes + ?Sized>(native: &H, ty: StructId, name: &str) -> Option<PropertyId> {
    let found = native.declared_properties(ty).iter().copied().find(|property| {
        let info = native.property_info(*property);
        !info.deprecated && native.names_match(display_name(&info.name), name)
    });
    if let Some(property) = found {
        log::debug!(
            "ClassDesc: `{name}` matched generated member `{}`",
            native.property_info(property).name
        );
    }
    found
}

impl Debug for ClassDesc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClassDesc")
            .field("name", &self.name)
            .field("native", &self.native)
            .field("size", &self.size)
            .field("fields", &self.fields.len())
            .field("ref_count", &self.ref_count)
            .finish()
    }
}
