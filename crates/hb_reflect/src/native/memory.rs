use alloc::string::String;
use alloc::vec::Vec;

use hb_utils::hash::HashMap;

use super::{FunctionId, FunctionInfo, NativeTypes, ParamInfo, PropertyId};
use super::{PropertyInfo, StructId, StructKind, StructOps};

// -----------------------------------------------------------------------------
// MemoryTypes

#[derive(Clone)]
struct StructEntry {
    name: String,
    kind: StructKind,
    native: bool,
    interface: bool,
    interface_root: bool,
    actor: bool,
    size: usize,
    alignment: usize,
    ops: Option<StructOps>,
    parent: Option<StructId>,
    interfaces: Vec<StructId>,
    properties: Vec<PropertyId>,
    functions: Vec<FunctionId>,
    // `false` once evicted; the definition stays in "storage".
    instantiated: bool,
}

/// A host type system kept entirely in memory.
///
/// Types are declared through [`StructBuilder`]s. Every declared type also
/// lives in a simulated persistent storage: [`evict`](Self::evict) drops the
/// instantiated copy so that [`NativeTypes::find_struct`] misses and
/// [`NativeTypes::load_struct`] has to bring it back, while
/// [`remove`](Self::remove) deletes it for good.
///
/// # Examples
///
/// ```
/// use hb_reflect::native::{MemoryTypes, NativeTypes, StructKind};
///
/// let mut types = MemoryTypes::new();
/// let object = types.class("Object").property("Name", 8).finish();
/// let actor = types.class("Actor").parent(object).actor().finish();
///
/// assert_eq!(types.super_struct(actor), Some(object));
/// assert_eq!(types.struct_kind(actor), StructKind::Class);
/// assert!(types.find_property(actor, "Name").is_some());
/// ```
#[derive(Default)]
pub struct MemoryTypes {
    structs: Vec<StructEntry>,
    properties: Vec<PropertyInfo>,
    functions: Vec<FunctionInfo>,
    by_name: HashMap<String, StructId>,
    loads: usize,
    ignore_case: bool,
}

impl MemoryTypes {
    /// Creates an empty type system.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts declaring a class.
    pub fn class(&mut self, name: &str) -> StructBuilder<'_> {
        StructBuilder::new(self, name, StructKind::Class)
    }

    /// Starts declaring a value struct.
    pub fn script_struct(&mut self, name: &str) -> StructBuilder<'_> {
        StructBuilder::new(self, name, StructKind::ScriptStruct)
    }

    /// Returns the declared type with the given unprefixed name, instantiated or not.
    pub fn lookup(&self, name: &str) -> Option<StructId> {
        self.by_name.get(name).copied()
    }

    /// Drops the instantiated copy of a type, keeping it in storage.
    ///
    /// Returns `false` if no such type was declared.
    pub fn evict(&mut self, name: &str) -> bool {
        match self.by_name.get(name) {
            Some(id) => {
                self.structs[id.index()].instantiated = false;
                true
            }
            None => false,
        }
    }

    /// Deletes a type from both memory and storage.
    ///
    /// Its handle stays allocated so that other types can still refer to it,
    /// but it can no longer be found or loaded by name.
    pub fn remove(&mut self, name: &str) -> Option<StructId> {
        let id = self.by_name.remove(name)?;
        self.structs[id.index()].instantiated = false;
        Some(id)
    }

    /// Number of times a type had to be loaded from storage.
    #[inline]
    pub fn load_count(&self) -> usize {
        self.loads
    }

    /// Makes member names compare ASCII case-insensitively.
    pub fn set_ignore_case(&mut self, ignore_case: bool) {
        self.ignore_case = ignore_case;
    }

    /// Replaces the instantiated copy of a type with a fresh one, as a
    /// host-side hot reload does.
    ///
    /// The fresh copy gets a new handle and new member handles. The old
    /// handle stays allocated, but name lookups only reach the new one.
    pub fn reinstance(&mut self, name: &str) -> Option<StructId> {
        let old = *self.by_name.get(name)?;
        let id = StructId::new(self.structs.len() as u32);
        let mut entry = self.structs[old.index()].clone();

        for property in &mut entry.properties {
            let mut info = self.properties[property.index()].clone();
            info.outer = info.outer.map(|_| id);
            *property = PropertyId::new(self.properties.len() as u32);
            self.properties.push(info);
        }
        for function in &mut entry.functions {
            let mut info = self.functions[function.index()].clone();
            info.outer = info.outer.map(|_| id);
            *function = FunctionId::new(self.functions.len() as u32);
            self.functions.push(info);
        }

        entry.instantiated = true;
        self.structs[old.index()].instantiated = false;
        self.structs.push(entry);
        self.by_name.insert(name.into(), id);
        Some(id)
    }

    /// Renames a declared member in place, e.g. to simulate a regenerated struct.
    pub fn rename_property(&mut self, id: PropertyId, name: &str) {
        self.properties[id.index()].name = name.into();
    }

    #[inline]
    fn entry(&self, id: StructId) -> &StructEntry {
        &self.structs[id.index()]
    }
}

impl NativeTypes for MemoryTypes {
    fn struct_name(&self, id: StructId) -> &str {
        &self.entry(id).name
    }

    fn struct_kind(&self, id: StructId) -> StructKind {
        self.entry(id).kind
    }

    fn is_native(&self, id: StructId) -> bool {
        self.entry(id).native
    }

    fn is_interface(&self, id: StructId) -> bool {
        self.entry(id).interface
    }

    fn is_interface_root(&self, id: StructId) -> bool {
        self.entry(id).interface_root
    }

    fn is_actor(&self, id: StructId) -> bool {
        let mut current = Some(id);
        while let Some(ty) = current {
            if self.entry(ty).actor {
                return true;
            }
            current = self.entry(ty).parent;
        }
        false
    }

    fn structure_size(&self, id: StructId) -> usize {
        self.entry(id).size
    }

    fn min_alignment(&self, id: StructId) -> usize {
        self.entry(id).alignment
    }

    fn struct_ops(&self, id: StructId) -> Option<StructOps> {
        self.entry(id).ops
    }

    fn super_struct(&self, id: StructId) -> Option<StructId> {
        self.entry(id).parent
    }

    fn interfaces(&self, id: StructId) -> &[StructId] {
        &self.entry(id).interfaces
    }

    fn declared_properties(&self, id: StructId) -> &[PropertyId] {
        &self.entry(id).properties
    }

    fn declared_functions(&self, id: StructId) -> &[FunctionId] {
        &self.entry(id).functions
    }

    fn property_info(&self, id: PropertyId) -> &PropertyInfo {
        &self.properties[id.index()]
    }

    fn function_info(&self, id: FunctionId) -> &FunctionInfo {
        &self.functions[id.index()]
    }

    fn find_struct(&self, name: &str) -> Option<StructId> {
        let id = self.by_name.get(name)?;
        self.entry(*id).instantiated.then_some(*id)
    }

    fn names_match(&self, a: &str, b: &str) -> bool {
        if self.ignore_case {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }

    fn load_struct(&mut self, name: &str) -> Option<StructId> {
        let id = *self.by_name.get(name)?;
        self.loads += 1;
        self.structs[id.index()].instantiated = true;
        log::debug!("MemoryTypes: loaded `{name}` from storage");
        Some(id)
    }
}

// -----------------------------------------------------------------------------
// StructBuilder

struct PendingProperty {
    name: String,
    size: usize,
    deprecated: bool,
    detached: bool,
}

/// Declares one type of a [`MemoryTypes`].
///
/// Members are laid out one after another, starting at the end of the
/// parent's layout. The structure size defaults to the end of the last
/// member unless set explicitly.
pub struct StructBuilder<'a> {
    types: &'a mut MemoryTypes,
    name: String,
    kind: StructKind,
    native: bool,
    interface: bool,
    interface_root: bool,
    actor: bool,
    size: Option<usize>,
    alignment: usize,
    ops: Option<StructOps>,
    parent: Option<StructId>,
    interfaces: Vec<StructId>,
    properties: Vec<PendingProperty>,
    functions: Vec<(String, Vec<ParamInfo>)>,
}

impl<'a> StructBuilder<'a> {
    fn new(types: &'a mut MemoryTypes, name: &str, kind: StructKind) -> Self {
        Self {
            types,
            name: name.into(),
            kind,
            native: true,
            interface: false,
            interface_root: false,
            actor: false,
            size: None,
            alignment: 8,
            ops: None,
            parent: None,
            interfaces: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn parent(mut self, parent: StructId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Marks the type as produced by a code-generation pipeline.
    pub fn generated(mut self) -> Self {
        self.native = false;
        self
    }

    pub fn interface(mut self) -> Self {
        self.interface = true;
        self
    }

    /// Marks the class as the root of every interface.
    pub fn interface_root(mut self) -> Self {
        self.interface = true;
        self.interface_root = true;
        self
    }

    /// Marks the class as the spawnable actor base; descendants inherit it.
    pub fn actor(mut self) -> Self {
        self.actor = true;
        self
    }

    pub fn implements(mut self, interface: StructId) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Attaches custom native struct operations.
    pub fn ops(mut self, size: usize, alignment: usize) -> Self {
        self.ops = Some(StructOps { size, alignment });
        self
    }

    pub fn property(self, name: &str, size: usize) -> Self {
        self.push_property(name, size, false, false)
    }

    pub fn deprecated_property(self, name: &str, size: usize) -> Self {
        self.push_property(name, size, true, false)
    }

    /// Declares a member whose owner is not a struct, e.g. one left behind
    /// by a broken reload.
    pub fn detached_property(self, name: &str, size: usize) -> Self {
        self.push_property(name, size, false, true)
    }

    fn push_property(mut self, name: &str, size: usize, deprecated: bool, detached: bool) -> Self {
        self.properties.push(PendingProperty {
            name: name.into(),
            size,
            deprecated,
            detached,
        });
        self
    }

    pub fn function(mut self, name: &str, params: impl IntoIterator<Item = ParamInfo>) -> Self {
        self.functions.push((name.into(), params.into_iter().collect()));
        self
    }

    /// Registers the type and returns its handle.
    pub fn finish(self) -> StructId {
        let Self { types, .. } = self;
        let id = StructId::new(types.structs.len() as u32);

        let mut offset = self.parent.map_or(0, |p| types.entry(p).size);
        let mut properties = Vec::with_capacity(self.properties.len());
        for pending in self.properties {
            properties.push(PropertyId::new(types.properties.len() as u32));
            types.properties.push(PropertyInfo {
                name: pending.name,
                outer: (!pending.detached).then_some(id),
                offset,
                size: pending.size,
                deprecated: pending.deprecated,
            });
            offset += pending.size;
        }

        let mut functions = Vec::with_capacity(self.functions.len());
        for (name, params) in self.functions {
            functions.push(FunctionId::new(types.functions.len() as u32));
            types.functions.push(FunctionInfo {
                name,
                outer: Some(id),
                params,
            });
        }

        types.by_name.insert(self.name.clone(), id);
        types.structs.push(StructEntry {
            name: self.name,
            kind: self.kind,
            native: self.native,
            interface: self.interface,
            interface_root: self.interface_root,
            actor: self.actor,
            size: self.size.unwrap_or(offset),
            alignment: self.alignment,
            ops: self.ops,
            parent: self.parent,
            interfaces: self.interfaces,
            properties,
            functions,
            instantiated: true,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTypes;
    use crate::native::{NativeTypes, ParamInfo, StructKind};

    #[test]
    fn layout_follows_parent() {
        let mut types = MemoryTypes::new();
        let base = types.class("Base").property("A", 8).property("B", 4).finish();
        let child = types.class("Child").parent(base).property("C", 4).finish();

        assert_eq!(types.structure_size(base), 12);
        assert_eq!(types.structure_size(child), 16);

        let c = types.find_property(child, "C").unwrap();
        assert_eq!(types.property_info(c).offset, 12);
        assert_eq!(types.property_info(c).outer, Some(child));

        let a = types.find_property(child, "A").unwrap();
        assert_eq!(types.property_info(a).outer, Some(base));
    }

    #[test]
    fn functions_through_interfaces() {
        let mut types = MemoryTypes::new();
        let root = types.class("Interface").interface_root().finish();
        let usable = types
            .class("Usable")
            .parent(root)
            .interface()
            .function("Use", [ParamInfo::input("User")])
            .finish();
        let door = types.class("Door").implements(usable).finish();

        let function = types.find_function(door, "Use").unwrap();
        assert_eq!(types.function_info(function).outer, Some(usable));
        assert!(types.find_function(door, "Open").is_none());
    }

    #[test]
    fn evict_then_load() {
        let mut types = MemoryTypes::new();
        let vector = types.script_struct("Vector").ops(24, 8).finish();
        assert_eq!(types.struct_kind(vector), StructKind::ScriptStruct);

        assert!(types.evict("Vector"));
        assert_eq!(types.find_struct("Vector"), None);
        assert_eq!(types.load_struct("Vector"), Some(vector));
        assert_eq!(types.find_struct("Vector"), Some(vector));
        assert_eq!(types.load_count(), 1);

        assert_eq!(types.remove("Vector"), Some(vector));
        assert_eq!(types.load_struct("Vector"), None);
    }

    #[test]
    fn reinstance_mints_new_handles() {
        let mut types = MemoryTypes::new();
        let object = types.class("Object").finish();
        let actor = types.class("Actor").parent(object).property("Health", 4).finish();

        let fresh = types.reinstance("Actor").unwrap();
        assert_ne!(fresh, actor);
        assert_eq!(types.find_struct("Actor"), Some(fresh));
        assert_eq!(types.super_struct(fresh), Some(object));

        let old = types.find_property(actor, "Health").unwrap();
        let new = types.find_property(fresh, "Health").unwrap();
        assert_ne!(old, new);
        assert_eq!(types.property_info(old).outer, Some(actor));
        assert_eq!(types.property_info(new).outer, Some(fresh));
        assert_eq!(types.property_info(new).offset, types.property_info(old).offset);

        assert_eq!(types.reinstance("Missing"), None);
    }

    #[test]
    fn detached_members_and_case() {
        let mut types = MemoryTypes::new();
        let widget = types
            .class("Widget")
            .property("Visible", 1)
            .detached_property("Slot", 8)
            .finish();

        let slot = types.find_property(widget, "Slot").unwrap();
        assert_eq!(types.property_info(slot).outer, None);
        assert_eq!(types.property_info(slot).offset, 1);

        assert!(types.find_property(widget, "visible").is_none());
        types.set_ignore_case(true);
        assert!(types.find_property(widget, "visible").is_some());
        assert!(types.names_match("SLOT", "Slot"));
    }

    #[test]
    fn actor_flag_is_inherited() {
        let mut types = MemoryTypes::new();
        let object = types.class("Object").finish();
        let actor = types.class("Actor").parent(object).actor().finish();
        let pawn = types.class("Pawn").parent(actor).finish();

        assert!(!types.is_actor(object));
        assert!(types.is_actor(pawn));
    }
}
