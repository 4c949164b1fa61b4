//! The seam between descriptors and the host's own reflection system.
//!
//! ## Menu
//!
//! - [`StructId`], [`PropertyId`], [`FunctionId`]: opaque handles minted by the host.
//! - [`NativeTypes`]: the queries a [`ClassDesc`](crate::desc::ClassDesc) needs
//!   to classify, size and resolve members of a native type.
//! - [`MemoryTypes`]: an in-memory host, useful for embedding tests.
//!
//! Handles are only meaningful to the host that produced them. A host may
//! hand out a different [`StructId`] after a type is destroyed and loaded
//! again; descriptors never assume otherwise.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Debug, Display};

// -----------------------------------------------------------------------------
// Modules

mod memory;

pub use memory::{MemoryTypes, StructBuilder};

// -----------------------------------------------------------------------------
// Handles

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates a handle from a raw host index.
            #[inline(always)]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw host index.
            #[inline(always)]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl Display for $name {
            #[inline]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                Display::fmt(&self.0, f)
            }
        }
    };
}

define_handle! {
    /// Handle to a native struct, class or interface.
    StructId
}

define_handle! {
    /// Handle to a native data member.
    PropertyId
}

define_handle! {
    /// Handle to a native callable member.
    FunctionId
}

// -----------------------------------------------------------------------------
// Native metadata

/// The structural category of a native type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructKind {
    /// A polymorphic class. Interfaces are classes with the interface flag.
    Class,
    /// A plain-data value struct.
    ScriptStruct,
    /// Any other structural type (e.g. a function signature).
    Struct,
}

/// Size and alignment reported by a struct's custom native operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructOps {
    pub size: usize,
    pub alignment: usize,
}

/// Metadata of a native data member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    /// The struct that declares the member, `None` when the owner is not structural.
    pub outer: Option<StructId>,
    pub offset: usize,
    pub size: usize,
    pub deprecated: bool,
}

/// Metadata of one parameter of a native callable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub is_return: bool,
    pub is_out: bool,
}

impl ParamInfo {
    /// A by-value input parameter.
    pub fn input(name: &str) -> Self {
        Self {
            name: name.into(),
            is_return: false,
            is_out: false,
        }
    }

    /// An output parameter passed by reference.
    pub fn output(name: &str) -> Self {
        Self {
            name: name.into(),
            is_return: false,
            is_out: true,
        }
    }

    /// The return value slot.
    pub fn ret(name: &str) -> Self {
        Self {
            name: name.into(),
            is_return: true,
            is_out: true,
        }
    }
}

/// Metadata of a native callable member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    /// The class that declares the callable, `None` when the owner is not structural.
    pub outer: Option<StructId>,
    pub params: Vec<ParamInfo>,
}

// -----------------------------------------------------------------------------
// NativeTypes

/// Reflection queries answered by the host object system.
///
/// The lookup methods [`find_property`](NativeTypes::find_property) and
/// [`find_function`](NativeTypes::find_function) have default implementations
/// in terms of the declaration tables and the inheritance relation. Hosts
/// with their own indexed lookups should override them.
pub trait NativeTypes {
    /// The unprefixed name of a type, e.g. `Actor` or `Vector`.
    fn struct_name(&self, id: StructId) -> &str;

    fn struct_kind(&self, id: StructId) -> StructKind;

    /// Whether the type was compiled into the host rather than generated.
    fn is_native(&self, id: StructId) -> bool;

    /// Whether the class carries the interface flag.
    fn is_interface(&self, id: StructId) -> bool;

    /// Whether the type is the universal root every interface derives from.
    fn is_interface_root(&self, id: StructId) -> bool;

    /// Whether the class derives from the host's spawnable actor class.
    fn is_actor(&self, id: StructId) -> bool;

    /// Generic structure size in bytes.
    fn structure_size(&self, id: StructId) -> usize;

    /// Generic minimum alignment in bytes.
    fn min_alignment(&self, id: StructId) -> usize;

    /// Custom native operations of a value struct, if it has any.
    fn struct_ops(&self, id: StructId) -> Option<StructOps>;

    /// The direct ancestor of a type.
    fn super_struct(&self, id: StructId) -> Option<StructId>;

    /// Interfaces directly implemented by a class.
    fn interfaces(&self, id: StructId) -> &[StructId];

    /// Data members declared by the type itself, inherited ones excluded.
    fn declared_properties(&self, id: StructId) -> &[PropertyId];

    /// Callables declared by the type itself, inherited ones excluded.
    fn declared_functions(&self, id: StructId) -> &[FunctionId];

    fn property_info(&self, id: PropertyId) -> &PropertyInfo;

    fn function_info(&self, id: FunctionId) -> &FunctionInfo;

    /// Finds an already instantiated type by its unprefixed name.
    fn find_struct(&self, name: &str) -> Option<StructId>;

    /// Materializes a type from persistent storage.
    ///
    /// This may block on I/O.
    fn load_struct(&mut self, name: &str) -> Option<StructId>;

    /// Whether two member names denote the same member.
    ///
    /// Exact comparison by default. Hosts whose names are case-insensitive
    /// override this; lookups and generated-name matching follow it.
    fn names_match(&self, a: &str, b: &str) -> bool {
        a == b
    }

    /// Finds a data member by name, searching ancestors too.
    fn find_property(&self, id: StructId, name: &str) -> Option<PropertyId> {
        let mut current = Some(id);
        while let Some(ty) = current {
            let found = self
                .declared_properties(ty)
                .iter()
                .find(|p| self.names_match(&self.property_info(**p).name, name));
            if let Some(property) = found {
                return Some(*property);
            }
            current = self.super_struct(ty);
        }
        None
    }

    /// Finds a callable by name, searching ancestors and then implemented interfaces.
    fn find_function(&self, id: StructId, name: &str) -> Option<FunctionId> {
        let declared_in = |ty: StructId| {
            self.declared_functions(ty)
                .iter()
                .copied()
                .find(|f| self.names_match(&self.function_info(*f).name, name))
        };

        let mut current = Some(id);
        while let Some(ty) = current {
            if let Some(function) = declared_in(ty) {
                return Some(function);
            }
            current = self.super_struct(ty);
        }

        let mut current = Some(id);
        while let Some(ty) = current {
            for interface in self.interfaces(ty) {
                if let Some(function) = self.find_function(*interface, name) {
                    return Some(function);
                }
            }
            current = self.super_struct(ty);
        }
        None
    }
}
