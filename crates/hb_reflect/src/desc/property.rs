use alloc::string::String;

use crate::native::{NativeTypes, PropertyId};

// -----------------------------------------------------------------------------
// PropertyDesc

/// A data member registered on a [`ClassDesc`](super::ClassDesc).
///
/// Only captures what the dispatch layer needs to locate the member inside
/// an instance; reading and writing values happens elsewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDesc {
    property: PropertyId,
    name: String,
    offset: usize,
    size: usize,
}

impl PropertyDesc {
    /// Captures a native data member.
    pub fn create<H: NativeTypes + ?Sized>(native: &H, property: PropertyId) -> Self {
        let info = native.property_info(property);
        Self {
            property,
            name: info.name.clone(),
            offset: info.offset,
            size: info.size,
        }
    }

    #[inline]
    pub const fn property(&self) -> PropertyId {
        self.property
    }

    /// The native (possibly generated) member name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset inside an instance of the owning type.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }
}
