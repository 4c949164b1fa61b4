use core::fmt::Debug;

use super::DescId;

// -----------------------------------------------------------------------------
// FieldKind

/// Which member table of the owning descriptor a field lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Index into the property table.
    Property(usize),
    /// Index into the function table.
    Function(usize),
}

impl FieldKind {
    /// Packs the kind into a signed position.
    ///
    /// Properties map to `index + 1`, functions to `-(index + 1)`. Zero is
    /// never produced.
    #[inline]
    pub const fn encode(self) -> i32 {
        match self {
            Self::Property(index) => index as i32 + 1,
            Self::Function(index) => -(index as i32 + 1),
        }
    }

    /// Unpacks a signed position; `0` means "not resolved".
    #[inline]
    pub const fn decode(position: i32) -> Option<Self> {
        if position > 0 {
            Some(Self::Property(position as usize - 1))
        } else if position < 0 {
            Some(Self::Function(position.unsigned_abs() as usize - 1))
        } else {
            None
        }
    }
}

// -----------------------------------------------------------------------------
// FieldDesc

/// The resolved location of a member name.
///
/// `outer` is the descriptor whose tables hold the member; `query` is the
/// descriptor the first resolution was issued against, which is a
/// descendant of `outer` when the member is inherited.
///
/// Positions are only valid while `outer` stays loaded. After an unload
/// the handle must be resolved again.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDesc {
    query: DescId,
    outer: DescId,
    position: i32,
}

impl FieldDesc {
    #[inline]
    pub(crate) const fn new(query: DescId, outer: DescId, kind: FieldKind) -> Self {
        Self {
            query,
            outer,
            position: kind.encode(),
        }
    }

    /// The descriptor the member was first queried through.
    #[inline(always)]
    pub const fn query_class(&self) -> DescId {
        self.query
    }

    /// The descriptor that declares the member.
    #[inline(always)]
    pub const fn outer_class(&self) -> DescId {
        self.outer
    }

    /// The signed position: positive for properties, negative for functions.
    #[inline(always)]
    pub const fn position(&self) -> i32 {
        self.position
    }

    #[inline]
    pub const fn kind(&self) -> Option<FieldKind> {
        FieldKind::decode(self.position)
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.position != 0
    }

    #[inline]
    pub const fn is_property(&self) -> bool {
        self.position > 0
    }

    #[inline]
    pub const fn is_function(&self) -> bool {
        self.position < 0
    }
}

impl Debug for FieldDesc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldDesc")
            .field("kind", &self.kind())
            .field("outer", &self.outer)
            .field("query", &self.query)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldDesc, FieldKind};
    use crate::desc::DescId;

    #[test]
    fn signed_positions() {
        assert_eq!(FieldKind::Property(0).encode(), 1);
        assert_eq!(FieldKind::Property(4).encode(), 5);
        assert_eq!(FieldKind::Function(0).encode(), -1);
        assert_eq!(FieldKind::Function(2).encode(), -3);

        assert_eq!(FieldKind::decode(0), None);
        assert_eq!(FieldKind::decode(3), Some(FieldKind::Property(2)));
        assert_eq!(FieldKind::decode(-7), Some(FieldKind::Function(6)));
        assert_eq!(FieldKind::decode(i32::MIN), Some(FieldKind::Function(i32::MAX as usize)));
    }

    #[test]
    fn handle_flags() {
        let id = DescId::default();
        let property = FieldDesc::new(id, id, FieldKind::Property(1));
        let function = FieldDesc::new(id, id, FieldKind::Function(0));

        assert!(property.is_valid() && property.is_property() && !property.is_function());
        assert!(function.is_valid() && function.is_function() && !function.is_property());
        assert_eq!(property.position(), 2);
        assert_eq!(function.kind(), Some(FieldKind::Function(0)));
    }
}
