use alloc::string::String;

use thiserror::Error;

use crate::desc::DescId;

// -----------------------------------------------------------------------------
// Error

/// The native type system is in a state descriptors assume cannot happen.
///
/// Cached field positions can no longer be trusted once one of these is
/// returned. Hosts usually abort through [`handle_error`](Self::handle_error);
/// hosts that can degrade (e.g. an editor session) may drop the affected
/// descriptors instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IntegrityError {
    #[error("native type `{name}` could neither be found nor loaded")]
    TypeNotFound { name: String },

    #[error("member `{field}` resolved on `{class}` is not declared by a struct")]
    OuterNotStruct { class: String, field: String },

    #[error("member `{field}` was handed to `{class}`, which does not declare it")]
    OwnerMismatch { class: String, field: String },

    #[error("descriptor {0:?} is not registered")]
    StaleDescriptor(DescId),
}

impl IntegrityError {
    #[cold]
    #[inline(never)]
    pub fn handle_error(&self) -> ! {
        panic!("{self}");
    }
}
