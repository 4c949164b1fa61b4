//! Descriptors of reflected types and their members.
//!
//! ## Menu
//!
//! - [`DescId`]: key of a [`ClassDesc`] inside a [`ClassRegistry`](crate::registry::ClassRegistry).
//! - [`ClassDesc`]: one reflected native type, its member tables and lifecycle.
//! - [`FieldDesc`]: a resolved, kind-tagged position of a member.
//! - [`PropertyDesc`], [`FunctionDesc`]: per-member entries owned by a `ClassDesc`.

// -----------------------------------------------------------------------------
// Modules

mod class;
mod field;
mod function;
mod ident;
mod property;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use class::Resolved;

pub use class::ClassDesc;
pub use field::{FieldDesc, FieldKind};
pub use function::FunctionDesc;
pub use ident::DescId;
pub use property::PropertyDesc;
