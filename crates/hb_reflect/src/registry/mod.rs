//! Provide the registry that owns every [`ClassDesc`].
//!
//! ## Menu
//!
//! - [`ClassRegistry`]: deduplicating store of descriptors, one per native type.
//! - [`RegistryConfig`]: runtime options (userdata header, query-level caching).
//!
//! Descriptors refer to each other through [`DescId`] keys. Only the
//! registry creates or destroys descriptors, so a key handed out by it is
//! either valid or detectably stale.
//!
//! [`ClassDesc`]: crate::desc::ClassDesc
//! [`DescId`]: crate::desc::DescId

// -----------------------------------------------------------------------------
// Modules

mod class_registry;
mod config;

// -----------------------------------------------------------------------------
// Exports

pub use class_registry::ClassRegistry;
pub use config::{LUA_USERDATA_HEADER_SIZE, RegistryConfig};
