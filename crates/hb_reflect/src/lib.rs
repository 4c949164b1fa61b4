#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod defaults;
pub mod desc;
pub mod name;
pub mod native;
pub mod registry;

mod error;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use desc::{ClassDesc, DescId, FieldDesc, FieldKind};
pub use error::IntegrityError;
pub use registry::{ClassRegistry, RegistryConfig};
