#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use hb_reflect as reflect;
pub use hb_utils as utils;
