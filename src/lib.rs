#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use rfx_ptr as ptr;
pub use rfx_reflect as reflect;
