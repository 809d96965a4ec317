#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod collections;

pub mod catalog;
pub mod convert;
pub mod graph;
pub mod ident;
pub mod impls;
pub mod registry;
pub mod value;

// -----------------------------------------------------------------------------
// Top-level exports

pub use catalog::{Access, Instance, InstanceMut, InvokeError, MetaMap};
pub use graph::{AsBase, BaseGraph, HasBases};
pub use ident::{Describe, TypeDesc, TypeDescBuilder, TypeFlags, TypeIdent, desc_of, ident_of};
pub use registry::{Registry, RegistryArc};
pub use value::{ReflectValue, Variant};
