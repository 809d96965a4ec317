//! The type-erased value container and its per-type operation tables.
//!
//! ## Menu
//!
//! - [`Variant`]: the container — value semantics, small-payload inlining,
//!   comparison, coercion, conversion and container views.
//! - [`VariantOps`]: the per-type operation table captured at construction.
//! - [`VariantOpsBuilder`]: capability-gated construction of an ops table.
//! - [`ReflectValue`]: the trait tying a type to its ops table.
//! - [`SequenceView`] / [`MappingView`]: read access to contained arrays
//!   and associative containers.

// -----------------------------------------------------------------------------
// Modules

mod ops;
mod storage;
mod variant;
mod views;

// -----------------------------------------------------------------------------
// Exports

pub use ops::{
    GenericOpsCell, LossyCoerce, ReflectValue, VariantOps, VariantOpsBuilder, VariantOpsCell,
    value_hasher,
};
pub use variant::Variant;
pub use views::{MappingOps, MappingView, SequenceOps, SequenceView};
