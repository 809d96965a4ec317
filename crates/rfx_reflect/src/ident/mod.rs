//! Type identity: interned descriptors for every observed type signature.
//!
//! ## Menu
//!
//! - [`TypeIdent`]: a process-unique ordinal naming one type signature.
//! - [`TypeFlags`]: classification bits (class, enum, pointer, array, ...).
//! - [`TypeDesc`]: the interned descriptor — ordinal, names, flags, and the
//!   links to its raw/pointee/element types.
//! - [`TypeDescBuilder`]: the one-shot input shape consumed by interning.
//! - [`Describe`]: the per-type accessor (`fn type_desc()`), implemented
//!   through [`TypeDescCell`] for non-generic impl sites and through direct
//!   interning for generic ones.
//! - [`desc_by_name`] / [`desc_by_ident`]: registry lookups for types that
//!   have been observed at least once.
//!
//! Descriptors are created on first observation, leaked to `'static`, and
//! never mutated afterwards; identity comparisons are defined over the
//! ordinal only. Names are for display and lookup.

// -----------------------------------------------------------------------------
// Modules

mod describe;
mod registry;
mod type_desc;

// -----------------------------------------------------------------------------
// Exports

pub use describe::{Describe, desc_of, ident_of};
pub use registry::{
    TypeDescCell, concat, desc_by_ident, desc_by_name, intern_with, is_ambiguous, leak_str,
    observed_count, short_name,
};
pub use type_desc::{ArrayDesc, TypeDesc, TypeDescBuilder, TypeFlags, TypeIdent};
