//! Descriptor and value-ops implementations for built-in types, and the
//! macros that expand the same implementations for user types.
//!
//! ## Menu
//!
//! - [`impl_describe!`](crate::impl_describe): descriptor impl for a
//!   non-generic type.
//! - [`impl_reflect_value!`](crate::impl_reflect_value): ops-table impl
//!   listing the capabilities the type opts into.
//! - `primitives`: numerics, `bool`, `char`, `()`, strings.
//! - `containers`: `Vec<T>`, `[T; N]`, `HashMap<K, V>`, `BTreeMap<K, V>`
//!   with sequence/mapping views.
//! - `wrappers`: `Box<T>`, `Arc<T>`, `&'static T`, and the wrapper-unwrap
//!   conversion installers.

// -----------------------------------------------------------------------------
// Modules

mod containers;
mod macros;
mod primitives;
mod wrappers;

// -----------------------------------------------------------------------------
// Exports

pub use wrappers::{register_arc_unwrap, register_box_unwrap};
