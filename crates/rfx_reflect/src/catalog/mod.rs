//! Per-type member records: constructors, methods, properties and
//! enumerations, with type-checked erased invocation.
//!
//! ## Menu
//!
//! - [`Access`]: public/protected/private tag carried by every record.
//! - [`MetaMap`]: registration-order key/value metadata.
//! - [`ParamInfo`]: one parameter — identity, optional name, optional
//!   default value.
//! - [`Instance`] / [`InstanceMut`]: an erased target pointer paired with
//!   its exact runtime identity.
//! - [`Method`], [`Property`], [`Constructor`], [`Destructor`],
//!   [`Enumeration`]: the records themselves.
//! - [`MethodFunc`] / [`CtorFunc`]: adapter traits turning plain closures
//!   into erased, type-checked invocation thunks (arities 0 through 5).
//! - [`TypeCatalog`]: one type's records, in registration order.
//! - [`InvokeError`]: the failure taxonomy of invocation and construction.
//!
//! Lookup and overload selection live on
//! [`Registry`](crate::Registry), which walks the base graph to merge
//! inherited members into a type's view.

// -----------------------------------------------------------------------------
// Modules

mod access;
mod constructor;
mod enumeration;
mod error;
mod instance;
mod method;
mod property;
mod type_catalog;

// -----------------------------------------------------------------------------
// Exports

pub use access::{Access, MemberOptions, MetaMap, ParamInfo};
pub use constructor::{ConstructPolicy, Constructor, CtorFunc, Destructor};
pub use enumeration::{EnumItem, Enumeration};
pub use error::InvokeError;
pub use instance::{Instance, InstanceMut};
pub use method::{Method, MethodFunc};
pub use property::Property;
pub use type_catalog::TypeCatalog;

pub(crate) use access::build_params;
pub(crate) use method::{prepare_args, select_candidate};
