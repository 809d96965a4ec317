//! The central registry: base graph, conversion table and per-type
//! catalogs behind one accessor API.
//!
//! ## Menu
//!
//! - [`Registry`]: the store itself — constructible fresh for tests,
//!   queried concurrently after registration.
//! - [`TypeRegistrar`] / [`EnumRegistrar`]: the chained registration
//!   surface ([`Registry::register_type`], [`Registry::register_enum`]).
//! - [`RegistryArc`]: shared read/write handle.
//! - [`global`]: the lazily-initialized process-wide registry.
//! - [`AutoRegistration`]: static-initialization-time registration hooks,
//!   collected by [`Registry::auto_register`] (feature `auto_register`).
//!
//! Registration is expected to happen single-threaded during startup;
//! querying through [`RegistryArc::read`] afterwards is race-free.

// -----------------------------------------------------------------------------
// Modules

mod auto;
mod registrar;
mod registry;

// -----------------------------------------------------------------------------
// Exports

pub use auto::AutoRegistration;
pub use registrar::{EnumRegistrar, TypeRegistrar};
pub use registry::Registry;

// -----------------------------------------------------------------------------
// RegistryArc

use alloc::sync::Arc;
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A shared, lock-guarded handle to a [`Registry`].
#[derive(Clone, Default)]
pub struct RegistryArc {
    /// The wrapped [`Registry`].
    pub internal: Arc<RwLock<Registry>>,
}

impl RegistryArc {
    /// Takes a read lock on the underlying [`Registry`].
    pub fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`Registry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for RegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegistryArc").finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Global registry

/// The process-wide registry.
///
/// Initialized on first touch with the default conversions of
/// [`Registry::new`] plus every collected [`AutoRegistration`]. Cross-type
/// variant comparison and [`Variant::convert`](crate::Variant::convert)
/// consult it.
pub fn global() -> &'static RegistryArc {
    static GLOBAL: OnceLock<RegistryArc> = OnceLock::new();
    GLOBAL.get_or_init(|| {
        let arc = RegistryArc::default();
        arc.write().auto_register();
        arc
    })
}
