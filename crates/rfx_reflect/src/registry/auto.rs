use crate::registry::Registry;

// -----------------------------------------------------------------------------
// AutoRegistration

/// A registration hook collected at static-initialization time.
///
/// Submit one per type (or per module) with [`inventory::submit!`]; every
/// collected hook runs when [`Registry::auto_register`] is called, which
/// the [`global`](crate::registry::global) registry does on first touch.
///
/// # Examples
///
/// ```
/// use rfx_reflect::registry::AutoRegistration;
/// use rfx_reflect::{Registry, impl_describe, impl_reflect_value, reflect_bases};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Badge { stars: u8 }
///
/// impl_describe!(Badge => "demo::Badge", class);
/// impl_reflect_value!(Badge => partial_eq, debug);
/// reflect_bases!(Badge);
///
/// inventory::submit! {
///     AutoRegistration(|registry: &mut Registry| {
///         registry
///             .register_type::<Badge>()
///             .bases()
///             .property("stars", |b: &Badge| b.stars, |b: &mut Badge, v| b.stars = v);
///     })
/// }
///
/// let mut registry = Registry::new();
/// assert!(registry.auto_register());
/// assert!(registry.catalog(rfx_reflect::ident_of::<Badge>()).is_some());
/// ```
#[cfg(feature = "auto_register")]
pub struct AutoRegistration(pub fn(&mut Registry));

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegistration);

#[cfg(not(feature = "auto_register"))]
/// Disabled stand-in; enable the `auto_register` feature to collect
/// registration hooks at static-initialization time.
pub struct AutoRegistration(pub fn(&mut Registry));

impl Registry {
    /// Runs every [`AutoRegistration`] collected in the binary.
    ///
    /// Repeated calls are cheap for idempotent hooks — catalogs, base
    /// edges and conversions all replace-or-skip on re-registration.
    ///
    /// ## Return Value
    ///
    /// `true` when hooks could be collected on this build; always `false`
    /// with the `auto_register` feature disabled, without any error.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            for registration in inventory::iter::<AutoRegistration> {
                (registration.0)(self);
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }
}
