//! The conversion registry: a process- or instance-wide table of
//! `(source, target)` conversion functions.
//!
//! Conversions are *explicit* re-typings consulted by
//! [`Variant::convert`](crate::Variant::convert) — distinct from the lossy
//! `to_*` coercions. The table covers:
//!
//! - user-registered conversions ([`ConversionTable::register_typed`]);
//! - built-in numeric widenings and checked narrowings, installed by
//!   [`Registry::new`](crate::Registry::new);
//! - reference upcasts along registered base edges, installed by base
//!   registration and composed hop-by-hop for deeper ancestors;
//! - wrapper unwrapping ([`register_box_unwrap`](crate::impls::register_box_unwrap)
//!   and friends).
//!
//! Re-registering a pair replaces the earlier function: later registration
//! wins.

mod defaults;

use alloc::boxed::Box;

use crate::collections::{HashMap, new_map};
use crate::graph::AsBase;
use crate::ident::{Describe, TypeIdent, ident_of};
use crate::value::ReflectValue;
use crate::value::Variant;

pub(crate) use defaults::install_default_conversions;

// -----------------------------------------------------------------------------
// ConversionTable

/// A boxed conversion: reads the source variant, produces the target value.
pub type ConvertFn = Box<dyn Fn(&Variant) -> Option<Variant> + Send + Sync>;

/// The `(source, target) -> conversion` table.
///
/// Lookups that miss return `None`; nothing in this table panics. The
/// identity pair is implicit and never stored.
pub struct ConversionTable {
    table: HashMap<(TypeIdent, TypeIdent), ConvertFn>,
    // (pointee from, pointee to) -> (reference from, reference to), one
    // entry per registered base edge; lets the erased fallback compose
    // reference upcasts hop-by-hop without static types.
    ref_upcasts: HashMap<(TypeIdent, TypeIdent), (TypeIdent, TypeIdent)>,
}

impl ConversionTable {
    /// Creates an empty table.
    #[inline]
    pub const fn new() -> Self {
        Self {
            table: new_map(),
            ref_upcasts: new_map(),
        }
    }

    /// Registers an erased conversion. Later registration wins.
    pub fn register(&mut self, from: TypeIdent, to: TypeIdent, convert: ConvertFn) {
        self.table.insert((from, to), convert);
    }

    /// Registers a typed conversion. Later registration wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use rfx_reflect::convert::ConversionTable;
    /// use rfx_reflect::{Variant, ident_of};
    ///
    /// let mut table = ConversionTable::new();
    /// table.register_typed::<i32, String, _>(|n| Some(n.to_string()));
    ///
    /// let v = Variant::new(5i32);
    /// let s = table.apply(&v, ident_of::<String>()).unwrap();
    /// assert_eq!(s.get::<String>().map(|s| s.as_str()), Some("5"));
    /// ```
    pub fn register_typed<S, D, F>(&mut self, convert: F)
    where
        S: ReflectValue,
        D: ReflectValue,
        F: Fn(&S) -> Option<D> + Send + Sync + 'static,
    {
        self.register(
            ident_of::<S>(),
            ident_of::<D>(),
            Box::new(move |variant| {
                let source = variant.get::<S>()?;
                convert(source).map(Variant::new)
            }),
        );
    }

    /// Registers the reference upcast of one base edge:
    /// `&'static D -> &'static B` through the [`AsBase`] projection.
    pub fn register_reference_upcast<D, B>(&mut self)
    where
        D: AsBase<B> + Describe + Sync,
        B: Describe + Sync,
    {
        self.register_typed::<&'static D, &'static B, _>(|derived| {
            Some(AsBase::as_base(*derived))
        });
        self.ref_upcasts.insert(
            (ident_of::<D>(), ident_of::<B>()),
            (ident_of::<&'static D>(), ident_of::<&'static B>()),
        );
    }

    /// Looks up the conversion for a pair, `None` when absent.
    #[inline]
    pub fn find(&self, from: TypeIdent, to: TypeIdent) -> Option<&ConvertFn> {
        self.table.get(&(from, to))
    }

    /// Whether a conversion for the pair is registered.
    #[inline]
    pub fn contains(&self, from: TypeIdent, to: TypeIdent) -> bool {
        self.table.contains_key(&(from, to))
    }

    /// Runs the registered conversion of the variant's type to `to`.
    ///
    /// The identity pair clones. No path composition happens here; that is
    /// the registry's job.
    pub fn apply(&self, variant: &Variant, to: TypeIdent) -> Option<Variant> {
        let from = variant.type_ident()?;
        if from == to {
            return Some(variant.clone());
        }
        self.find(from, to)?(variant)
    }

    // The reference-type pair registered for a base edge, keyed by the
    // pointee pair.
    pub(crate) fn ref_upcast_pair(
        &self,
        from_pointee: TypeIdent,
        to_pointee: TypeIdent,
    ) -> Option<(TypeIdent, TypeIdent)> {
        self.ref_upcasts.get(&(from_pointee, to_pointee)).copied()
    }
}

impl Default for ConversionTable {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ConversionTable;
    use crate::ident::ident_of;
    use crate::Variant;

    #[test]
    fn missing_pairs_are_not_found() {
        let table = ConversionTable::new();
        assert!(table.find(ident_of::<u8>(), ident_of::<u16>()).is_none());
        assert!(!table.contains(ident_of::<u8>(), ident_of::<u16>()));
    }

    #[test]
    fn later_registration_wins() {
        let mut table = ConversionTable::new();
        table.register_typed::<u8, u16, _>(|_| Some(1u16));
        table.register_typed::<u8, u16, _>(|_| Some(2u16));

        let converted = table.apply(&Variant::new(9u8), ident_of::<u16>()).unwrap();
        assert_eq!(converted.get::<u16>(), Some(&2));
    }

    #[test]
    fn identity_application_clones() {
        let table = ConversionTable::new();
        let v = Variant::new(3i32);
        let same = table.apply(&v, ident_of::<i32>()).unwrap();
        assert_eq!(same.get::<i32>(), Some(&3));
    }

    #[test]
    fn failed_converter_yields_none() {
        let mut table = ConversionTable::new();
        table.register_typed::<i64, u32, _>(|n| u32::try_from(*n).ok());
        assert!(table.apply(&Variant::new(-1i64), ident_of::<u32>()).is_none());
        let ok = table.apply(&Variant::new(7i64), ident_of::<u32>()).unwrap();
        assert_eq!(ok.get::<u32>(), Some(&7));
    }
}
