use alloc::vec::Vec;
use core::fmt;

use crate::catalog::MetaMap;
use crate::ident::TypeIdent;
use crate::Variant;

// -----------------------------------------------------------------------------
// EnumItem

/// One registered name/value pair of an enumeration.
pub struct EnumItem {
    name: &'static str,
    value: i64,
    holder: Variant,
}

impl EnumItem {
    /// The registered name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The underlying discriminant.
    #[inline]
    pub fn value(&self) -> i64 {
        self.value
    }

    /// A fresh variant holding the enum value.
    #[inline]
    pub fn to_variant(&self) -> Variant {
        self.holder.clone()
    }
}

impl fmt::Debug for EnumItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumItem")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Enumeration

/// The registered name ⇄ value table of one enumeration type.
///
/// Aliases are kept: several names may map to one discriminant, and the
/// reverse lookup answers with the first-registered name. An unregistered
/// discriminant has no name.
pub struct Enumeration {
    declared_in: TypeIdent,
    items: Vec<EnumItem>,
    meta: MetaMap,
}

impl Enumeration {
    pub(crate) fn new(declared_in: TypeIdent) -> Self {
        Self {
            declared_in,
            items: Vec::new(),
            meta: MetaMap::new(),
        }
    }

    pub(crate) fn push(&mut self, name: &'static str, value: i64, holder: Variant) {
        self.items.push(EnumItem {
            name,
            value,
            holder,
        });
    }

    pub(crate) fn meta_mut(&mut self) -> &mut MetaMap {
        &mut self.meta
    }

    /// Identity of the enumeration type.
    #[inline]
    pub fn type_ident(&self) -> TypeIdent {
        self.declared_in
    }

    /// The registered items, in registration order.
    #[inline]
    pub fn items(&self) -> &[EnumItem] {
        &self.items
    }

    /// The metadata of the enumeration.
    #[inline]
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// The first-registered name carrying `value`, `None` for an
    /// unregistered discriminant.
    pub fn value_to_name(&self, value: i64) -> Option<&'static str> {
        self.items
            .iter()
            .find(|item| item.value == value)
            .map(|item| item.name)
    }

    /// A variant holding the enum value registered under `name`.
    pub fn name_to_value(&self, name: &str) -> Option<Variant> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(EnumItem::to_variant)
    }

    /// The discriminant registered under `name`.
    pub fn name_to_discriminant(&self, name: &str) -> Option<i64> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value)
    }

    /// Iterates the registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.items.iter().map(|item| item.name)
    }
}

impl fmt::Debug for Enumeration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enumeration")
            .field("declared_in", &self.declared_in)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}
