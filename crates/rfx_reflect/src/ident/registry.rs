use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::collections::{HashMap, HashSet, new_map, new_set};
use crate::ident::{TypeDesc, TypeDescBuilder, TypeIdent};

// -----------------------------------------------------------------------------
// Interning tables

// Descriptors are leaked on first observation and indexed three ways:
// by host TypeId (interning key), by ordinal (dense vec), and by name.
struct IdentTables {
    by_type_id: HashMap<TypeId, &'static TypeDesc>,
    by_ident: Vec<&'static TypeDesc>,
    by_path: HashMap<&'static str, TypeIdent>,
    by_name: HashMap<&'static str, TypeIdent>,
    ambiguous_names: HashSet<&'static str>,
}

impl IdentTables {
    const fn empty() -> Self {
        Self {
            by_type_id: new_map(),
            by_ident: Vec::new(),
            by_path: new_map(),
            by_name: new_map(),
            ambiguous_names: new_set(),
        }
    }

    // # Validity
    // The descriptor must not already exist.
    fn add_name_indices(&mut self, desc: &'static TypeDesc) {
        let name = desc.name();
        if !self.ambiguous_names.contains(name) {
            if self.by_name.contains_key(name) {
                self.by_name.remove(name);
                self.ambiguous_names.insert(name);
            } else {
                self.by_name.insert(name, desc.ident());
            }
        }

        // Full paths are assumed unique per signature.
        self.by_path.insert(desc.path(), desc.ident());
    }
}

fn tables() -> &'static RwLock<IdentTables> {
    static TABLES: OnceLock<RwLock<IdentTables>> = OnceLock::new();
    TABLES.get_or_init(|| RwLock::new(IdentTables::empty()))
}

// -----------------------------------------------------------------------------
// Interning

/// Interns the descriptor of the type identified by `type_id`.
///
/// The builder closure only runs when the type has not been observed yet,
/// and runs *outside* the registry lock, so it may freely intern its own
/// dependencies (a decorated descriptor interns its pointee first). Two
/// threads racing on the same first observation both build, but exactly one
/// result is frozen and both observe it.
///
/// This is the slow path behind [`Describe`](super::Describe)
/// implementations; non-generic impl sites should go through
/// [`TypeDescCell`] instead.
pub fn intern_with(
    type_id: TypeId,
    make: impl FnOnce() -> TypeDescBuilder,
) -> &'static TypeDesc {
    if let Some(desc) = lookup_type_id(type_id) {
        return desc;
    }

    let builder = make();

    let mut tables = tables().write().unwrap_or_else(PoisonError::into_inner);
    if let Some(desc) = tables.by_type_id.get(&type_id) {
        // Lost the race; the other thread's descriptor wins.
        return desc;
    }

    let ident = TypeIdent::from_index(tables.by_ident.len());
    let desc: &'static TypeDesc = Box::leak(Box::new(builder.freeze(ident, type_id)));
    tables.by_type_id.insert(type_id, desc);
    tables.by_ident.push(desc);
    tables.add_name_indices(desc);
    desc
}

fn lookup_type_id(type_id: TypeId) -> Option<&'static TypeDesc> {
    tables()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .by_type_id
        .get(&type_id)
        .copied()
}

// -----------------------------------------------------------------------------
// Lookup

/// Returns the descriptor with the given ordinal.
///
/// Only ordinals previously handed out by this process resolve.
pub fn desc_by_ident(ident: TypeIdent) -> Option<&'static TypeDesc> {
    tables()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .by_ident
        .get(ident.index())
        .copied()
}

/// Returns the descriptor with the given full path or short name.
///
/// Only types observed at least once can be found. The full path is
/// consulted first; a short name that matches several registered types is
/// ambiguous and resolves to `None`.
///
/// # Examples
///
/// ```
/// use rfx_reflect::ident::{desc_by_name, desc_of};
///
/// let i32_desc = desc_of::<i32>();
/// assert_eq!(desc_by_name("i32"), Some(i32_desc));
/// assert_eq!(desc_by_name("such::a::type::was::never::observed"), None);
/// ```
pub fn desc_by_name(name: &str) -> Option<&'static TypeDesc> {
    let tables = tables().read().unwrap_or_else(PoisonError::into_inner);
    let ident = match tables.by_path.get(name) {
        Some(ident) => *ident,
        None => *tables.by_name.get(name)?,
    };
    tables.by_ident.get(ident.index()).copied()
}

/// Returns `true` if the given short name matches several observed types.
pub fn is_ambiguous(name: &str) -> bool {
    tables()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .ambiguous_names
        .contains(name)
}

/// Number of type signatures observed so far in this process.
pub fn observed_count() -> usize {
    tables()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .by_ident
        .len()
}

// -----------------------------------------------------------------------------
// String leaking

/// Concatenates string parts into a leaked `'static` string.
///
/// Used for the names of decorated and generic descriptors; callers must
/// ensure the leak happens at most once per descriptor, which the interning
/// closure guarantees.
pub fn concat(parts: &[&str]) -> &'static str {
    let mut out = String::new();
    for part in parts {
        out.push_str(part);
    }
    leak_str(out)
}

/// Leaks an owned string to `'static`.
#[inline]
pub fn leak_str(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

/// The last `::` segment of a path, used as the short display name.
pub fn short_name(path: &'static str) -> &'static str {
    match path.rsplit("::").next() {
        Some(name) => name,
        None => path,
    }
}

// -----------------------------------------------------------------------------
// TypeDescCell

/// One-time storage for a non-generic [`Describe`](super::Describe) site.
///
/// A `static CELL` inside a generic function would be shared by every
/// instantiation, so generic impls must call [`intern_with`] directly; the
/// cell is the fast path for the non-generic case.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use rfx_reflect::ident::{Describe, TypeDesc, TypeDescBuilder, TypeDescCell, TypeFlags};
/// use rfx_reflect::ident::intern_with;
///
/// struct Shape;
///
/// impl Describe for Shape {
///     fn type_desc() -> &'static TypeDesc {
///         static CELL: TypeDescCell = TypeDescCell::new();
///         CELL.get_or_init(|| {
///             intern_with(TypeId::of::<Shape>(), || {
///                 TypeDescBuilder::named("demo::Shape", "Shape").flags(TypeFlags::CLASS)
///             })
///         })
///     }
/// }
///
/// assert_eq!(Shape::type_desc().name(), "Shape");
/// ```
pub struct TypeDescCell(OnceLock<&'static TypeDesc>);

impl TypeDescCell {
    /// Create an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored descriptor, interning it on first use.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> &'static TypeDesc) -> &'static TypeDesc {
        self.0.get_or_init(f)
    }
}

impl Default for TypeDescCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{desc_of, ident_of};

    #[test]
    fn interning_is_idempotent() {
        let first = desc_of::<u16>();
        let second = desc_of::<u16>();
        assert!(core::ptr::eq(first, second));
        assert_eq!(ident_of::<u16>(), ident_of::<u16>());
    }

    #[test]
    fn distinct_types_get_distinct_ordinals() {
        assert_ne!(ident_of::<u16>(), ident_of::<u32>());
        assert_ne!(ident_of::<u16>(), ident_of::<*const u16>());
    }

    #[test]
    fn lookup_by_path_and_name() {
        let desc = desc_of::<alloc::string::String>();
        assert_eq!(desc_by_name("alloc::string::String"), Some(desc));
        assert_eq!(desc_by_name("String"), Some(desc));
        assert_eq!(desc_by_ident(desc.ident()), Some(desc));
    }

    #[test]
    fn unobserved_names_do_not_resolve() {
        assert_eq!(desc_by_name("no::such::Type"), None);
    }

    #[test]
    fn duplicate_short_names_become_ambiguous() {
        struct First;
        struct Second;
        crate::impl_describe!(First => "ident_tests::first::Twin", class);
        crate::impl_describe!(Second => "ident_tests::second::Twin", class);

        let first = desc_of::<First>();
        let second = desc_of::<Second>();
        assert_eq!(first.name(), "Twin");
        assert_eq!(second.name(), "Twin");

        // The short name no longer resolves, the full paths still do.
        assert!(is_ambiguous("Twin"));
        assert_eq!(desc_by_name("Twin"), None);
        assert_eq!(desc_by_name("ident_tests::first::Twin"), Some(first));
        assert_eq!(desc_by_name("ident_tests::second::Twin"), Some(second));
    }

    #[test]
    fn concat_joins_parts() {
        assert_eq!(concat(&["*const ", "i32"]), "*const i32");
    }
}
