#![expect(unsafe_code, reason = "Operation tables work on type-erased pointers.")]

use alloc::boxed::Box;
use core::alloc::Layout;
use core::any::TypeId;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::marker::PhantomData;
use std::sync::{OnceLock, PoisonError, RwLock};

use rfx_ptr::{Ptr, PtrMut};

use crate::collections::{HashMap, new_map};
use crate::ident::{Describe, TypeDesc};
use crate::value::views::{MappingOps, SequenceOps};

// -----------------------------------------------------------------------------
// ReflectValue

/// A type that can live inside a [`Variant`](crate::Variant).
///
/// Ties the type to its `'static` [`VariantOps`] table. Implementations are
/// normally produced by [`impl_reflect_value!`](crate::impl_reflect_value)
/// (non-generic types) or written by hand with a [`GenericOpsCell`]
/// (generic types); either way the table is built once through
/// [`VariantOpsBuilder`] and reused forever.
///
/// # Contract
///
/// `variant_ops()` must return a table built for exactly `Self`. The
/// container checks this on construction and panics on a mismatched table,
/// so a broken implementation cannot corrupt stored values.
pub trait ReflectValue: Describe + Send + Sync + 'static {
    /// Returns the operation table of `Self`.
    fn variant_ops() -> &'static VariantOps;
}

// -----------------------------------------------------------------------------
// LossyCoerce

/// Best-effort primitive coercions, captured into [`VariantOps`] via
/// [`VariantOpsBuilder::coercions`].
///
/// Every method defaults to `None`; implementations override what their
/// type can offer. These are *lossy* conveniences (`128u64` coerces to
/// `true`), distinct from the conversion registry.
pub trait LossyCoerce {
    /// Boolean reading of the value, if it has one.
    fn lossy_bool(&self) -> Option<bool> {
        None
    }

    /// Signed reading of the value, if it fits.
    fn lossy_i64(&self) -> Option<i64> {
        None
    }

    /// Unsigned reading of the value, if it fits.
    fn lossy_u64(&self) -> Option<u64> {
        None
    }

    /// Floating-point reading of the value.
    fn lossy_f64(&self) -> Option<f64> {
        None
    }
}

// -----------------------------------------------------------------------------
// VariantOps

/// The per-type operation table of the value container.
///
/// Captured once per type when a value is first stored; drop and clone are
/// mandatory, everything else is a capability the type opted into through
/// the builder.
///
/// Every erased function trusts that the pointer it receives addresses a
/// valid value of the table's type — the container guarantees this by
/// construction.
pub struct VariantOps {
    pub(crate) desc: fn() -> &'static TypeDesc,
    pub(crate) layout: Layout,
    pub(crate) drop_in_place: unsafe fn(PtrMut<'_>),
    pub(crate) clone_into: unsafe fn(Ptr<'_>, PtrMut<'_>),
    pub(crate) partial_eq: Option<unsafe fn(Ptr<'_>, Ptr<'_>) -> bool>,
    pub(crate) partial_cmp: Option<unsafe fn(Ptr<'_>, Ptr<'_>) -> Option<Ordering>>,
    pub(crate) hash: Option<unsafe fn(Ptr<'_>) -> u64>,
    pub(crate) debug: Option<unsafe fn(Ptr<'_>, &mut fmt::Formatter<'_>) -> fmt::Result>,
    pub(crate) display: Option<unsafe fn(Ptr<'_>, &mut fmt::Formatter<'_>) -> fmt::Result>,
    pub(crate) as_bool: Option<unsafe fn(Ptr<'_>) -> Option<bool>>,
    pub(crate) as_i64: Option<unsafe fn(Ptr<'_>) -> Option<i64>>,
    pub(crate) as_u64: Option<unsafe fn(Ptr<'_>) -> Option<u64>>,
    pub(crate) as_f64: Option<unsafe fn(Ptr<'_>) -> Option<f64>>,
    pub(crate) sequence: Option<&'static SequenceOps>,
    pub(crate) mapping: Option<&'static MappingOps>,
}

impl VariantOps {
    /// The descriptor of the type this table was built for.
    #[inline]
    pub fn desc(&self) -> &'static TypeDesc {
        (self.desc)()
    }

    /// The host [`TypeId`] of the type this table was built for.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.desc().type_id()
    }

    /// Size and alignment of the stored type.
    #[inline(always)]
    pub const fn layout(&self) -> Layout {
        self.layout
    }
}

// -----------------------------------------------------------------------------
// VariantOpsBuilder

/// Capability-gated construction of a [`VariantOps`] table.
///
/// [`new`](VariantOpsBuilder::new) fills in the mandatory entries (drop,
/// clone, layout, descriptor); each further method captures one capability
/// and carries the matching trait bound, so a table can never promise an
/// operation its type does not support.
///
/// # Examples
///
/// ```
/// use rfx_reflect::value::{VariantOps, VariantOpsBuilder};
///
/// let ops: &'static VariantOps = VariantOpsBuilder::<u32>::new()
///     .partial_eq()
///     .partial_ord()
///     .hashable()
///     .debug()
///     .display()
///     .leak();
/// assert_eq!(ops.desc().path(), "u32");
/// ```
pub struct VariantOpsBuilder<T> {
    ops: VariantOps,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Describe + Clone + Send + Sync> VariantOpsBuilder<T> {
    /// Starts a table with the mandatory drop and clone entries.
    pub fn new() -> Self {
        Self {
            ops: VariantOps {
                desc: T::type_desc,
                layout: Layout::new::<T>(),
                // SAFETY (all entries): the container only calls these with
                // pointers to live values of `T`.
                drop_in_place: |ptr| unsafe { ptr.drop_as::<T>() },
                clone_into: |src, dst| unsafe {
                    let clone = src.as_ref::<T>().clone();
                    dst.write::<T>(clone);
                },
                partial_eq: None,
                partial_cmp: None,
                hash: None,
                debug: None,
                display: None,
                as_bool: None,
                as_i64: None,
                as_u64: None,
                as_f64: None,
                sequence: None,
                mapping: None,
            },
            _marker: PhantomData,
        }
    }

    /// Captures `==` from [`PartialEq`].
    pub fn partial_eq(mut self) -> Self
    where
        T: PartialEq,
    {
        self.ops.partial_eq = Some(|a, b| unsafe { a.as_ref::<T>() == b.as_ref::<T>() });
        self
    }

    /// Captures ordering from [`PartialOrd`].
    pub fn partial_ord(mut self) -> Self
    where
        T: PartialOrd,
    {
        self.ops.partial_cmp =
            Some(|a, b| unsafe { a.as_ref::<T>().partial_cmp(b.as_ref::<T>()) });
        self
    }

    /// Captures hashing from [`Hash`], using the crate's fixed hasher.
    pub fn hashable(mut self) -> Self
    where
        T: Hash,
    {
        self.ops.hash = Some(|ptr| {
            let mut hasher = value_hasher();
            unsafe { ptr.as_ref::<T>() }.hash(&mut hasher);
            hasher.finish()
        });
        self
    }

    /// Captures [`fmt::Debug`].
    pub fn debug(mut self) -> Self
    where
        T: fmt::Debug,
    {
        fn fmt_debug<T: fmt::Debug>(ptr: Ptr<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Debug::fmt(unsafe { ptr.as_ref::<T>() }, f)
        }
        self.ops.debug = Some(fmt_debug::<T>);
        self
    }

    /// Captures [`fmt::Display`], which also powers string coercion.
    pub fn display(mut self) -> Self
    where
        T: fmt::Display,
    {
        fn fmt_display<T: fmt::Display>(ptr: Ptr<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Display::fmt(unsafe { ptr.as_ref::<T>() }, f)
        }
        self.ops.display = Some(fmt_display::<T>);
        self
    }

    /// Captures the [`LossyCoerce`] readings of the type.
    pub fn coercions(mut self) -> Self
    where
        T: LossyCoerce,
    {
        self.ops.as_bool = Some(|ptr| unsafe { ptr.as_ref::<T>() }.lossy_bool());
        self.ops.as_i64 = Some(|ptr| unsafe { ptr.as_ref::<T>() }.lossy_i64());
        self.ops.as_u64 = Some(|ptr| unsafe { ptr.as_ref::<T>() }.lossy_u64());
        self.ops.as_f64 = Some(|ptr| unsafe { ptr.as_ref::<T>() }.lossy_f64());
        self
    }

    /// Attaches a sequence view table.
    pub fn sequence(mut self, ops: &'static SequenceOps) -> Self {
        self.ops.sequence = Some(ops);
        self
    }

    /// Attaches a mapping view table.
    pub fn mapping(mut self, ops: &'static MappingOps) -> Self {
        self.ops.mapping = Some(ops);
        self
    }

    /// Finishes the table, leaking it to `'static`.
    pub fn leak(self) -> &'static VariantOps {
        Box::leak(Box::new(self.ops))
    }
}

impl<T: Describe + Clone + Send + Sync> Default for VariantOpsBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Hashing

/// Returns the hasher used for [`Variant`](crate::Variant) value hashes.
///
/// Fixed-seeded, so equal values hash equally across runs of one build.
pub fn value_hasher() -> impl Hasher {
    foldhash::fast::FixedState::with_seed(0x5265666c65637421).build_hasher()
}

// -----------------------------------------------------------------------------
// Ops cells

/// One-time storage for a non-generic [`ReflectValue`] impl site.
///
/// # Examples
///
/// ```ignore
/// impl ReflectValue for Shape {
///     fn variant_ops() -> &'static VariantOps {
///         static CELL: VariantOpsCell = VariantOpsCell::new();
///         CELL.get_or_init(|| VariantOpsBuilder::<Shape>::new().partial_eq().leak())
///     }
/// }
/// ```
pub struct VariantOpsCell(OnceLock<&'static VariantOps>);

impl VariantOpsCell {
    /// Create an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored table, building it on first use.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> &'static VariantOps) -> &'static VariantOps {
        self.0.get_or_init(f)
    }
}

impl Default for VariantOpsCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Per-instantiation storage for a generic [`ReflectValue`] impl site.
///
/// A `static` inside a generic function is shared by every instantiation,
/// so generic impls key their tables by [`TypeId`] instead.
///
/// # Examples
///
/// ```ignore
/// impl<T: ReflectValue + Clone> ReflectValue for Vec<T> {
///     fn variant_ops() -> &'static VariantOps {
///         static CELL: GenericOpsCell = GenericOpsCell::new();
///         CELL.get_or_insert::<Self>(|| { /* build */ })
///     }
/// }
/// ```
pub struct GenericOpsCell(RwLock<HashMap<TypeId, &'static VariantOps>>);

impl GenericOpsCell {
    /// Create an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(new_map()))
    }

    /// Returns the table of instantiation `G`, building it on first use.
    pub fn get_or_insert<G: 'static>(
        &self,
        f: impl FnOnce() -> &'static VariantOps,
    ) -> &'static VariantOps {
        let type_id = TypeId::of::<G>();
        if let Some(ops) = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return ops;
        }
        let ops = f();
        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id)
            .or_insert(ops)
    }
}

impl Default for GenericOpsCell {
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

    #[test]
    fn builder_captures_requested_capabilities_only() {
        let ops = VariantOpsBuilder::<i32>::new().partial_eq().leak();
        assert!(ops.partial_eq.is_some());
        assert!(ops.partial_cmp.is_none());
        assert!(ops.hash.is_none());
        assert_eq!(ops.layout(), core::alloc::Layout::new::<i32>());
    }

    #[test]
    fn generic_cell_keeps_instantiations_apart() {
        static CELL: GenericOpsCell = GenericOpsCell::new();
        let a = CELL.get_or_insert::<u8>(|| VariantOpsBuilder::<u8>::new().leak());
        let b = CELL.get_or_insert::<u16>(|| VariantOpsBuilder::<u16>::new().leak());
        assert!(!core::ptr::eq(a, b));
        let a2 = CELL.get_or_insert::<u8>(|| unreachable!());
        assert!(core::ptr::eq(a, a2));
    }
}
