#![expect(unsafe_code, reason = "Adjusters hop between erased pointers of checked types.")]

use alloc::vec::Vec;

use rfx_ptr::Ptr;

use crate::convert::ConversionTable;
use crate::graph::BaseGraph;
use crate::ident::{Describe, TypeIdent, ident_of};

// -----------------------------------------------------------------------------
// AsBase

/// Safe projection from a derived value to an embedded base value.
///
/// The erased adjusters of the cast engine are generated from these
/// projections, one per (derived, base) pair, so no hand-written pointer
/// offsets exist anywhere.
///
/// Normally implemented by [`reflect_bases!`](crate::reflect_bases).
pub trait AsBase<B>: Sized {
    /// Borrows the base subobject.
    fn as_base(&self) -> &B;

    /// Mutably borrows the base subobject.
    fn as_base_mut(&mut self) -> &mut B;
}

// -----------------------------------------------------------------------------
// HasBases

/// Declares a type's direct base list.
///
/// Every reflected class declares its bases — possibly none — through this
/// trait before any cast into it can be registered. Because the members of
/// [`Bases`](HasBases::Bases) are themselves bound by `HasBases`, listing a
/// base that never declared its own list is a compile error, not a runtime
/// surprise.
///
/// # Examples
///
/// ```
/// use rfx_reflect::reflect_bases;
/// # use rfx_reflect::impl_describe;
///
/// struct Top { tag: i32 }
/// struct Mid { top: Top, extra: i32 }
///
/// # impl_describe!(Top => "demo::Top", class);
/// # impl_describe!(Mid => "demo::Mid", class);
/// reflect_bases!(Top);
/// reflect_bases!(Mid: Top => top);
/// ```
pub trait HasBases: Describe {
    /// The direct bases, as a tuple of types.
    type Bases: BaseList<Self>;
}

// -----------------------------------------------------------------------------
// BaseEdge

/// One direct edge of the base graph: derived type, base type, and the
/// pointer adjuster between them.
pub struct BaseEdge {
    derived: TypeIdent,
    base: TypeIdent,
    adjust: unsafe fn(Ptr<'_>) -> Ptr<'_>,
}

impl BaseEdge {
    /// Builds the edge for one (derived, base) pair.
    pub fn new<D, B>() -> Self
    where
        D: AsBase<B> + Describe,
        B: Describe,
    {
        fn upcast<D: AsBase<B> + Describe, B: Describe>(ptr: Ptr<'_>) -> Ptr<'_> {
            // SAFETY: the engine only applies this edge to pointers whose
            // exact pointee type is `D`.
            Ptr::from_ref(unsafe { ptr.as_ref::<D>() }.as_base())
        }
        BaseEdge {
            derived: ident_of::<D>(),
            base: ident_of::<B>(),
            adjust: upcast::<D, B>,
        }
    }

    /// Identity of the derived type.
    #[inline(always)]
    pub fn derived(&self) -> TypeIdent {
        self.derived
    }

    /// Identity of the base type.
    #[inline(always)]
    pub fn base(&self) -> TypeIdent {
        self.base
    }

    // # Safety
    // `ptr` must address a live value whose exact type is the edge's
    // derived type.
    #[inline]
    pub(crate) unsafe fn apply<'a>(&self, ptr: Ptr<'a>) -> Ptr<'a> {
        // SAFETY: forwarded contract.
        unsafe { (self.adjust)(ptr) }
    }
}

// -----------------------------------------------------------------------------
// BaseList

/// A type-level list of direct bases, implemented for tuples.
///
/// Consumed by [`BaseGraph::register`]; not meant to be implemented by
/// hand.
pub trait BaseList<D: Describe + ?Sized> {
    /// Appends one edge per direct base.
    fn append_direct(edges: &mut Vec<BaseEdge>);

    /// Recursively registers every listed base's own list.
    fn register_ancestors(graph: &mut BaseGraph);

    /// Recursively registers the `&'static` upcast conversion of every
    /// edge reachable from `D`.
    fn register_reference_upcasts(table: &mut ConversionTable);
}

impl<D: Describe> BaseList<D> for () {
    #[inline]
    fn append_direct(_: &mut Vec<BaseEdge>) {}

    #[inline]
    fn register_ancestors(_: &mut BaseGraph) {}

    #[inline]
    fn register_reference_upcasts(_: &mut ConversionTable) {}
}

macro_rules! impl_base_list {
    ($($base:ident),+) => {
        impl<D, $($base),+> BaseList<D> for ($($base,)+)
        where
            D: Describe + Sync $(+ AsBase<$base>)+,
            $($base: HasBases + Sync,)+
        {
            fn append_direct(edges: &mut Vec<BaseEdge>) {
                $(edges.push(BaseEdge::new::<D, $base>());)+
            }

            fn register_ancestors(graph: &mut BaseGraph) {
                $(graph.register::<$base>();)+
            }

            fn register_reference_upcasts(table: &mut ConversionTable) {
                $(
                    table.register_reference_upcast::<D, $base>();
                    <<$base as HasBases>::Bases as BaseList<$base>>::register_reference_upcasts(
                        table,
                    );
                )+
            }
        }
    };
}

impl_base_list!(B1);
impl_base_list!(B1, B2);
impl_base_list!(B1, B2, B3);
impl_base_list!(B1, B2, B3, B4);

// -----------------------------------------------------------------------------
// reflect_bases!

/// Declares a type's direct bases and the projections to them.
///
/// The bare form declares an empty base list, which every root of a
/// hierarchy needs so that derived types can list it:
///
/// ```ignore
/// reflect_bases!(Top);
/// reflect_bases!(Left: Top => top);
/// reflect_bases!(Bottom: Left => left, Right => right, Top => left.top);
/// ```
///
/// Each `Base => field.path` arm expands to an [`AsBase`] projection
/// borrowing that field; the base list itself becomes the tuple of the
/// listed types, in order.
#[macro_export]
macro_rules! reflect_bases {
    ($ty:ty) => {
        impl $crate::HasBases for $ty {
            type Bases = ();
        }
    };
    ($ty:ty : $($base:ty => $($field:ident).+),+ $(,)?) => {
        $(
            impl $crate::AsBase<$base> for $ty {
                #[inline]
                fn as_base(&self) -> &$base {
                    &self.$($field).+
                }

                #[inline]
                fn as_base_mut(&mut self) -> &mut $base {
                    &mut self.$($field).+
                }
            }
        )+

        impl $crate::HasBases for $ty {
            type Bases = ($($base,)+);
        }
    };
}
