use alloc::format;
use core::any::TypeId;

use crate::ident::registry::{concat, intern_with, leak_str};
use crate::ident::{TypeDesc, TypeDescBuilder, TypeFlags, TypeIdent};

// -----------------------------------------------------------------------------
// Describe

/// The per-type accessor for interned descriptors.
///
/// `type_desc()` is idempotent, thread-safe and O(1) after the first call:
/// the first observation interns a [`TypeDesc`] and every later call
/// returns the same `'static` reference.
///
/// # Implementation
///
/// Non-generic types store the reference in a
/// [`TypeDescCell`](super::TypeDescCell); generic types call
/// [`intern_with`](super::intern_with) directly, because a `static` inside
/// a generic function is shared by every instantiation. The
/// [`impl_describe!`](crate::impl_describe) macro expands the non-generic
/// form.
///
/// Implementations for reference, raw-pointer and array decorations are
/// provided blanket-wise: observing `*const T` observes `T` first and links
/// the two descriptors.
///
/// # Examples
///
/// ```
/// use rfx_reflect::{Describe, desc_of};
///
/// let desc = desc_of::<[i32; 5]>();
/// assert!(desc.is_array());
/// assert_eq!(desc.extent(), 5);
/// assert_ne!(desc, desc_of::<[i32; 6]>());
/// ```
pub trait Describe: 'static {
    /// Returns the interned descriptor of `Self`.
    fn type_desc() -> &'static TypeDesc;
}

/// Returns the interned descriptor of `T`.
#[inline]
pub fn desc_of<T: Describe>() -> &'static TypeDesc {
    T::type_desc()
}

/// Returns the identity ordinal of `T`.
#[inline]
pub fn ident_of<T: Describe>() -> TypeIdent {
    T::type_desc().ident()
}

// -----------------------------------------------------------------------------
// Decorated signatures

impl<T: Describe> Describe for &'static T {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let pointee = T::type_desc();
            TypeDescBuilder::named(
                concat(&["&'static ", pointee.path()]),
                concat(&["&", pointee.name()]),
            )
            .flags(TypeFlags::REFERENCE | TypeFlags::CONST)
            .pointee(pointee)
            .raw(pointee.raw_desc())
        })
    }
}

impl<T: Describe> Describe for &'static mut T {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let pointee = T::type_desc();
            TypeDescBuilder::named(
                concat(&["&'static mut ", pointee.path()]),
                concat(&["&mut ", pointee.name()]),
            )
            .flags(TypeFlags::REFERENCE)
            .pointee(pointee)
            .raw(pointee.raw_desc())
        })
    }
}

impl<T: Describe> Describe for *const T {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let pointee = T::type_desc();
            TypeDescBuilder::named(
                concat(&["*const ", pointee.path()]),
                concat(&["*const ", pointee.name()]),
            )
            .flags(TypeFlags::POINTER | TypeFlags::CONST)
            .pointee(pointee)
            .raw(pointee.raw_desc())
        })
    }
}

impl<T: Describe> Describe for *mut T {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let pointee = T::type_desc();
            TypeDescBuilder::named(
                concat(&["*mut ", pointee.path()]),
                concat(&["*mut ", pointee.name()]),
            )
            .flags(TypeFlags::POINTER)
            .pointee(pointee)
            .raw(pointee.raw_desc())
        })
    }
}

// Arrays are distinct types per extent, not decorations: the raw type of
// `[T; N]` is `[T; N]` itself.
impl<T: Describe, const N: usize> Describe for [T; N] {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let element = T::type_desc();
            TypeDescBuilder::named(
                leak_str(format!("[{}; {N}]", element.path())),
                leak_str(format!("[{}; {N}]", element.name())),
            )
            .array(N, element)
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::ident::{desc_of, ident_of};

    #[test]
    fn raw_unifies_decorations() {
        let raw = ident_of::<i64>();
        assert_eq!(desc_of::<&'static i64>().raw(), raw);
        assert_eq!(desc_of::<&'static mut i64>().raw(), raw);
        assert_eq!(desc_of::<*const i64>().raw(), raw);
        assert_eq!(desc_of::<*mut i64>().raw(), raw);
        // Double decoration strips fully.
        assert_eq!(desc_of::<*const *const i64>().raw(), raw);
    }

    #[test]
    fn decorated_identities_stay_distinct() {
        assert_ne!(ident_of::<i64>(), ident_of::<*const i64>());
        assert_ne!(ident_of::<*const i64>(), ident_of::<*mut i64>());
        assert_ne!(ident_of::<&'static i64>(), ident_of::<*const i64>());
    }

    #[test]
    fn pointee_strips_one_level() {
        let two = desc_of::<*const *const u8>();
        assert_eq!(two.pointee(), Some(ident_of::<*const u8>()));
        assert_eq!(two.raw(), ident_of::<u8>());
    }

    #[test]
    fn arrays_are_distinct_per_extent() {
        assert_ne!(ident_of::<[u8; 5]>(), ident_of::<[u8; 6]>());
        let desc = desc_of::<[u8; 5]>();
        assert_eq!(desc.extent(), 5);
        assert_eq!(desc.array().unwrap().element(), ident_of::<u8>());
        // An array is its own raw type.
        assert_eq!(desc.raw(), desc.ident());
        // Non-arrays report extent 0 instead of erroring.
        assert_eq!(desc_of::<u8>().extent(), 0);
    }

    #[test]
    fn const_flag_tracks_mutability() {
        assert!(desc_of::<*const u8>().flags().contains(crate::TypeFlags::CONST));
        assert!(!desc_of::<*mut u8>().flags().contains(crate::TypeFlags::CONST));
    }
}
