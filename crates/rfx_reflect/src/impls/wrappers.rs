use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::TypeId;

use crate::ident::{TypeDescBuilder, concat, intern_with};
use crate::registry::Registry;
use crate::value::{GenericOpsCell, VariantOps, VariantOpsBuilder};
use crate::{Describe, ReflectValue, TypeDesc, TypeFlags};

// -----------------------------------------------------------------------------
// &'static T

// References are valid payloads when the pointee is shareable; the payload
// is the reference itself, cloned by copy.
impl<T: Describe + Sync> ReflectValue for &'static T {
    fn variant_ops() -> &'static VariantOps {
        static CELL: GenericOpsCell = GenericOpsCell::new();
        CELL.get_or_insert::<Self>(|| VariantOpsBuilder::<Self>::new().leak())
    }
}

// -----------------------------------------------------------------------------
// Box<T>

impl<T: Describe> Describe for Box<T> {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let wrapped = T::type_desc();
            TypeDescBuilder::named(
                concat(&["alloc::boxed::Box<", wrapped.path(), ">"]),
                concat(&["Box<", wrapped.name(), ">"]),
            )
            .flags(TypeFlags::GENERIC)
            .wrapped(wrapped)
        })
    }
}

impl<T: ReflectValue + Clone> ReflectValue for Box<T> {
    fn variant_ops() -> &'static VariantOps {
        static CELL: GenericOpsCell = GenericOpsCell::new();
        CELL.get_or_insert::<Self>(|| VariantOpsBuilder::<Self>::new().leak())
    }
}

// -----------------------------------------------------------------------------
// Arc<T>

impl<T: Describe> Describe for Arc<T> {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let wrapped = T::type_desc();
            TypeDescBuilder::named(
                concat(&["alloc::sync::Arc<", wrapped.path(), ">"]),
                concat(&["Arc<", wrapped.name(), ">"]),
            )
            .flags(TypeFlags::GENERIC)
            .wrapped(wrapped)
        })
    }
}

// Cloning an `Arc` payload clones the handle, not the pointee.
impl<T: ReflectValue> ReflectValue for Arc<T> {
    fn variant_ops() -> &'static VariantOps {
        static CELL: GenericOpsCell = GenericOpsCell::new();
        CELL.get_or_insert::<Self>(|| VariantOpsBuilder::<Self>::new().leak())
    }
}

// -----------------------------------------------------------------------------
// Wrapper unwrapping

/// Installs the `Box<T>` → `T` unwrap conversion into `registry`.
///
/// Unwrapping clones the pointee, so a converted variant owns its value
/// independently of the source.
///
/// # Examples
///
/// ```
/// use rfx_reflect::{Registry, Variant, ident_of};
/// use rfx_reflect::impls::register_box_unwrap;
///
/// let mut registry = Registry::new();
/// register_box_unwrap::<i32>(&mut registry);
///
/// let mut v = Variant::new(Box::new(5i32));
/// assert!(v.type_desc().unwrap().is_wrapper());
/// assert!(v.convert_in(ident_of::<i32>(), &registry));
/// assert_eq!(v.get::<i32>(), Some(&5));
/// ```
pub fn register_box_unwrap<T: ReflectValue + Clone>(registry: &mut Registry) {
    registry.register_converter::<Box<T>, T, _>(|boxed| Some((**boxed).clone()));
}

/// Installs the `Arc<T>` → `T` unwrap conversion into `registry`.
///
/// See [`register_box_unwrap`]; the pointee is cloned out of the shared
/// handle.
pub fn register_arc_unwrap<T: ReflectValue + Clone>(registry: &mut Registry) {
    registry.register_converter::<Arc<T>, T, _>(|shared| Some((**shared).clone()));
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::sync::Arc;

    use super::{register_arc_unwrap, register_box_unwrap};
    use crate::ident::{desc_of, ident_of};
    use crate::{Registry, Variant};

    #[test]
    fn wrapper_descriptors_link_the_pointee() {
        let desc = desc_of::<Box<u32>>();
        assert!(desc.is_wrapper());
        assert_eq!(desc.wrapped(), Some(ident_of::<u32>()));
        assert_eq!(desc.name(), "Box<u32>");

        let desc = desc_of::<Arc<u32>>();
        assert!(desc.is_wrapper());
        assert_eq!(desc.wrapped(), Some(ident_of::<u32>()));
    }

    #[test]
    fn arc_unwrap_clones_the_pointee() {
        let mut registry = Registry::new();
        register_arc_unwrap::<u32>(&mut registry);

        let mut v = Variant::new(Arc::new(11u32));
        assert!(v.convert_in(ident_of::<u32>(), &registry));
        assert_eq!(v.get::<u32>(), Some(&11));
    }

    #[test]
    fn unregistered_wrapper_does_not_unwrap() {
        let registry = Registry::new();
        let mut v = Variant::new(Box::new(11u32));
        assert!(!v.convert_in(ident_of::<u32>(), &registry));
        // Failed conversion leaves the payload untouched.
        assert_eq!(v.get::<Box<u32>>().map(|b| **b), Some(11));
    }

    #[test]
    fn reference_payloads_are_copied_handles() {
        static VALUE: u32 = 77;
        let v = Variant::new(&VALUE);
        let copy = v.clone();
        assert!(core::ptr::eq(*copy.get::<&'static u32>().unwrap(), &VALUE));
    }

    #[test]
    fn boxed_unwrap_registered_via_helper() {
        let mut registry = Registry::new();
        register_box_unwrap::<alloc::string::String>(&mut registry);

        let mut v = Variant::new(Box::new(alloc::string::String::from("inner")));
        assert!(v.convert_in(ident_of::<alloc::string::String>(), &registry));
        assert_eq!(
            v.get::<alloc::string::String>().map(|s| s.as_str()),
            Some("inner")
        );
    }
}
