// User-facing impl macros. Both expand the non-generic cell pattern;
// generic types implement the traits by hand against the generic cells.

/// Implements [`Describe`](crate::Describe) for a non-generic type.
///
/// The short name is derived from the last path segment; the optional
/// trailing word picks the classification: `class` (the default),
/// `enumeration`, `arithmetic` or `opaque`.
///
/// # Examples
///
/// ```
/// use rfx_reflect::{desc_of, impl_describe};
///
/// struct Circle { radius: f64 }
///
/// impl_describe!(Circle => "shapes::Circle", class);
///
/// let desc = desc_of::<Circle>();
/// assert_eq!(desc.name(), "Circle");
/// assert!(desc.is_class());
/// # let _ = Circle { radius: 1.0 }.radius;
/// ```
#[macro_export]
macro_rules! impl_describe {
    ($ty:ty => $path:literal) => {
        $crate::impl_describe!($ty => $path, class);
    };
    ($ty:ty => $path:literal, $kind:ident) => {
        impl $crate::Describe for $ty {
            fn type_desc() -> &'static $crate::TypeDesc {
                static CELL: $crate::ident::TypeDescCell = $crate::ident::TypeDescCell::new();
                CELL.get_or_init(|| {
                    $crate::ident::intern_with(::core::any::TypeId::of::<$ty>(), || {
                        $crate::ident::TypeDescBuilder::named(
                            $path,
                            $crate::ident::short_name($path),
                        )
                        .flags($crate::impl_describe!(@flags $kind))
                    })
                })
            }
        }
    };
    (@flags class) => {
        $crate::TypeFlags::CLASS
    };
    (@flags enumeration) => {
        $crate::TypeFlags::ENUM
    };
    (@flags arithmetic) => {
        $crate::TypeFlags::ARITHMETIC
    };
    (@flags opaque) => {
        $crate::TypeFlags::empty()
    };
}

/// Implements [`ReflectValue`](crate::ReflectValue) for a non-generic type,
/// listing the capabilities its ops table captures.
///
/// Capabilities are the methods of
/// [`VariantOpsBuilder`](crate::value::VariantOpsBuilder): `partial_eq`,
/// `partial_ord`, `hashable`, `debug`, `display`, `coercions`. An empty
/// list yields drop and clone only.
///
/// # Examples
///
/// ```
/// use rfx_reflect::{impl_describe, impl_reflect_value, Variant};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Color { rgb: u32 }
///
/// impl_describe!(Color => "shapes::Color", class);
/// impl_reflect_value!(Color => partial_eq, debug);
///
/// let v = Variant::new(Color { rgb: 0xff00ff });
/// assert_eq!(v, v.clone());
/// ```
#[macro_export]
macro_rules! impl_reflect_value {
    ($ty:ty => $($cap:ident),* $(,)?) => {
        impl $crate::ReflectValue for $ty {
            fn variant_ops() -> &'static $crate::value::VariantOps {
                static CELL: $crate::value::VariantOpsCell = $crate::value::VariantOpsCell::new();
                CELL.get_or_init(|| {
                    $crate::value::VariantOpsBuilder::<$ty>::new()
                        $(.$cap())*
                        .leak()
                })
            }
        }
    };
}
