use alloc::string::String;
use core::any::TypeId;

use crate::ident::{TypeDescBuilder, TypeDescCell, intern_with};
use crate::value::LossyCoerce;
use crate::{Describe, TypeDesc, TypeFlags, impl_reflect_value};

// -----------------------------------------------------------------------------
// Describe

macro_rules! impl_describe_primitive {
    ($ty:ty, $path:literal, $flags:expr) => {
        impl Describe for $ty {
            fn type_desc() -> &'static TypeDesc {
                static CELL: TypeDescCell = TypeDescCell::new();
                CELL.get_or_init(|| {
                    intern_with(TypeId::of::<$ty>(), || {
                        TypeDescBuilder::named($path, $crate::ident::short_name($path))
                            .flags($flags)
                    })
                })
            }
        }
    };
}

impl_describe_primitive!((), "()", TypeFlags::empty());
impl_describe_primitive!(bool, "bool", TypeFlags::ARITHMETIC);
impl_describe_primitive!(char, "char", TypeFlags::empty());
impl_describe_primitive!(u8, "u8", TypeFlags::ARITHMETIC);
impl_describe_primitive!(u16, "u16", TypeFlags::ARITHMETIC);
impl_describe_primitive!(u32, "u32", TypeFlags::ARITHMETIC);
impl_describe_primitive!(u64, "u64", TypeFlags::ARITHMETIC);
impl_describe_primitive!(u128, "u128", TypeFlags::ARITHMETIC);
impl_describe_primitive!(usize, "usize", TypeFlags::ARITHMETIC);
impl_describe_primitive!(i8, "i8", TypeFlags::ARITHMETIC);
impl_describe_primitive!(i16, "i16", TypeFlags::ARITHMETIC);
impl_describe_primitive!(i32, "i32", TypeFlags::ARITHMETIC);
impl_describe_primitive!(i64, "i64", TypeFlags::ARITHMETIC);
impl_describe_primitive!(i128, "i128", TypeFlags::ARITHMETIC);
impl_describe_primitive!(isize, "isize", TypeFlags::ARITHMETIC);
impl_describe_primitive!(f32, "f32", TypeFlags::ARITHMETIC);
impl_describe_primitive!(f64, "f64", TypeFlags::ARITHMETIC);
impl_describe_primitive!(String, "alloc::string::String", TypeFlags::empty());

// -----------------------------------------------------------------------------
// LossyCoerce

macro_rules! impl_coerce_int {
    ($($ty:ty),+) => {
        $(
            impl LossyCoerce for $ty {
                #[inline]
                fn lossy_bool(&self) -> Option<bool> {
                    Some(*self != 0)
                }

                #[inline]
                fn lossy_i64(&self) -> Option<i64> {
                    i64::try_from(*self).ok()
                }

                #[inline]
                fn lossy_u64(&self) -> Option<u64> {
                    u64::try_from(*self).ok()
                }

                #[inline]
                fn lossy_f64(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )+
    };
}

impl_coerce_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

macro_rules! impl_coerce_float {
    ($($ty:ty),+) => {
        $(
            impl LossyCoerce for $ty {
                #[inline]
                fn lossy_bool(&self) -> Option<bool> {
                    Some(*self != 0.0)
                }

                #[inline]
                fn lossy_f64(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )+
    };
}

impl_coerce_float!(f32, f64);

impl LossyCoerce for bool {
    #[inline]
    fn lossy_bool(&self) -> Option<bool> {
        Some(*self)
    }

    #[inline]
    fn lossy_i64(&self) -> Option<i64> {
        Some(*self as i64)
    }

    #[inline]
    fn lossy_u64(&self) -> Option<u64> {
        Some(*self as u64)
    }
}

// Strings read as whatever they spell.
macro_rules! impl_coerce_str {
    ($ty:ty) => {
        impl LossyCoerce for $ty {
            fn lossy_bool(&self) -> Option<bool> {
                match &self[..] {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                }
            }

            fn lossy_i64(&self) -> Option<i64> {
                self.parse().ok()
            }

            fn lossy_u64(&self) -> Option<u64> {
                self.parse().ok()
            }

            fn lossy_f64(&self) -> Option<f64> {
                self.parse().ok()
            }
        }
    };
}

impl_coerce_str!(String);

// -----------------------------------------------------------------------------
// ReflectValue

impl_reflect_value!(() => partial_eq, partial_ord, hashable, debug);
impl_reflect_value!(bool => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(char => partial_eq, partial_ord, hashable, debug, display);
impl_reflect_value!(u8 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(u16 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(u32 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(u64 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(u128 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(usize => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(i8 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(i16 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(i32 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(i64 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(i128 => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(isize => partial_eq, partial_ord, hashable, debug, display, coercions);
impl_reflect_value!(f32 => partial_eq, partial_ord, debug, display, coercions);
impl_reflect_value!(f64 => partial_eq, partial_ord, debug, display, coercions);
impl_reflect_value!(String => partial_eq, partial_ord, hashable, debug, display, coercions);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::ident::{desc_by_name, desc_of};
    use crate::value::ReflectValue;

    #[test]
    fn primitive_descriptors_are_named() {
        assert_eq!(desc_of::<bool>().path(), "bool");
        assert!(desc_of::<bool>().is_arithmetic());
        assert_eq!(desc_of::<String>().name(), "String");
        assert_eq!(desc_by_name("f64"), Some(desc_of::<f64>()));
    }

    #[test]
    fn ops_tables_are_cached() {
        let a = <i32 as ReflectValue>::variant_ops();
        let b = <i32 as ReflectValue>::variant_ops();
        assert!(core::ptr::eq(a, b));
        assert_eq!(a.desc().path(), "i32");
    }
}
