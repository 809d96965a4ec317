use alloc::string::{String, ToString};

use crate::convert::ConversionTable;

// Widening never fails; narrowing succeeds exactly when the value fits.
macro_rules! register_widening {
    ($table:expr, $from:ty => $($to:ty),+) => {
        $(
            $table.register_typed::<$from, $to, _>(|value| Some(<$to>::from(*value)));
        )+
    };
}

macro_rules! register_narrowing {
    ($table:expr, $from:ty => $($to:ty),+) => {
        $(
            $table.register_typed::<$from, $to, _>(|value| <$to>::try_from(*value).ok());
        )+
    };
}

macro_rules! register_to_float {
    ($table:expr, $from:ty => $($to:ty),+) => {
        $(
            $table.register_typed::<$from, $to, _>(|value| Some(*value as $to));
        )+
    };
}

/// The conversions every fresh [`Registry::new`](crate::Registry::new)
/// starts with: lossless integer widenings, checked narrowings between the
/// common word sizes, integer-to-float, `f32 -> f64`, and display-based
/// string renderings of the numeric types.
pub(crate) fn install_default_conversions(table: &mut ConversionTable) {
    register_widening!(table, u8 => u16, u32, u64, u128, i16, i32, i64);
    register_widening!(table, u16 => u32, u64, u128, i32, i64);
    register_widening!(table, u32 => u64, u128, i64);
    register_widening!(table, u64 => u128);
    register_widening!(table, i8 => i16, i32, i64, i128);
    register_widening!(table, i16 => i32, i64, i128);
    register_widening!(table, i32 => i64, i128);
    register_widening!(table, i64 => i128);
    register_widening!(table, f32 => f64);

    register_narrowing!(table, i64 => i32, u64, usize);
    register_narrowing!(table, u64 => u32, i64, usize);
    register_narrowing!(table, usize => u64, i64, u32);
    register_narrowing!(table, isize => i64, i32);
    register_narrowing!(table, i32 => u32, usize);
    register_narrowing!(table, u32 => i32, usize);

    register_to_float!(table, u8 => f32, f64);
    register_to_float!(table, u16 => f32, f64);
    register_to_float!(table, u32 => f64);
    register_to_float!(table, i8 => f32, f64);
    register_to_float!(table, i16 => f32, f64);
    register_to_float!(table, i32 => f64);

    table.register_typed::<bool, String, _>(|value| Some(value.to_string()));
    table.register_typed::<i64, String, _>(|value| Some(value.to_string()));
    table.register_typed::<u64, String, _>(|value| Some(value.to_string()));
    table.register_typed::<f64, String, _>(|value| Some(value.to_string()));
    table.register_typed::<char, String, _>(|value| Some(value.to_string()));
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::install_default_conversions;
    use crate::convert::ConversionTable;
    use crate::ident::ident_of;
    use crate::Variant;

    fn table() -> ConversionTable {
        let mut table = ConversionTable::new();
        install_default_conversions(&mut table);
        table
    }

    #[test]
    fn widenings_always_succeed() {
        let table = table();
        let wide = table.apply(&Variant::new(200u8), ident_of::<i64>()).unwrap();
        assert_eq!(wide.get::<i64>(), Some(&200));
    }

    #[test]
    fn narrowings_are_checked() {
        let table = table();
        let fits = table.apply(&Variant::new(7i64), ident_of::<i32>()).unwrap();
        assert_eq!(fits.get::<i32>(), Some(&7));
        assert!(
            table
                .apply(&Variant::new(i64::MAX), ident_of::<i32>())
                .is_none()
        );
        assert!(table.apply(&Variant::new(-1i64), ident_of::<u64>()).is_none());
    }

    #[test]
    fn numbers_render_to_strings() {
        let table = table();
        let s = table
            .apply(&Variant::new(31i64), ident_of::<String>())
            .unwrap();
        assert_eq!(s.get::<String>().map(String::as_str), Some("31"));
    }
}
