#![expect(unsafe_code, reason = "View tables read erased container payloads.")]

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::any::TypeId;
use core::hash::Hash;
use std::collections::HashMap;

use crate::ident::{TypeDescBuilder, concat, intern_with};
use crate::value::{GenericOpsCell, MappingOps, SequenceOps, VariantOps, VariantOpsBuilder};
use crate::{Describe, ReflectValue, TypeDesc, TypeFlags, Variant};

// -----------------------------------------------------------------------------
// Vec<T>

impl<T: Describe> Describe for Vec<T> {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let element = T::type_desc();
            TypeDescBuilder::named(
                concat(&["alloc::vec::Vec<", element.path(), ">"]),
                concat(&["Vec<", element.name(), ">"]),
            )
            .flags(TypeFlags::GENERIC)
        })
    }
}

impl<T: ReflectValue + Clone> ReflectValue for Vec<T> {
    fn variant_ops() -> &'static VariantOps {
        static CELL: GenericOpsCell = GenericOpsCell::new();
        CELL.get_or_insert::<Self>(|| {
            let sequence: &'static SequenceOps = Box::leak(Box::new(SequenceOps {
                len: |ptr| unsafe { ptr.as_ref::<Vec<T>>() }.len(),
                get: |ptr, index| {
                    unsafe { ptr.as_ref::<Vec<T>>() }
                        .get(index)
                        .cloned()
                        .map(Variant::new)
                },
                element: T::type_desc,
            }));
            VariantOpsBuilder::<Self>::new().sequence(sequence).leak()
        })
    }
}

// -----------------------------------------------------------------------------
// [T; N]

impl<T: ReflectValue + Clone, const N: usize> ReflectValue for [T; N] {
    fn variant_ops() -> &'static VariantOps {
        static CELL: GenericOpsCell = GenericOpsCell::new();
        CELL.get_or_insert::<Self>(|| {
            let sequence: &'static SequenceOps = Box::leak(Box::new(SequenceOps {
                len: |_| N,
                get: |ptr, index| {
                    unsafe { ptr.as_ref::<[T; N]>() }
                        .get(index)
                        .cloned()
                        .map(Variant::new)
                },
                element: T::type_desc,
            }));
            VariantOpsBuilder::<Self>::new().sequence(sequence).leak()
        })
    }
}

// -----------------------------------------------------------------------------
// HashMap<K, V>

impl<K: Describe, V: Describe> Describe for HashMap<K, V> {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let key = K::type_desc();
            let value = V::type_desc();
            TypeDescBuilder::named(
                concat(&[
                    "std::collections::HashMap<",
                    key.path(),
                    ", ",
                    value.path(),
                    ">",
                ]),
                concat(&["HashMap<", key.name(), ", ", value.name(), ">"]),
            )
            .flags(TypeFlags::GENERIC)
        })
    }
}

impl<K, V> ReflectValue for HashMap<K, V>
where
    K: ReflectValue + Clone + Eq + Hash,
    V: ReflectValue + Clone,
{
    fn variant_ops() -> &'static VariantOps {
        static CELL: GenericOpsCell = GenericOpsCell::new();
        CELL.get_or_insert::<Self>(|| {
            let mapping: &'static MappingOps = Box::leak(Box::new(MappingOps {
                len: |ptr| unsafe { ptr.as_ref::<HashMap<K, V>>() }.len(),
                get: |ptr, key| {
                    let key = key.get::<K>()?;
                    unsafe { ptr.as_ref::<HashMap<K, V>>() }
                        .get(key)
                        .cloned()
                        .map(Variant::new)
                },
                keys: |ptr| {
                    unsafe { ptr.as_ref::<HashMap<K, V>>() }
                        .keys()
                        .cloned()
                        .map(Variant::new)
                        .collect()
                },
                key: K::type_desc,
                value: V::type_desc,
            }));
            VariantOpsBuilder::<Self>::new().mapping(mapping).leak()
        })
    }
}

// -----------------------------------------------------------------------------
// BTreeMap<K, V>

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn type_desc() -> &'static TypeDesc {
        intern_with(TypeId::of::<Self>(), || {
            let key = K::type_desc();
            let value = V::type_desc();
            TypeDescBuilder::named(
                concat(&[
                    "alloc::collections::BTreeMap<",
                    key.path(),
                    ", ",
                    value.path(),
                    ">",
                ]),
                concat(&["BTreeMap<", key.name(), ", ", value.name(), ">"]),
            )
            .flags(TypeFlags::GENERIC)
        })
    }
}

impl<K, V> ReflectValue for BTreeMap<K, V>
where
    K: ReflectValue + Clone + Ord,
    V: ReflectValue + Clone,
{
    fn variant_ops() -> &'static VariantOps {
        static CELL: GenericOpsCell = GenericOpsCell::new();
        CELL.get_or_insert::<Self>(|| {
            let mapping: &'static MappingOps = Box::leak(Box::new(MappingOps {
                len: |ptr| unsafe { ptr.as_ref::<BTreeMap<K, V>>() }.len(),
                get: |ptr, key| {
                    let key = key.get::<K>()?;
                    unsafe { ptr.as_ref::<BTreeMap<K, V>>() }
                        .get(key)
                        .cloned()
                        .map(Variant::new)
                },
                keys: |ptr| {
                    unsafe { ptr.as_ref::<BTreeMap<K, V>>() }
                        .keys()
                        .cloned()
                        .map(Variant::new)
                        .collect()
                },
                key: K::type_desc,
                value: V::type_desc,
            }));
            VariantOpsBuilder::<Self>::new().mapping(mapping).leak()
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use std::collections::HashMap;

    use crate::ident::desc_of;
    use crate::{Variant, ident_of};

    #[test]
    fn generic_descriptors_spell_their_arguments() {
        let desc = desc_of::<vec::Vec<i32>>();
        assert_eq!(desc.path(), "alloc::vec::Vec<i32>");
        assert_eq!(desc.name(), "Vec<i32>");
        assert!(desc.flags().contains(crate::TypeFlags::GENERIC));
        assert_ne!(ident_of::<vec::Vec<i32>>(), ident_of::<vec::Vec<i64>>());
    }

    #[test]
    fn vec_payload_exposes_a_sequence() {
        let v = Variant::new(vec![10i64, 20, 30]);
        let seq = v.as_sequence().unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.element_desc(), desc_of::<i64>());
        assert_eq!(seq.get(2).unwrap().get::<i64>(), Some(&30));
        assert!(seq.get(3).is_none());
        let collected: vec::Vec<i64> = seq.iter().filter_map(|v| v.take::<i64>().ok()).collect();
        assert_eq!(collected, [10, 20, 30]);
    }

    #[test]
    fn array_payload_exposes_a_sequence() {
        let v = Variant::new([1u8, 2, 3, 4]);
        let seq = v.as_sequence().unwrap();
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.get(0).unwrap().get::<u8>(), Some(&1));
    }

    #[test]
    fn map_payload_exposes_a_mapping() {
        let mut scores: HashMap<String, i32> = HashMap::new();
        scores.insert("ada".into(), 10);
        scores.insert("brian".into(), 7);

        let v = Variant::new(scores);
        let map = v.as_mapping().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.key_desc(), desc_of::<String>());
        let ada = map.get(&Variant::new(String::from("ada"))).unwrap();
        assert_eq!(ada.get::<i32>(), Some(&10));
        // A wrongly-typed key looks up nothing.
        assert!(map.get(&Variant::new(5u8)).is_none());
        assert_eq!(map.keys().len(), 2);
    }

    #[test]
    fn scalars_have_no_views() {
        let v = Variant::new(5i32);
        assert!(v.as_sequence().is_none());
        assert!(v.as_mapping().is_none());
    }
}
