#![expect(unsafe_code, reason = "Views call erased accessors on checked payloads.")]

use alloc::vec::Vec;

use rfx_ptr::Ptr;

use crate::ident::TypeDesc;
use crate::value::Variant;

// -----------------------------------------------------------------------------
// SequenceOps

/// Erased read operations of an array-like payload.
///
/// Built by the container implementations in
/// [`impls::containers`](crate::impls), attached to a type's
/// [`VariantOps`](super::VariantOps) table.
pub struct SequenceOps {
    pub(crate) len: unsafe fn(Ptr<'_>) -> usize,
    pub(crate) get: unsafe fn(Ptr<'_>, usize) -> Option<Variant>,
    pub(crate) element: fn() -> &'static TypeDesc,
}

// -----------------------------------------------------------------------------
// MappingOps

/// Erased read operations of an associative payload.
pub struct MappingOps {
    pub(crate) len: unsafe fn(Ptr<'_>) -> usize,
    pub(crate) get: unsafe fn(Ptr<'_>, &Variant) -> Option<Variant>,
    pub(crate) keys: unsafe fn(Ptr<'_>) -> Vec<Variant>,
    pub(crate) key: fn() -> &'static TypeDesc,
    pub(crate) value: fn() -> &'static TypeDesc,
}

// -----------------------------------------------------------------------------
// SequenceView

/// Read access to an array-like value held by a variant.
///
/// Elements are cloned out as fresh [`Variant`]s; the view never aliases
/// the container's payload mutably.
///
/// # Examples
///
/// ```
/// use rfx_reflect::Variant;
///
/// let v = Variant::new(vec![1i32, 2, 3]);
/// let seq = v.as_sequence().unwrap();
/// assert_eq!(seq.len(), 3);
/// assert_eq!(seq.get(1).unwrap().get::<i32>(), Some(&2));
/// assert!(seq.get(9).is_none());
/// ```
pub struct SequenceView<'a> {
    ptr: Ptr<'a>,
    ops: &'static SequenceOps,
}

impl<'a> SequenceView<'a> {
    #[inline]
    pub(crate) fn new(ptr: Ptr<'a>, ops: &'static SequenceOps) -> Self {
        Self { ptr, ops }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        // SAFETY: `ptr` addresses the payload the ops table was built for.
        unsafe { (self.ops.len)(self.ptr) }
    }

    /// Whether the sequence has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptor of the element type.
    #[inline]
    pub fn element_desc(&self) -> &'static TypeDesc {
        (self.ops.element)()
    }

    /// Clones the element at `index` into a variant.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Variant> {
        // SAFETY: `ptr` addresses the payload the ops table was built for.
        unsafe { (self.ops.get)(self.ptr, index) }
    }

    /// Iterates the elements as variants.
    pub fn iter(&self) -> impl Iterator<Item = Variant> + '_ {
        (0..self.len()).filter_map(|index| self.get(index))
    }
}

// -----------------------------------------------------------------------------
// MappingView

/// Read access to an associative value held by a variant.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use rfx_reflect::Variant;
///
/// let mut ages = BTreeMap::new();
/// ages.insert("ada".to_string(), 36i32);
///
/// let v = Variant::new(ages);
/// let map = v.as_mapping().unwrap();
/// assert_eq!(map.len(), 1);
/// let age = map.get(&Variant::new("ada".to_string())).unwrap();
/// assert_eq!(age.get::<i32>(), Some(&36));
/// ```
pub struct MappingView<'a> {
    ptr: Ptr<'a>,
    ops: &'static MappingOps,
}

impl<'a> MappingView<'a> {
    #[inline]
    pub(crate) fn new(ptr: Ptr<'a>, ops: &'static MappingOps) -> Self {
        Self { ptr, ops }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        // SAFETY: `ptr` addresses the payload the ops table was built for.
        unsafe { (self.ops.len)(self.ptr) }
    }

    /// Whether the mapping has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptor of the key type.
    #[inline]
    pub fn key_desc(&self) -> &'static TypeDesc {
        (self.ops.key)()
    }

    /// Descriptor of the value type.
    #[inline]
    pub fn value_desc(&self) -> &'static TypeDesc {
        (self.ops.value)()
    }

    /// Clones the value stored under `key` into a variant.
    ///
    /// The key variant must hold the mapping's key type; any other payload
    /// looks up nothing.
    #[inline]
    pub fn get(&self, key: &Variant) -> Option<Variant> {
        // SAFETY: `ptr` addresses the payload the ops table was built for.
        unsafe { (self.ops.get)(self.ptr, key) }
    }

    /// Clones all keys into variants.
    #[inline]
    pub fn keys(&self) -> Vec<Variant> {
        // SAFETY: `ptr` addresses the payload the ops table was built for.
        unsafe { (self.ops.keys)(self.ptr) }
    }
}
