#![expect(unsafe_code, reason = "The container pairs erased storage with checked ops tables.")]

use alloc::string::{String, ToString};
use core::any::TypeId;
use core::cmp::Ordering;
use core::fmt;

use rfx_ptr::Ptr;

use crate::ident::{TypeDesc, TypeIdent};
use crate::registry::{self, Registry};
use crate::value::storage::Storage;
use crate::value::views::{MappingView, SequenceView};
use crate::value::{ReflectValue, VariantOps};

// -----------------------------------------------------------------------------
// Variant

/// A type-erased container holding any [`ReflectValue`] with value
/// semantics.
///
/// # Storage
///
/// Payloads up to two machine words (with alignment at most eight bytes)
/// are stored inline; larger ones live on the heap. The discriminant is
/// explicit — nothing is inferred from the payload bytes.
///
/// # Value semantics
///
/// Cloning a variant deep-copies the payload through the clone operation
/// captured at construction; dropping a variant drops the payload exactly
/// once. Moving out at runtime goes through [`take_inner`], which leaves
/// the source empty.
///
/// # Typed access vs. conversion
///
/// [`get`]/[`take`] require the exact stored type — no implicit conversion.
/// [`convert`] explicitly re-types the payload through the conversion
/// registry, and the `to_*` coercions produce lossy primitive readings.
///
/// # Examples
///
/// ```
/// use rfx_reflect::Variant;
///
/// let mut v = Variant::new(17i32);
/// assert_eq!(v.get::<i32>(), Some(&17));
/// assert_eq!(v.get::<i64>(), None);
///
/// let moved = v.take_inner();
/// assert!(!v.is_valid());
/// assert_eq!(moved.take::<i32>().ok(), Some(17));
/// ```
///
/// [`get`]: Variant::get
/// [`take`]: Variant::take
/// [`take_inner`]: Variant::take_inner
/// [`convert`]: Variant::convert
pub struct Variant {
    slot: Option<Slot>,
}

struct Slot {
    ops: &'static VariantOps,
    storage: Storage,
}

impl Variant {
    /// The empty container. Compares equal only to other empty containers.
    #[inline]
    pub const fn empty() -> Self {
        Variant { slot: None }
    }

    /// Wraps a value, capturing its operation table.
    ///
    /// # Panics
    ///
    /// Panics if `T::variant_ops` returns a table built for a different
    /// type; such an implementation is broken and must not reach storage.
    pub fn new<T: ReflectValue>(value: T) -> Self {
        let ops = T::variant_ops();
        assert!(
            ops.type_id() == TypeId::of::<T>(),
            "`variant_ops` for `{}` returned a table built for `{}`",
            core::any::type_name::<T>(),
            ops.desc().path(),
        );
        let mut storage = Storage::alloc(ops.layout());
        // SAFETY: freshly allocated storage with `T`'s layout.
        unsafe { storage.payload_mut().write::<T>(value) };
        Variant {
            slot: Some(Slot { ops, storage }),
        }
    }

    /// Whether a payload is present.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.slot.is_some()
    }

    /// Descriptor of the stored payload, `None` when empty.
    #[inline]
    pub fn type_desc(&self) -> Option<&'static TypeDesc> {
        self.slot.as_ref().map(|slot| slot.ops.desc())
    }

    /// Identity of the stored payload, `None` when empty.
    #[inline]
    pub fn type_ident(&self) -> Option<TypeIdent> {
        self.type_desc().map(TypeDesc::ident)
    }

    /// Whether the payload is exactly of type `T`.
    #[inline]
    pub fn is<T: ReflectValue>(&self) -> bool {
        match &self.slot {
            Some(slot) => slot.ops.type_id() == TypeId::of::<T>(),
            None => false,
        }
    }

    /// Borrows the payload as `T`. Exact type match only.
    pub fn get<T: ReflectValue>(&self) -> Option<&T> {
        let slot = self.slot.as_ref()?;
        if slot.ops.type_id() != TypeId::of::<T>() {
            return None;
        }
        // SAFETY: type checked above; the payload is live.
        Some(unsafe { slot.storage.payload().as_ref::<T>() })
    }

    /// Mutably borrows the payload as `T`. Exact type match only.
    pub fn get_mut<T: ReflectValue>(&mut self) -> Option<&mut T> {
        let slot = self.slot.as_mut()?;
        if slot.ops.type_id() != TypeId::of::<T>() {
            return None;
        }
        // SAFETY: type checked above; the payload is live and exclusively
        // borrowed through `self`.
        Some(unsafe { slot.storage.payload_mut().as_mut::<T>() })
    }

    /// Moves the payload out as `T`, or hands the container back unchanged.
    pub fn take<T: ReflectValue>(mut self) -> Result<T, Variant> {
        match self.slot.take() {
            Some(slot) if slot.ops.type_id() == TypeId::of::<T>() => {
                // SAFETY: type checked; the bytes are moved out exactly once
                // and the storage is released without dropping them.
                let value = unsafe { slot.storage.payload().read::<T>() };
                unsafe { slot.storage.dealloc(slot.ops.layout()) };
                Ok(value)
            }
            slot => {
                self.slot = slot;
                Err(self)
            }
        }
    }

    /// Moves the payload into a fresh variant, leaving `self` empty.
    #[inline]
    pub fn take_inner(&mut self) -> Variant {
        core::mem::take(self)
    }

    /// Drops the payload, leaving the container empty.
    #[inline]
    pub fn clear(&mut self) {
        *self = Variant::empty();
    }

    // -------------------------------------------------------------------------
    // Conversion

    /// Re-types the payload in place through `registry`'s conversion table.
    ///
    /// On success the container holds the converted value and `true` is
    /// returned; on failure the container is left untouched and `false` is
    /// returned. Converting an empty container fails; converting to the
    /// stored type succeeds without work.
    pub fn convert_in(&mut self, target: TypeIdent, registry: &Registry) -> bool {
        let Some(current) = self.type_ident() else {
            return false;
        };
        if current == target {
            return true;
        }
        match registry.convert_value(self, target) {
            Some(converted) => {
                *self = converted;
                true
            }
            None => false,
        }
    }

    /// [`convert_in`](Variant::convert_in) against the process-wide
    /// registry.
    pub fn convert(&mut self, target: TypeIdent) -> bool {
        let global = registry::global().read();
        self.convert_in(target, &global)
    }

    // -------------------------------------------------------------------------
    // Lossy coercions

    /// Best-effort boolean reading of the payload.
    pub fn to_bool(&self) -> Option<bool> {
        let slot = self.slot.as_ref()?;
        let read = slot.ops.as_bool?;
        // SAFETY: the payload matches the ops table by construction.
        unsafe { read(slot.storage.payload()) }
    }

    /// Best-effort signed integer reading of the payload.
    pub fn to_i64(&self) -> Option<i64> {
        let slot = self.slot.as_ref()?;
        let read = slot.ops.as_i64?;
        // SAFETY: the payload matches the ops table by construction.
        unsafe { read(slot.storage.payload()) }
    }

    /// Best-effort unsigned integer reading of the payload.
    pub fn to_u64(&self) -> Option<u64> {
        let slot = self.slot.as_ref()?;
        let read = slot.ops.as_u64?;
        // SAFETY: the payload matches the ops table by construction.
        unsafe { read(slot.storage.payload()) }
    }

    /// Best-effort floating-point reading of the payload.
    pub fn to_f64(&self) -> Option<f64> {
        let slot = self.slot.as_ref()?;
        let read = slot.ops.as_f64?;
        // SAFETY: the payload matches the ops table by construction.
        unsafe { read(slot.storage.payload()) }
    }

    /// Renders the payload through its captured [`Display`](fmt::Display).
    pub fn to_string_lossy(&self) -> Option<String> {
        let slot = self.slot.as_ref()?;
        let display = slot.ops.display?;
        struct Adapter<'a> {
            ptr: Ptr<'a>,
            display: unsafe fn(Ptr<'_>, &mut fmt::Formatter<'_>) -> fmt::Result,
        }
        impl fmt::Display for Adapter<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // SAFETY: the payload matches the ops table by construction.
                unsafe { (self.display)(self.ptr, f) }
            }
        }
        Some(
            Adapter {
                ptr: slot.storage.payload(),
                display,
            }
            .to_string(),
        )
    }

    /// Hash of the payload through its captured [`Hash`](core::hash::Hash).
    pub fn value_hash(&self) -> Option<u64> {
        let slot = self.slot.as_ref()?;
        let hash = slot.ops.hash?;
        // SAFETY: the payload matches the ops table by construction.
        Some(unsafe { hash(slot.storage.payload()) })
    }

    // -------------------------------------------------------------------------
    // Views

    /// Sequence view of an array-like payload.
    pub fn as_sequence(&self) -> Option<SequenceView<'_>> {
        let slot = self.slot.as_ref()?;
        let ops = slot.ops.sequence?;
        Some(SequenceView::new(slot.storage.payload(), ops))
    }

    /// Mapping view of an associative payload.
    pub fn as_mapping(&self) -> Option<MappingView<'_>> {
        let slot = self.slot.as_ref()?;
        let ops = slot.ops.mapping?;
        Some(MappingView::new(slot.storage.payload(), ops))
    }

    // -------------------------------------------------------------------------
    // Comparison

    /// Equality against `registry`'s conversion table.
    ///
    /// Same-type payloads compare through the captured equality operation;
    /// differently-typed payloads are compared after converting one side to
    /// the other's type (either direction). Unrelated or unconvertible
    /// payloads are unequal. Empty containers equal only each other.
    pub fn eq_in(&self, other: &Variant, registry: &Registry) -> bool {
        match (&self.slot, &other.slot) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                if a.ops.type_id() == b.ops.type_id() {
                    return Self::slot_eq(a, b);
                }
                if let Some(converted) = registry.convert_value(other, a.ops.desc().ident()) {
                    if let Some(cb) = converted.slot.as_ref() {
                        return Self::slot_eq(a, cb);
                    }
                }
                if let Some(converted) = registry.convert_value(self, b.ops.desc().ident()) {
                    if let Some(ca) = converted.slot.as_ref() {
                        return Self::slot_eq(ca, b);
                    }
                }
                false
            }
            _ => false,
        }
    }

    /// Ordering against `registry`'s conversion table.
    ///
    /// Follows the same conversion rules as [`eq_in`](Variant::eq_in);
    /// payloads without a captured ordering, and unrelated payloads, are
    /// unordered.
    pub fn cmp_in(&self, other: &Variant, registry: &Registry) -> Option<Ordering> {
        let (a, b) = (self.slot.as_ref()?, other.slot.as_ref()?);
        if a.ops.type_id() == b.ops.type_id() {
            return Self::slot_cmp(a, b);
        }
        if let Some(converted) = registry.convert_value(other, a.ops.desc().ident()) {
            if let Some(cb) = converted.slot.as_ref() {
                return Self::slot_cmp(a, cb);
            }
        }
        if let Some(converted) = registry.convert_value(self, b.ops.desc().ident()) {
            if let Some(ca) = converted.slot.as_ref() {
                return Self::slot_cmp(ca, b);
            }
        }
        None
    }

    // Both slots must hold the same type.
    fn slot_eq(a: &Slot, b: &Slot) -> bool {
        match a.ops.partial_eq {
            // SAFETY: both payloads match the shared ops table.
            Some(eq) => unsafe { eq(a.storage.payload(), b.storage.payload()) },
            None => false,
        }
    }

    // Both slots must hold the same type.
    fn slot_cmp(a: &Slot, b: &Slot) -> Option<Ordering> {
        let cmp = a.ops.partial_cmp?;
        // SAFETY: both payloads match the shared ops table.
        unsafe { cmp(a.storage.payload(), b.storage.payload()) }
    }
}

impl Default for Variant {
    #[inline]
    fn default() -> Self {
        Variant::empty()
    }
}

impl Drop for Variant {
    fn drop(&mut self) {
        if let Some(mut slot) = self.slot.take() {
            // SAFETY: the payload is live and matches the ops table; it is
            // dropped exactly once, then the storage is released.
            unsafe {
                (slot.ops.drop_in_place)(slot.storage.payload_mut());
                slot.storage.dealloc(slot.ops.layout());
            }
        }
    }
}

impl Clone for Variant {
    fn clone(&self) -> Self {
        match &self.slot {
            None => Variant::empty(),
            Some(slot) => {
                let mut storage = Storage::alloc(slot.ops.layout());
                // SAFETY: source payload is live; destination is fresh
                // storage with the same layout.
                unsafe { (slot.ops.clone_into)(slot.storage.payload(), storage.payload_mut()) };
                Variant {
                    slot: Some(Slot {
                        ops: slot.ops,
                        storage,
                    }),
                }
            }
        }
    }
}

impl PartialEq for Variant {
    /// Equality against the process-wide registry; see
    /// [`eq_in`](Variant::eq_in).
    fn eq(&self, other: &Self) -> bool {
        // Same-type comparisons skip the registry lock.
        if let (Some(a), Some(b)) = (&self.slot, &other.slot) {
            if a.ops.type_id() == b.ops.type_id() {
                return Self::slot_eq(a, b);
            }
        }
        if self.slot.is_none() || other.slot.is_none() {
            return self.slot.is_none() && other.slot.is_none();
        }
        let global = registry::global().read();
        self.eq_in(other, &global)
    }
}

impl PartialOrd for Variant {
    /// Ordering against the process-wide registry; see
    /// [`cmp_in`](Variant::cmp_in).
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (&self.slot, &other.slot) {
            if a.ops.type_id() == b.ops.type_id() {
                return Self::slot_cmp(a, b);
            }
        }
        if self.slot.is_none() || other.slot.is_none() {
            return None;
        }
        let global = registry::global().read();
        self.cmp_in(other, &global)
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            None => f.pad("Variant(empty)"),
            Some(slot) => match slot.ops.debug {
                // SAFETY: the payload matches the ops table by construction.
                Some(debug) => unsafe { debug(slot.storage.payload(), f) },
                None => write!(f, "Variant({})", slot.ops.desc().path()),
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::Variant;
    use crate::ident::ident_of;

    #[test]
    fn inline_roundtrip() {
        let v = Variant::new(5u8);
        assert!(v.is_valid());
        assert_eq!(v.get::<u8>(), Some(&5));
        assert_eq!(v.get::<u16>(), None);
        assert_eq!(v.take::<u8>().ok(), Some(5));
    }

    #[test]
    fn heap_roundtrip() {
        let big = [1u64, 2, 3, 4];
        let v = Variant::new(big);
        assert_eq!(v.get::<[u64; 4]>(), Some(&big));
        assert_eq!(v.take::<[u64; 4]>().ok(), Some(big));
    }

    #[test]
    fn string_payload_drops_cleanly() {
        let v = Variant::new(String::from("reflected"));
        assert_eq!(v.get::<String>().map(String::as_str), Some("reflected"));
        drop(v);
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let original = Variant::new(alloc::vec![1i32, 2, 3]);
        let mut copy = original.clone();
        copy.get_mut::<Vec<i32>>().unwrap().push(4);
        assert_eq!(original.get::<Vec<i32>>().unwrap().len(), 3);
        assert_eq!(copy.get::<Vec<i32>>().unwrap().len(), 4);
    }

    #[test]
    fn take_inner_leaves_source_empty() {
        let mut a = Variant::new(9i32);
        let b = a.take_inner();
        assert!(!a.is_valid());
        assert_eq!(b.get::<i32>(), Some(&9));
        assert_ne!(a, b);
    }

    #[test]
    fn mismatched_take_returns_container() {
        let v = Variant::new(1i8);
        let v = v.take::<i16>().unwrap_err();
        assert_eq!(v.get::<i8>(), Some(&1));
    }

    #[test]
    fn empty_compares_equal_to_empty_only() {
        assert_eq!(Variant::empty(), Variant::empty());
        assert_ne!(Variant::empty(), Variant::new(0i32));
    }

    #[test]
    fn same_type_equality_and_ordering() {
        assert_eq!(Variant::new(3i32), Variant::new(3i32));
        assert_ne!(Variant::new(3i32), Variant::new(4i32));
        assert!(Variant::new(3i32) < Variant::new(4i32));
    }

    #[test]
    fn type_ident_matches_stored_type() {
        let v = Variant::new(2.5f64);
        assert_eq!(v.type_ident(), Some(ident_of::<f64>()));
        assert_eq!(Variant::empty().type_ident(), None);
    }

    #[test]
    fn coercions_read_primitives() {
        assert_eq!(Variant::new(0u32).to_bool(), Some(false));
        assert_eq!(Variant::new(7u32).to_bool(), Some(true));
        assert_eq!(Variant::new(7i16).to_i64(), Some(7));
        assert_eq!(Variant::new(7u16).to_u64(), Some(7));
        assert_eq!(Variant::new(2.5f32).to_f64(), Some(2.5));
        assert_eq!(Variant::new(true).to_i64(), Some(1));
        // A negative signed value has no unsigned reading.
        assert_eq!(Variant::new(-1i32).to_u64(), None);
        // Strings spell booleans.
        assert_eq!(Variant::new(String::from("true")).to_bool(), Some(true));
        assert_eq!(Variant::new(String::from("maybe")).to_bool(), None);
    }

    #[test]
    fn value_hash_follows_the_captured_hasher() {
        assert_eq!(
            Variant::new(31u64).value_hash(),
            Variant::new(31u64).value_hash()
        );
        assert!(Variant::new(31u64).value_hash().is_some());
        // Floats capture no hash operation.
        assert_eq!(Variant::new(1.5f64).value_hash(), None);
        assert_eq!(Variant::empty().value_hash(), None);
    }

    #[test]
    fn to_string_lossy_uses_display() {
        assert_eq!(
            Variant::new(42i32).to_string_lossy().as_deref(),
            Some("42")
        );
        assert_eq!(Variant::empty().to_string_lossy(), None);
    }
}
