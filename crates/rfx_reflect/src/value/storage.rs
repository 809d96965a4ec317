#![expect(unsafe_code, reason = "Erased storage owns raw, manually managed memory.")]

use core::alloc::Layout;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use rfx_ptr::{Ptr, PtrMut};

// -----------------------------------------------------------------------------
// Inline buffer

/// Payloads up to two machine words stay inline.
pub(crate) const INLINE_SIZE: usize = 2 * size_of::<usize>();

#[repr(align(8))]
pub(crate) struct InlineBuf([MaybeUninit<u8>; INLINE_SIZE]);

// -----------------------------------------------------------------------------
// Storage

/// Raw payload storage of a variant: inline bytes or a heap allocation.
///
/// The discriminant is explicit, never inferred from the payload. `Storage`
/// knows nothing about the stored type; the surrounding slot pairs it with
/// the [`VariantOps`](super::VariantOps) table that does, and is
/// responsible for dropping the payload before releasing the storage.
pub(crate) enum Storage {
    Inline(InlineBuf),
    Boxed(NonNull<u8>),
}

// SAFETY: `Storage` is plain memory; the slot only stores payloads whose
// types are `Send + Sync` (enforced by `ReflectValue`).
unsafe impl Send for Storage {}
// SAFETY: same as above.
unsafe impl Sync for Storage {}

impl Storage {
    /// Whether a payload with this layout is stored inline.
    #[inline]
    pub(crate) const fn fits_inline(layout: Layout) -> bool {
        layout.size() <= INLINE_SIZE && layout.align() <= align_of::<InlineBuf>()
    }

    /// Allocates uninitialized storage for a payload with this layout.
    ///
    /// The payload must be written through
    /// [`payload_mut`](Storage::payload_mut) before anything reads it.
    pub(crate) fn alloc(layout: Layout) -> Storage {
        if Self::fits_inline(layout) {
            Storage::Inline(InlineBuf([MaybeUninit::uninit(); INLINE_SIZE]))
        } else if layout.size() == 0 {
            // Over-aligned zero-sized payloads: no allocation, an aligned
            // dangling address is enough.
            let addr = core::ptr::without_provenance_mut::<u8>(layout.align());
            // SAFETY: alignments are non-zero.
            Storage::Boxed(unsafe { NonNull::new_unchecked(addr) })
        } else {
            // SAFETY: `layout.size() != 0` was checked above.
            let raw = unsafe { alloc::alloc::alloc(layout) };
            match NonNull::new(raw) {
                Some(ptr) => Storage::Boxed(ptr),
                None => alloc::alloc::handle_alloc_error(layout),
            }
        }
    }

    /// Read access to the payload bytes.
    #[inline]
    pub(crate) fn payload(&self) -> Ptr<'_> {
        let ptr = match self {
            Storage::Inline(buf) => NonNull::from(&buf.0).cast::<u8>(),
            Storage::Boxed(ptr) => *ptr,
        };
        // SAFETY: the storage owns these bytes for `'_`.
        unsafe { Ptr::new(ptr) }
    }

    /// Write access to the payload bytes.
    #[inline]
    pub(crate) fn payload_mut(&mut self) -> PtrMut<'_> {
        let ptr = match self {
            Storage::Inline(buf) => NonNull::from(&mut buf.0).cast::<u8>(),
            Storage::Boxed(ptr) => *ptr,
        };
        // SAFETY: the storage owns these bytes exclusively for `'_`.
        unsafe { PtrMut::new(ptr) }
    }

    /// Releases the storage without touching the payload.
    ///
    /// # Safety
    ///
    /// - `layout` must be the layout the storage was allocated with.
    /// - The payload must already have been dropped or moved out.
    pub(crate) unsafe fn dealloc(self, layout: Layout) {
        if let Storage::Boxed(ptr) = self {
            if layout.size() != 0 {
                // SAFETY: allocated in `alloc` with the same layout.
                unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) };
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_layouts_stay_inline() {
        assert!(Storage::fits_inline(Layout::new::<u8>()));
        assert!(Storage::fits_inline(Layout::new::<[usize; 2]>()));
        assert!(!Storage::fits_inline(Layout::new::<[usize; 3]>()));
        assert!(!Storage::fits_inline(Layout::new::<[u8; 17]>()));
    }

    #[test]
    fn boxed_roundtrip() {
        let layout = Layout::new::<[u64; 4]>();
        let mut storage = Storage::alloc(layout);
        assert!(matches!(storage, Storage::Boxed(_)));
        unsafe {
            storage.payload_mut().write([1u64, 2, 3, 4]);
            let value: [u64; 4] = storage.payload().read();
            assert_eq!(value, [1, 2, 3, 4]);
            storage.dealloc(layout);
        }
    }

    #[test]
    fn inline_roundtrip() {
        let layout = Layout::new::<[u32; 4]>();
        let mut storage = Storage::alloc(layout);
        assert!(matches!(storage, Storage::Inline(_)));
        unsafe {
            storage.payload_mut().write([7u32, 8, 9, 10]);
            assert_eq!(storage.payload().read::<[u32; 4]>(), [7, 8, 9, 10]);
            storage.dealloc(layout);
        }
    }
}
