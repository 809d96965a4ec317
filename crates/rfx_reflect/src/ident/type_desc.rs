use core::any::TypeId;
use core::fmt;
use core::num::NonZeroU32;

use bitflags::bitflags;

// -----------------------------------------------------------------------------
// TypeIdent

/// A process-unique ordinal identifying one observed type signature.
///
/// Ordinals are assigned densely, starting at 1, the first time a type is
/// observed through [`Describe::type_desc`]. They are stable for the
/// lifetime of the process but **not** across processes or builds; anything
/// that must survive a process boundary should use
/// [`TypeDesc::path`](super::TypeDesc::path) instead.
///
/// Equality, ordering and hashing are defined over the ordinal value only,
/// which makes `TypeIdent` a cheap map key.
///
/// # Examples
///
/// ```
/// use rfx_reflect::ident_of;
///
/// assert_eq!(ident_of::<i32>(), ident_of::<i32>());
/// assert_ne!(ident_of::<i32>(), ident_of::<i64>());
/// ```
///
/// [`Describe::type_desc`]: super::Describe::type_desc
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TypeIdent(NonZeroU32);

impl TypeIdent {
    /// Returns the raw ordinal value.
    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    // Ordinals are handed out by the interning registry only.
    #[inline]
    pub(crate) const fn from_index(index: usize) -> TypeIdent {
        match NonZeroU32::new(index as u32 + 1) {
            Some(n) => TypeIdent(n),
            None => panic!("type ordinal overflow"),
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl fmt::Debug for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdent({})", self.0.get())
    }
}

// -----------------------------------------------------------------------------
// TypeFlags

bitflags! {
    /// Classification bits of a [`TypeDesc`].
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct TypeFlags: u16 {
        /// A user-defined aggregate that can carry members and bases.
        const CLASS      = 1 << 0;
        /// A registered enumeration.
        const ENUM       = 1 << 1;
        /// A raw pointer decoration (`*const T` / `*mut T`).
        const POINTER    = 1 << 2;
        /// A reference decoration (`&'static T` / `&'static mut T`).
        const REFERENCE  = 1 << 3;
        /// A fixed-extent array (`[T; N]`).
        const ARRAY      = 1 << 4;
        /// A built-in numeric or boolean type.
        const ARITHMETIC = 1 << 5;
        /// A wrapper transparently holding another reflected type
        /// (`Box<T>`, `Arc<T>`).
        const WRAPPER    = 1 << 6;
        /// An instantiation of a generic type.
        const GENERIC    = 1 << 7;
        /// A read-only decoration (`&'static T`, `*const T`).
        const CONST      = 1 << 8;
    }
}

// -----------------------------------------------------------------------------
// ArrayDesc

/// Array metadata of an `[T; N]` descriptor.
#[derive(Clone, Copy, Debug)]
pub struct ArrayDesc {
    extent: usize,
    element: TypeIdent,
}

impl ArrayDesc {
    /// Number of elements in the array type.
    #[inline(always)]
    pub const fn extent(&self) -> usize {
        self.extent
    }

    /// Identity of the element type.
    #[inline(always)]
    pub const fn element(&self) -> TypeIdent {
        self.element
    }
}

// -----------------------------------------------------------------------------
// TypeDesc

/// The interned descriptor of one type signature.
///
/// A `TypeDesc` is created the first time its type is observed, lives for
/// the rest of the process, and is never mutated. Two descriptors are equal
/// iff their [`ident`](TypeDesc::ident)s are equal.
///
/// Decorated signatures (`&'static T`, `*const T`, `[T; N]`) get their own
/// descriptor, distinct from `T`'s, but share a *raw* identity with it:
/// [`raw`](TypeDesc::raw) strips every reference/pointer/const decoration,
/// so member lookup can unify `T`, `&'static T` and `*const T`. Arrays are
/// not decorations — `[T; 5]` and `[T; 6]` are distinct raw types.
///
/// # Examples
///
/// ```
/// use rfx_reflect::desc_of;
///
/// let d = desc_of::<*const u8>();
/// assert!(d.is_pointer());
/// assert_eq!(d.raw(), desc_of::<u8>().ident());
/// assert_eq!(d.extent(), 0);
/// ```
pub struct TypeDesc {
    ident: TypeIdent,
    type_id: TypeId,
    path: &'static str,
    name: &'static str,
    flags: TypeFlags,
    raw: TypeIdent,
    pointee: Option<TypeIdent>,
    array: Option<ArrayDesc>,
    wrapped: Option<TypeIdent>,
}

impl TypeDesc {
    /// The process-unique ordinal of this signature.
    #[inline(always)]
    pub const fn ident(&self) -> TypeIdent {
        self.ident
    }

    /// The host [`TypeId`] this descriptor was interned for.
    #[inline(always)]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The canonical full path, e.g. `"alloc::string::String"`.
    ///
    /// Stable within one build; used as the primary lookup key.
    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// The short display name, e.g. `"String"`. May be ambiguous.
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The classification bits.
    #[inline(always)]
    pub const fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// Identity with every reference/pointer/const decoration stripped.
    ///
    /// For an undecorated type this is its own identity.
    #[inline(always)]
    pub const fn raw(&self) -> TypeIdent {
        self.raw
    }

    /// The descriptor behind [`raw`](TypeDesc::raw).
    pub fn raw_desc(&self) -> &'static TypeDesc {
        super::desc_by_ident(self.raw)
            .expect("raw descriptor is interned before its decorated forms")
    }

    /// Identity with exactly one decoration stripped, if this is a
    /// reference or pointer signature.
    #[inline(always)]
    pub const fn pointee(&self) -> Option<TypeIdent> {
        self.pointee
    }

    /// Array metadata, if this is an `[T; N]` signature.
    #[inline(always)]
    pub const fn array(&self) -> Option<&ArrayDesc> {
        self.array.as_ref()
    }

    /// Array extent, or `0` for non-array types.
    #[inline]
    pub const fn extent(&self) -> usize {
        match &self.array {
            Some(a) => a.extent(),
            None => 0,
        }
    }

    /// Identity of the wrapped type, if this is a wrapper signature.
    #[inline(always)]
    pub const fn wrapped(&self) -> Option<TypeIdent> {
        self.wrapped
    }

    /// Whether this descriptor is for type `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Whether the [`CLASS`](TypeFlags::CLASS) bit is set.
    #[inline(always)]
    pub const fn is_class(&self) -> bool {
        self.flags.contains(TypeFlags::CLASS)
    }

    /// Whether the [`ENUM`](TypeFlags::ENUM) bit is set.
    #[inline(always)]
    pub const fn is_enum(&self) -> bool {
        self.flags.contains(TypeFlags::ENUM)
    }

    /// Whether the [`POINTER`](TypeFlags::POINTER) bit is set.
    #[inline(always)]
    pub const fn is_pointer(&self) -> bool {
        self.flags.contains(TypeFlags::POINTER)
    }

    /// Whether the [`REFERENCE`](TypeFlags::REFERENCE) bit is set.
    #[inline(always)]
    pub const fn is_reference(&self) -> bool {
        self.flags.contains(TypeFlags::REFERENCE)
    }

    /// Whether the [`ARRAY`](TypeFlags::ARRAY) bit is set.
    #[inline(always)]
    pub const fn is_array(&self) -> bool {
        self.flags.contains(TypeFlags::ARRAY)
    }

    /// Whether the [`ARITHMETIC`](TypeFlags::ARITHMETIC) bit is set.
    #[inline(always)]
    pub const fn is_arithmetic(&self) -> bool {
        self.flags.contains(TypeFlags::ARITHMETIC)
    }

    /// Whether the [`WRAPPER`](TypeFlags::WRAPPER) bit is set.
    #[inline(always)]
    pub const fn is_wrapper(&self) -> bool {
        self.flags.contains(TypeFlags::WRAPPER)
    }
}

impl PartialEq for TypeDesc {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ident == other.ident
    }
}

impl Eq for TypeDesc {}

impl PartialOrd for TypeDesc {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeDesc {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.ident.cmp(&other.ident)
    }
}

impl core::hash::Hash for TypeDesc {
    #[inline]
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.ident.hash(state);
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDesc")
            .field("ident", &self.ident)
            .field("path", &self.path)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeDesc {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.path)
    }
}

// -----------------------------------------------------------------------------
// TypeDescBuilder

/// The input shape consumed by descriptor interning.
///
/// Built inside the closure handed to
/// [`registry::intern_with`](super::registry::intern_with); the registry
/// assigns the ordinal and freezes the descriptor.
///
/// # Examples
///
/// ```
/// use rfx_reflect::{TypeDescBuilder, TypeFlags};
///
/// let builder = TypeDescBuilder::named("demo::Shape", "Shape")
///     .flags(TypeFlags::CLASS);
/// # let _ = builder;
/// ```
pub struct TypeDescBuilder {
    path: &'static str,
    name: &'static str,
    flags: TypeFlags,
    raw: Option<&'static TypeDesc>,
    pointee: Option<&'static TypeDesc>,
    array: Option<(usize, &'static TypeDesc)>,
    wrapped: Option<&'static TypeDesc>,
}

impl TypeDescBuilder {
    /// Starts a descriptor with its canonical path and short name.
    pub const fn named(path: &'static str, name: &'static str) -> Self {
        Self {
            path,
            name,
            flags: TypeFlags::empty(),
            raw: None,
            pointee: None,
            array: None,
            wrapped: None,
        }
    }

    /// Adds classification bits.
    pub const fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }

    /// Sets the fully stripped raw type. Defaults to the descriptor itself.
    pub const fn raw(mut self, raw: &'static TypeDesc) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Sets the one-decoration-stripped pointee type.
    pub const fn pointee(mut self, pointee: &'static TypeDesc) -> Self {
        self.pointee = Some(pointee);
        self
    }

    /// Marks the descriptor as an array of `extent` elements.
    pub const fn array(mut self, extent: usize, element: &'static TypeDesc) -> Self {
        self.array = Some((extent, element));
        self
    }

    /// Marks the descriptor as a wrapper around `wrapped`.
    pub const fn wrapped(mut self, wrapped: &'static TypeDesc) -> Self {
        self.wrapped = Some(wrapped);
        self
    }

    // Freezing happens in the interning registry, which owns the ordinal.
    pub(crate) fn freeze(self, ident: TypeIdent, type_id: TypeId) -> TypeDesc {
        let mut flags = self.flags;
        if self.array.is_some() {
            flags |= TypeFlags::ARRAY;
        }
        if self.wrapped.is_some() {
            flags |= TypeFlags::WRAPPER;
        }
        TypeDesc {
            ident,
            type_id,
            path: self.path,
            name: self.name,
            flags,
            raw: match self.raw {
                Some(raw) => raw.ident(),
                None => ident,
            },
            pointee: self.pointee.map(TypeDesc::ident),
            array: self.array.map(|(extent, element)| ArrayDesc {
                extent,
                element: element.ident(),
            }),
            wrapped: self.wrapped.map(TypeDesc::ident),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeIdent;

    #[test]
    fn ident_ordering_is_ordinal_ordering() {
        let a = TypeIdent::from_index(0);
        let b = TypeIdent::from_index(7);
        assert!(a < b);
        assert_eq!(a.get(), 1);
        assert_eq!(b.index(), 7);
    }
}
