use rfx_ptr::{Ptr, PtrMut};

use crate::ident::{Describe, TypeIdent, ident_of};

// -----------------------------------------------------------------------------
// Instance

/// An erased shared reference to a reflected object, paired with the exact
/// identity of its type.
///
/// The pairing is established by the constructor, which is the only way to
/// build one — the identity can therefore be trusted by the invocation
/// machinery when it re-types the pointer.
///
/// # Examples
///
/// ```
/// use rfx_reflect::{Instance, ident_of, impl_describe};
///
/// struct Shape { visible: bool }
/// impl_describe!(Shape => "demo::shapes::Shape", class);
///
/// let shape = Shape { visible: true };
/// let instance = Instance::new(&shape);
/// assert_eq!(instance.ident(), ident_of::<Shape>());
/// # let _ = shape.visible;
/// ```
#[derive(Clone, Copy)]
pub struct Instance<'a> {
    ptr: Ptr<'a>,
    ident: TypeIdent,
}

impl<'a> Instance<'a> {
    /// Erases a shared reference.
    #[inline]
    pub fn new<T: Describe>(value: &'a T) -> Self {
        Self {
            ptr: Ptr::from_ref(value),
            ident: ident_of::<T>(),
        }
    }

    /// Exact identity of the referenced object.
    #[inline]
    pub fn ident(&self) -> TypeIdent {
        self.ident
    }

    #[inline]
    pub(crate) fn ptr(&self) -> Ptr<'a> {
        self.ptr
    }
}

impl<'a, T: Describe> From<&'a T> for Instance<'a> {
    #[inline]
    fn from(value: &'a T) -> Self {
        Instance::new(value)
    }
}

// -----------------------------------------------------------------------------
// InstanceMut

/// An erased exclusive reference to a reflected object, paired with the
/// exact identity of its type.
///
/// See [`Instance`]; this is the form method invocation and property
/// setting consume.
pub struct InstanceMut<'a> {
    ptr: PtrMut<'a>,
    ident: TypeIdent,
}

impl<'a> InstanceMut<'a> {
    /// Erases an exclusive reference.
    #[inline]
    pub fn new<T: Describe>(value: &'a mut T) -> Self {
        Self {
            ptr: PtrMut::from_mut(value),
            ident: ident_of::<T>(),
        }
    }

    /// Exact identity of the referenced object.
    #[inline]
    pub fn ident(&self) -> TypeIdent {
        self.ident
    }

    /// Reborrows as a shared [`Instance`].
    #[inline]
    pub fn as_instance(&self) -> Instance<'_> {
        Instance {
            ptr: self.ptr.as_const(),
            ident: self.ident,
        }
    }

    #[inline]
    pub(crate) fn into_ptr(self) -> PtrMut<'a> {
        self.ptr
    }
}

impl<'a, T: Describe> From<&'a mut T> for InstanceMut<'a> {
    #[inline]
    fn from(value: &'a mut T) -> Self {
        InstanceMut::new(value)
    }
}
