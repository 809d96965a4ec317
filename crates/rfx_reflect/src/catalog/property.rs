#![expect(unsafe_code, reason = "Accessor thunks re-type checked instance pointers.")]

use alloc::boxed::Box;
use core::fmt;

use rfx_ptr::{Ptr, PtrMut};

use crate::catalog::{Access, MetaMap};
use crate::ident::{Describe, TypeIdent, ident_of};
use crate::value::ReflectValue;
use crate::Variant;

// -----------------------------------------------------------------------------
// Property

pub(crate) type PropGetter = Box<dyn Fn(Ptr<'_>) -> Variant + Send + Sync>;
pub(crate) type PropSetter = Box<dyn Fn(PtrMut<'_>, Variant) -> bool + Send + Sync>;

/// One registered property: exactly one getter, at most one setter.
///
/// The getter clones the value out into a variant; the setter consumes a
/// variant already holding the property type. Conversion of looser inputs
/// happens in [`set_property`](crate::Registry::set_property) before the
/// setter runs.
pub struct Property {
    name: &'static str,
    declared_in: TypeIdent,
    ty: TypeIdent,
    access: Access,
    meta: MetaMap,
    getter: PropGetter,
    setter: Option<PropSetter>,
}

impl Property {
    // Read/write property from a pair of accessor closures.
    pub(crate) fn build<T, P, G, S>(
        name: &'static str,
        get: G,
        set: S,
        access: Access,
        meta: MetaMap,
    ) -> Self
    where
        T: Describe,
        P: ReflectValue,
        G: Fn(&T) -> P + Send + Sync + 'static,
        S: Fn(&mut T, P) + Send + Sync + 'static,
    {
        let mut property = Self::build_readonly(name, get, access, meta);
        property.setter = Some(Box::new(move |ptr, value| match value.take::<P>() {
            Ok(value) => {
                // SAFETY: the registry adjusted `ptr` to the declaring type.
                set(unsafe { ptr.as_mut::<T>() }, value);
                true
            }
            Err(_) => false,
        }));
        property
    }

    // Read-only property from a getter closure.
    pub(crate) fn build_readonly<T, P, G>(
        name: &'static str,
        get: G,
        access: Access,
        meta: MetaMap,
    ) -> Self
    where
        T: Describe,
        P: ReflectValue,
        G: Fn(&T) -> P + Send + Sync + 'static,
    {
        Self {
            name,
            declared_in: ident_of::<T>(),
            ty: ident_of::<P>(),
            access,
            meta,
            getter: Box::new(move |ptr| {
                // SAFETY: the registry adjusted `ptr` to the declaring type.
                Variant::new(get(unsafe { ptr.as_ref::<T>() }))
            }),
            setter: None,
        }
    }

    /// The registered name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Identity of the declaring type.
    #[inline]
    pub fn declared_in(&self) -> TypeIdent {
        self.declared_in
    }

    /// Identity of the property value type.
    #[inline]
    pub fn value_type(&self) -> TypeIdent {
        self.ty
    }

    /// The access tag.
    #[inline]
    pub fn access(&self) -> Access {
        self.access
    }

    /// The member metadata.
    #[inline]
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// Whether no setter was registered.
    #[inline]
    pub fn is_readonly(&self) -> bool {
        self.setter.is_none()
    }

    // `ptr` must address the declaring type exactly.
    pub(crate) fn get_raw(&self, ptr: Ptr<'_>) -> Variant {
        (self.getter)(ptr)
    }

    // `ptr` must address the declaring type exactly; `value` must hold the
    // property type.
    pub(crate) fn set_raw(&self, ptr: PtrMut<'_>, value: Variant) -> bool {
        match &self.setter {
            Some(set) => set(ptr, value),
            None => false,
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("declared_in", &self.declared_in)
            .field("ty", &self.ty)
            .field("readonly", &self.is_readonly())
            .finish_non_exhaustive()
    }
}
