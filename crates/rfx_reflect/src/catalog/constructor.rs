use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::catalog::method::take_arg;
use crate::catalog::{Access, InvokeError, MetaMap, ParamInfo};
use crate::ident::{TypeIdent, ident_of};
use crate::value::ReflectValue;
use crate::Variant;

// -----------------------------------------------------------------------------
// ConstructPolicy

/// How a constructed object is wrapped in the result variant.
///
/// The policy changes only the wrapping, never overload matching.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ConstructPolicy {
    /// The variant holds the object itself.
    #[default]
    Value,
    /// The variant holds `Box<T>`.
    Boxed,
    /// The variant holds `Arc<T>`, a shared-ownership handle.
    Shared,
}

// -----------------------------------------------------------------------------
// Constructor

pub(crate) type CtorCaller =
    Box<dyn Fn(&mut [Variant]) -> Result<Variant, InvokeError> + Send + Sync>;

/// One registered constructor of a type.
pub struct Constructor {
    declared_in: TypeIdent,
    params: Vec<ParamInfo>,
    policy: ConstructPolicy,
    access: Access,
    meta: MetaMap,
    caller: CtorCaller,
}

impl Constructor {
    pub(crate) fn from_parts(
        declared_in: TypeIdent,
        params: Vec<ParamInfo>,
        policy: ConstructPolicy,
        access: Access,
        meta: MetaMap,
        caller: CtorCaller,
    ) -> Self {
        Self {
            declared_in,
            params,
            policy,
            access,
            meta,
            caller,
        }
    }

    /// Identity of the constructed type.
    #[inline]
    pub fn declared_in(&self) -> TypeIdent {
        self.declared_in
    }

    /// The parameter list, in declaration order.
    #[inline]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// How the result variant wraps the object.
    #[inline]
    pub fn policy(&self) -> ConstructPolicy {
        self.policy
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

    /// Whether another parameter list spells the same signature.
    pub(crate) fn same_signature(&self, params: &[ParamInfo]) -> bool {
        self.params.len() == params.len()
            && self
                .params
                .iter()
                .zip(params)
                .all(|(a, b)| a.ty() == b.ty())
    }

    // `args` must already hold the parameter types.
    pub(crate) fn invoke_raw(&self, args: &mut [Variant]) -> Result<Variant, InvokeError> {
        (self.caller)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("declared_in", &self.declared_in)
            .field("params", &self.params)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// CtorFunc

/// Adapter from a plain `Fn(...) -> T` to an erased constructor thunk.
///
/// Implemented for factories of up to five reflected parameters.
pub trait CtorFunc<T, Marker>: Send + Sync + 'static {
    /// Identities of the parameter types, in order.
    fn param_idents(&self) -> Vec<TypeIdent>;

    /// Consumes the factory into the erased thunk, wrapping per `policy`.
    fn into_caller(self, policy: ConstructPolicy) -> CtorCaller;
}

macro_rules! impl_ctor_func {
    ($(($Ty:ident, $arg:ident, $idx:tt)),*) => {
        impl<T, F $(, $Ty)*> CtorFunc<T, ($($Ty,)*)> for F
        where
            T: ReflectValue + Clone,
            F: Fn($($Ty),*) -> T + Send + Sync + 'static,
            $($Ty: ReflectValue,)*
        {
            fn param_idents(&self) -> Vec<TypeIdent> {
                alloc::vec![$(ident_of::<$Ty>()),*]
            }

            fn into_caller(self, policy: ConstructPolicy) -> CtorCaller {
                Box::new(move |args| {
                    $(let $arg = take_arg::<$Ty>(args, $idx)?;)*
                    let _ = &args;
                    let value = (self)($($arg),*);
                    Ok(match policy {
                        ConstructPolicy::Value => Variant::new(value),
                        ConstructPolicy::Boxed => Variant::new(Box::new(value)),
                        ConstructPolicy::Shared => Variant::new(Arc::new(value)),
                    })
                })
            }
        }
    };
}

impl_ctor_func!();
impl_ctor_func!((A0, a0, 0));
impl_ctor_func!((A0, a0, 0), (A1, a1, 1));
impl_ctor_func!((A0, a0, 0), (A1, a1, 1), (A2, a2, 2));
impl_ctor_func!((A0, a0, 0), (A1, a1, 1), (A2, a2, 2), (A3, a3, 3));
impl_ctor_func!(
    (A0, a0, 0),
    (A1, a1, 1),
    (A2, a2, 2),
    (A3, a3, 3),
    (A4, a4, 4)
);

// -----------------------------------------------------------------------------
// Destructor

/// Tears down a constructed object, whichever wrap policy produced it.
///
/// Destroying drops the payload exactly once; a variant of any other type
/// is refused and left intact.
pub struct Destructor {
    declared_in: TypeIdent,
    dropper: Box<dyn Fn(&mut Variant) -> bool + Send + Sync>,
}

impl Destructor {
    pub(crate) fn of<T: ReflectValue + Clone>() -> Self {
        Self {
            declared_in: ident_of::<T>(),
            dropper: Box::new(|value| {
                if value.is::<T>() || value.is::<Box<T>>() || value.is::<Arc<T>>() {
                    value.clear();
                    true
                } else {
                    false
                }
            }),
        }
    }

    /// Identity of the type this destructor tears down.
    #[inline]
    pub fn declared_in(&self) -> TypeIdent {
        self.declared_in
    }

    /// Drops the variant's payload if it is the declared type (or one of
    /// its constructed wraps). Returns `false`, leaving the variant
    /// untouched, otherwise.
    pub fn destroy(&self, value: &mut Variant) -> bool {
        (self.dropper)(value)
    }
}

impl fmt::Debug for Destructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destructor")
            .field("declared_in", &self.declared_in)
            .finish_non_exhaustive()
    }
}
