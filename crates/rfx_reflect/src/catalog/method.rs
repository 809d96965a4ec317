#![expect(unsafe_code, reason = "Thunks re-type checked instance pointers.")]

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;

use rfx_ptr::PtrMut;

use crate::catalog::{Access, InvokeError, MetaMap, ParamInfo};
use crate::ident::{Describe, TypeIdent, ident_of};
use crate::registry::Registry;
use crate::value::ReflectValue;
use crate::Variant;

// -----------------------------------------------------------------------------
// Method

pub(crate) type MethodCaller =
    Box<dyn Fn(PtrMut<'_>, &mut [Variant]) -> Result<Variant, InvokeError> + Send + Sync>;

/// One registered method: name, signature, access, metadata, and the
/// erased thunk that performs the call.
///
/// The thunk expects a pointer whose exact type is the *declaring* type
/// and arguments already converted to the parameter types; both are the
/// registry's responsibility during [`invoke`](crate::Registry::invoke).
pub struct Method {
    name: &'static str,
    declared_in: TypeIdent,
    params: Vec<ParamInfo>,
    ret: TypeIdent,
    access: Access,
    meta: MetaMap,
    caller: MethodCaller,
}

impl Method {
    pub(crate) fn from_parts(
        name: &'static str,
        declared_in: TypeIdent,
        params: Vec<ParamInfo>,
        ret: TypeIdent,
        access: Access,
        meta: MetaMap,
        caller: MethodCaller,
    ) -> Self {
        Self {
            name,
            declared_in,
            params,
            ret,
            access,
            meta,
            caller,
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

    /// The parameter list, in declaration order.
    #[inline]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Identity of the return type.
    #[inline]
    pub fn return_type(&self) -> TypeIdent {
        self.ret
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

    /// Number of trailing parameters carrying default values.
    pub fn trailing_defaults(&self) -> usize {
        self.params
            .iter()
            .rev()
            .take_while(|param| param.default().is_some())
            .count()
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

    // `ptr` must address the declaring type exactly; `args` must already
    // hold the parameter types.
    pub(crate) fn invoke_raw(
        &self,
        ptr: PtrMut<'_>,
        args: &mut [Variant],
    ) -> Result<Variant, InvokeError> {
        (self.caller)(ptr, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("declared_in", &self.declared_in)
            .field("params", &self.params)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// MethodFunc

/// Adapter from a plain `Fn(&mut T, ...) -> R` to an erased method thunk.
///
/// Implemented for receivers of up to five reflected parameters; the
/// marker parameter keeps the arity impls apart.
pub trait MethodFunc<T, Marker>: Send + Sync + 'static {
    /// Identities of the parameter types, in order.
    fn param_idents(&self) -> Vec<TypeIdent>;

    /// Identity of the return type.
    fn return_ident(&self) -> TypeIdent;

    /// Consumes the function into the erased thunk.
    fn into_caller(self) -> MethodCaller;
}

// Moves one already-converted argument out of the slot.
pub(crate) fn take_arg<A: ReflectValue>(
    args: &mut [Variant],
    index: usize,
) -> Result<A, InvokeError> {
    let slot = args
        .get_mut(index)
        .ok_or(InvokeError::MissingArgument { index })?;
    slot.take_inner()
        .take::<A>()
        .map_err(|_| InvokeError::ArgumentMismatch {
            index,
            expected: ident_of::<A>(),
        })
}

macro_rules! impl_method_func {
    ($(($Ty:ident, $arg:ident, $idx:tt)),*) => {
        impl<T, F, R $(, $Ty)*> MethodFunc<T, (R, $($Ty,)*)> for F
        where
            T: Describe,
            F: Fn(&mut T $(, $Ty)*) -> R + Send + Sync + 'static,
            R: ReflectValue,
            $($Ty: ReflectValue,)*
        {
            fn param_idents(&self) -> Vec<TypeIdent> {
                alloc::vec![$(ident_of::<$Ty>()),*]
            }

            fn return_ident(&self) -> TypeIdent {
                ident_of::<R>()
            }

            fn into_caller(self) -> MethodCaller {
                Box::new(move |ptr, args| {
                    $(let $arg = take_arg::<$Ty>(args, $idx)?;)*
                    let _ = &args;
                    // SAFETY: the registry adjusted `ptr` to the declaring
                    // type and checked the instance identity.
                    let target = unsafe { ptr.as_mut::<T>() };
                    Ok(Variant::new((self)(target $(, $arg)*)))
                })
            }
        }
    };
}

impl_method_func!();
impl_method_func!((A0, a0, 0));
impl_method_func!((A0, a0, 0), (A1, a1, 1));
impl_method_func!((A0, a0, 0), (A1, a1, 1), (A2, a2, 2));
impl_method_func!((A0, a0, 0), (A1, a1, 1), (A2, a2, 2), (A3, a3, 3));
impl_method_func!(
    (A0, a0, 0),
    (A1, a1, 1),
    (A2, a2, 2),
    (A3, a3, 3),
    (A4, a4, 4)
);

// -----------------------------------------------------------------------------
// Overload selection

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchKind {
    Exact,
    Convertible,
}

// Whether `args` can feed `params`, and how precisely. The argument count
// must fall inside the window left open by trailing defaults.
pub(crate) fn match_args(
    params: &[ParamInfo],
    args: &[Variant],
    registry: &Registry,
) -> Option<MatchKind> {
    let trailing_defaults = params
        .iter()
        .rev()
        .take_while(|param| param.default().is_some())
        .count();
    if args.len() > params.len() || args.len() < params.len() - trailing_defaults {
        return None;
    }
    let mut kind = MatchKind::Exact;
    for (arg, param) in args.iter().zip(params) {
        let supplied = arg.type_ident()?;
        if supplied == param.ty() {
            continue;
        }
        if registry.can_convert(supplied, param.ty()) {
            kind = MatchKind::Convertible;
        } else {
            return None;
        }
    }
    Some(kind)
}

// Exactly one candidate must survive: exact matches are preferred, and
// within the decisive tier anything but a single survivor is an error.
pub(crate) fn select_candidate<'a, C>(
    name: &str,
    candidates: &[&'a C],
    params_of: fn(&C) -> &[ParamInfo],
    args: &[Variant],
    registry: &Registry,
) -> Result<&'a C, InvokeError> {
    let mut exact: Option<&'a C> = None;
    let mut exact_count = 0usize;
    let mut convertible: Option<&'a C> = None;
    let mut convertible_count = 0usize;

    for &candidate in candidates {
        match match_args(params_of(candidate), args, registry) {
            Some(MatchKind::Exact) => {
                exact_count += 1;
                exact.get_or_insert(candidate);
            }
            Some(MatchKind::Convertible) => {
                convertible_count += 1;
                convertible.get_or_insert(candidate);
            }
            None => {}
        }
    }

    match (exact_count, convertible_count) {
        (1, _) => Ok(exact.expect("counted one exact match")),
        (0, 1) => Ok(convertible.expect("counted one convertible match")),
        (0, 0) => Err(InvokeError::NoMatchingOverload {
            name: name.to_string(),
            supplied: args.len(),
        }),
        (n, m) => Err(InvokeError::AmbiguousOverload {
            name: name.to_string(),
            matching: if n > 1 { n } else { m },
        }),
    }
}

// Fills missing trailing arguments from defaults, then converts every
// argument in place to its parameter type.
pub(crate) fn prepare_args(
    params: &[ParamInfo],
    args: &mut Vec<Variant>,
    registry: &Registry,
) -> Result<(), InvokeError> {
    while args.len() < params.len() {
        let index = args.len();
        match params[index].default() {
            Some(default) => args.push(default.clone()),
            None => return Err(InvokeError::MissingArgument { index }),
        }
    }
    for (index, (arg, param)) in args.iter_mut().zip(params).enumerate() {
        if !arg.convert_in(param.ty(), registry) {
            return Err(InvokeError::ArgumentMismatch {
                index,
                expected: param.ty(),
            });
        }
    }
    Ok(())
}
