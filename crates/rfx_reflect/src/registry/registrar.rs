use core::marker::PhantomData;

use crate::catalog::build_params;
use crate::catalog::{
    ConstructPolicy, Constructor, CtorFunc, Destructor, MemberOptions, MetaMap, Method,
    MethodFunc, Property, TypeCatalog,
};
use crate::graph::HasBases;
use crate::ident::ident_of;
use crate::registry::Registry;
use crate::value::ReflectValue;
use crate::Variant;

// -----------------------------------------------------------------------------
// TypeRegistrar

/// Chained registration of one type's members.
///
/// Obtained from [`Registry::register_type`]; every call records one
/// member tuple (kind, name, accessor, parameter types, defaults, access,
/// metadata) into the type's catalog. Registering a member whose (name,
/// signature) already exists replaces the earlier record.
///
/// # Examples
///
/// ```
/// use rfx_reflect::catalog::MemberOptions;
/// use rfx_reflect::{Registry, Variant};
/// use rfx_reflect::{impl_describe, impl_reflect_value, reflect_bases};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Shape { visible: bool, name: String }
///
/// impl_describe!(Shape => "demo::Shape", class);
/// impl_reflect_value!(Shape => partial_eq, debug);
/// reflect_bases!(Shape);
///
/// let mut registry = Registry::new();
/// registry
///     .register_type::<Shape>()
///     .bases()
///     .constructor(|| Shape { visible: true, name: String::new() })
///     .property(
///         "visible",
///         |s: &Shape| s.visible,
///         |s: &mut Shape, v| s.visible = v,
///     )
///     .property(
///         "name",
///         |s: &Shape| s.name.clone(),
///         |s: &mut Shape, v| s.name = v,
///     )
///     .method_with(
///         "scaled",
///         |s: &mut Shape, factor: f64| factor * s.name.len() as f64,
///         MemberOptions::with_defaults(vec![Variant::new(2.0f64)]),
///     );
/// ```
pub struct TypeRegistrar<'r, T: ReflectValue> {
    registry: &'r mut Registry,
    _marker: PhantomData<fn() -> T>,
}

impl Registry {
    /// Opens the registration surface for `T`, creating its catalog entry
    /// on first use.
    pub fn register_type<T: ReflectValue>(&mut self) -> TypeRegistrar<'_, T> {
        let ty = ident_of::<T>();
        self.catalogs.entry(ty).or_insert_with(|| TypeCatalog::new(ty));
        TypeRegistrar {
            registry: self,
            _marker: PhantomData,
        }
    }

    /// Opens the enumeration registration surface for `E`.
    ///
    /// `discriminant` projects each registered value onto its underlying
    /// integer.
    pub fn register_enum<E: ReflectValue>(
        &mut self,
        discriminant: fn(&E) -> i64,
    ) -> EnumRegistrar<'_, E> {
        let ty = ident_of::<E>();
        self.catalogs.entry(ty).or_insert_with(|| TypeCatalog::new(ty));
        EnumRegistrar {
            registry: self,
            discriminant,
            _marker: PhantomData,
        }
    }
}

impl<T: ReflectValue> TypeRegistrar<'_, T> {
    fn catalog(&mut self) -> &mut TypeCatalog {
        self.registry
            .catalogs
            .get_mut(&ident_of::<T>())
            .expect("catalog entry created by `register_type`")
    }

    /// Registers `T`'s declared base list (graph edges plus reference
    /// upcast conversions).
    pub fn bases(self) -> Self
    where
        T: HasBases,
    {
        self.registry.register_bases::<T>();
        self
    }

    /// Registers a constructor with default options, wrapping by value.
    pub fn constructor<F, M>(self, factory: F) -> Self
    where
        T: Clone,
        F: CtorFunc<T, M>,
    {
        self.constructor_with(factory, ConstructPolicy::default(), MemberOptions::default())
    }

    /// Registers a constructor with an explicit wrap policy and options.
    pub fn constructor_with<F, M>(
        mut self,
        factory: F,
        policy: ConstructPolicy,
        options: MemberOptions,
    ) -> Self
    where
        T: Clone,
        F: CtorFunc<T, M>,
    {
        let params = build_params(
            factory.param_idents(),
            &options.param_names,
            options.defaults,
        );
        let meta: MetaMap = options.meta.into_iter().collect();
        let constructor = Constructor::from_parts(
            ident_of::<T>(),
            params,
            policy,
            options.access,
            meta,
            factory.into_caller(policy),
        );
        let catalog = self.catalog();
        catalog.push_constructor(constructor);
        catalog.ensure_destructor(Destructor::of::<T>());
        self
    }

    /// Registers a method with default options.
    pub fn method<F, M>(self, name: &'static str, function: F) -> Self
    where
        F: MethodFunc<T, M>,
    {
        self.method_with(name, function, MemberOptions::default())
    }

    /// Registers a method with explicit options (access, parameter names,
    /// trailing defaults, metadata).
    pub fn method_with<F, M>(
        mut self,
        name: &'static str,
        function: F,
        options: MemberOptions,
    ) -> Self
    where
        F: MethodFunc<T, M>,
    {
        let params = build_params(
            function.param_idents(),
            &options.param_names,
            options.defaults,
        );
        let meta: MetaMap = options.meta.into_iter().collect();
        let method = Method::from_parts(
            name,
            ident_of::<T>(),
            params,
            function.return_ident(),
            options.access,
            meta,
            function.into_caller(),
        );
        self.catalog().push_method(method);
        self
    }

    /// Registers a read/write property from an accessor pair.
    pub fn property<P, G, S>(self, name: &'static str, get: G, set: S) -> Self
    where
        P: ReflectValue,
        G: Fn(&T) -> P + Send + Sync + 'static,
        S: Fn(&mut T, P) + Send + Sync + 'static,
    {
        self.property_with(name, get, set, MemberOptions::default())
    }

    /// Registers a read/write property with explicit options.
    pub fn property_with<P, G, S>(
        mut self,
        name: &'static str,
        get: G,
        set: S,
        options: MemberOptions,
    ) -> Self
    where
        P: ReflectValue,
        G: Fn(&T) -> P + Send + Sync + 'static,
        S: Fn(&mut T, P) + Send + Sync + 'static,
    {
        let meta: MetaMap = options.meta.into_iter().collect();
        let property = Property::build(name, get, set, options.access, meta);
        self.catalog().push_property(property);
        self
    }

    /// Registers a read-only property.
    pub fn property_readonly<P, G>(self, name: &'static str, get: G) -> Self
    where
        P: ReflectValue,
        G: Fn(&T) -> P + Send + Sync + 'static,
    {
        self.property_readonly_with(name, get, MemberOptions::default())
    }

    /// Registers a read-only property with explicit options.
    pub fn property_readonly_with<P, G>(
        mut self,
        name: &'static str,
        get: G,
        options: MemberOptions,
    ) -> Self
    where
        P: ReflectValue,
        G: Fn(&T) -> P + Send + Sync + 'static,
    {
        let meta: MetaMap = options.meta.into_iter().collect();
        let property = Property::build_readonly(name, get, options.access, meta);
        self.catalog().push_property(property);
        self
    }

    /// Attaches type-level metadata.
    pub fn meta(mut self, key: &'static str, value: Variant) -> Self {
        self.catalog().meta_mut().insert(key, value);
        self
    }
}

// -----------------------------------------------------------------------------
// EnumRegistrar

/// Chained registration of an enumeration's name/value pairs.
///
/// # Examples
///
/// ```
/// use rfx_reflect::{Registry, ident_of};
/// use rfx_reflect::{impl_describe, impl_reflect_value};
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Channel { Red, Green, Blue }
///
/// impl_describe!(Channel => "demo::Channel", enumeration);
/// impl_reflect_value!(Channel => partial_eq, debug);
///
/// let mut registry = Registry::new();
/// registry
///     .register_enum::<Channel>(|c| *c as i64)
///     .value("red", Channel::Red)
///     .value("green", Channel::Green)
///     .value("blue", Channel::Blue);
///
/// let table = registry.enumeration(ident_of::<Channel>()).unwrap();
/// assert_eq!(table.value_to_name(1), Some("green"));
/// assert_eq!(table.value_to_name(9), None);
/// ```
pub struct EnumRegistrar<'r, E: ReflectValue> {
    registry: &'r mut Registry,
    discriminant: fn(&E) -> i64,
    _marker: PhantomData<fn() -> E>,
}

impl<E: ReflectValue> EnumRegistrar<'_, E> {
    /// Registers one name/value pair. Aliases for an already-registered
    /// discriminant are kept; reverse lookup answers with the first.
    pub fn value(self, name: &'static str, value: E) -> Self {
        let discriminant = (self.discriminant)(&value);
        let holder = Variant::new(value);
        self.registry
            .catalogs
            .get_mut(&ident_of::<E>())
            .expect("catalog entry created by `register_enum`")
            .enumeration_mut()
            .push(name, discriminant, holder);
        self
    }

    /// Attaches metadata to the enumeration table.
    pub fn meta(self, key: &'static str, value: Variant) -> Self {
        self.registry
            .catalogs
            .get_mut(&ident_of::<E>())
            .expect("catalog entry created by `register_enum`")
            .enumeration_mut()
            .meta_mut()
            .insert(key, value);
        self
    }
}
