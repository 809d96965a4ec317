#![expect(unsafe_code, reason = "Instance pointers are re-typed through the cast engine.")]

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::catalog::{
    Constructor, Enumeration, Instance, InstanceMut, InvokeError, Method, Property, TypeCatalog,
    prepare_args, select_candidate,
};
use crate::collections::{HashMap, new_map};
use crate::convert::{ConversionTable, install_default_conversions};
use crate::graph::{BaseGraph, HasBases};
use crate::ident::{Describe, TypeIdent, desc_by_ident};
use crate::value::ReflectValue;
use crate::Variant;

// -----------------------------------------------------------------------------
// Registry

/// The central store: base graph, conversion table and per-type catalogs.
///
/// A fresh instance can be built for tests; the process normally works
/// against [`global()`](crate::registry::global). After the registration
/// phase the registry is only read, which any number of threads may do
/// concurrently through [`RegistryArc::read`](crate::RegistryArc::read).
///
/// # Examples
///
/// ```
/// use rfx_reflect::{Registry, Variant, InstanceMut, ident_of};
/// use rfx_reflect::{impl_describe, impl_reflect_value, reflect_bases};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Counter { count: i32 }
///
/// impl_describe!(Counter => "demo::Counter", class);
/// impl_reflect_value!(Counter => partial_eq, debug);
/// reflect_bases!(Counter);
///
/// let mut registry = Registry::new();
/// registry
///     .register_type::<Counter>()
///     .constructor(|| Counter { count: 0 })
///     .method("add", |c: &mut Counter, n: i32| { c.count += n; c.count })
///     .property("count", |c: &Counter| c.count, |c: &mut Counter, v| c.count = v);
///
/// let mut counter = registry
///     .create(ident_of::<Counter>(), vec![])
///     .unwrap()
///     .take::<Counter>()
///     .unwrap();
///
/// let total = registry
///     .invoke("add", InstanceMut::new(&mut counter), vec![Variant::new(5i32)])
///     .unwrap();
/// assert_eq!(total.get::<i32>(), Some(&5));
/// ```
pub struct Registry {
    pub(crate) graph: BaseGraph,
    pub(crate) conversions: ConversionTable,
    pub(crate) catalogs: HashMap<TypeIdent, TypeCatalog>,
}

impl Registry {
    /// A registry with no conversions at all.
    pub const fn empty() -> Self {
        Self {
            graph: BaseGraph::new(),
            conversions: ConversionTable::new(),
            catalogs: new_map(),
        }
    }

    /// A registry pre-loaded with the primitive conversions (numeric
    /// widenings, checked narrowings, number-to-string renderings).
    pub fn new() -> Self {
        let mut registry = Self::empty();
        install_default_conversions(&mut registry.conversions);
        registry
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Registers `D`'s base list into the graph, together with the
    /// `&'static` upcast conversions of every reachable edge.
    pub fn register_bases<D: HasBases>(&mut self) {
        self.graph.register::<D>();
        <D::Bases as crate::graph::BaseList<D>>::register_reference_upcasts(&mut self.conversions);
    }

    /// Registers a typed conversion. Later registration wins.
    pub fn register_converter<S, D, F>(&mut self, convert: F)
    where
        S: ReflectValue,
        D: ReflectValue,
        F: Fn(&S) -> Option<D> + Send + Sync + 'static,
    {
        self.conversions.register_typed::<S, D, F>(convert);
    }

    // -------------------------------------------------------------------------
    // Structure queries

    /// The base graph.
    #[inline]
    pub fn graph(&self) -> &BaseGraph {
        &self.graph
    }

    /// The conversion table.
    #[inline]
    pub fn conversions(&self) -> &ConversionTable {
        &self.conversions
    }

    /// Mutable access to the conversion table.
    #[inline]
    pub fn conversions_mut(&mut self) -> &mut ConversionTable {
        &mut self.conversions
    }

    /// The catalog of a type, when one was registered.
    #[inline]
    pub fn catalog(&self, ty: TypeIdent) -> Option<&TypeCatalog> {
        self.catalogs.get(&ty)
    }

    /// The enumeration table of a type.
    pub fn enumeration(&self, ty: TypeIdent) -> Option<&Enumeration> {
        self.catalogs.get(&ty)?.enumeration()
    }

    /// Safe reference upcast along registered edges.
    pub fn cast_ref<'a, Src: Describe, Dst: Describe>(&self, value: &'a Src) -> Option<&'a Dst> {
        self.graph.cast_ref(value)
    }

    /// Safe mutable reference upcast along registered edges.
    pub fn cast_mut<'a, Src: Describe, Dst: Describe>(
        &self,
        value: &'a mut Src,
    ) -> Option<&'a mut Dst> {
        self.graph.cast_mut(value)
    }

    // -------------------------------------------------------------------------
    // Member queries

    /// A type's methods: its own first, in registration order, then the
    /// inherited ones walking the base graph breadth-first.
    ///
    /// Name lookup over this order finds the most-derived entry first
    /// when names collide.
    pub fn methods_of(&self, ty: TypeIdent) -> Vec<&Method> {
        let mut out = Vec::new();
        if let Some(catalog) = self.catalogs.get(&ty) {
            out.extend(catalog.methods());
        }
        for ancestor in self.graph.ancestors(ty) {
            if let Some(catalog) = self.catalogs.get(&ancestor) {
                out.extend(catalog.methods());
            }
        }
        out
    }

    /// A type's properties: inherited ones first, its own last.
    ///
    /// Inherited entries are ordered deepest ancestors first; within one
    /// distance, bases follow their declaration order, and every list
    /// keeps its own declaration order. Name lookup over this order
    /// resolves a colliding name to the first-declared entry, and both
    /// entries stay visible in the list.
    pub fn properties_of(&self, ty: TypeIdent) -> Vec<&Property> {
        let mut out = Vec::new();
        for level in self.graph.ancestor_levels(ty).iter().rev() {
            for ancestor in level {
                if let Some(catalog) = self.catalogs.get(ancestor) {
                    out.extend(catalog.properties());
                }
            }
        }
        if let Some(catalog) = self.catalogs.get(&ty) {
            out.extend(catalog.properties());
        }
        out
    }

    /// First method with the given name in [`methods_of`] order.
    ///
    /// [`methods_of`]: Registry::methods_of
    pub fn find_method(&self, ty: TypeIdent, name: &str) -> Option<&Method> {
        self.methods_of(ty)
            .into_iter()
            .find(|method| method.name() == name)
    }

    /// First property with the given name in [`properties_of`] order.
    ///
    /// [`properties_of`]: Registry::properties_of
    pub fn find_property(&self, ty: TypeIdent, name: &str) -> Option<&Property> {
        self.properties_of(ty)
            .into_iter()
            .find(|property| property.name() == name)
    }

    // -------------------------------------------------------------------------
    // Invocation

    /// Invokes `name` on the instance with the supplied arguments.
    ///
    /// Candidates are gathered by name over [`methods_of`] order, matched
    /// by arity window and argument types (exact matches preferred over
    /// convertible ones), trailing defaults fill missing arguments, and
    /// every argument is converted to its parameter type before the call.
    /// Anything but exactly one surviving candidate fails.
    ///
    /// [`methods_of`]: Registry::methods_of
    pub fn invoke(
        &self,
        name: &str,
        instance: InstanceMut<'_>,
        mut args: Vec<Variant>,
    ) -> Result<Variant, InvokeError> {
        let ty = instance.ident();
        let candidates: Vec<&Method> = self
            .methods_of(ty)
            .into_iter()
            .filter(|method| method.name() == name)
            .collect();
        if candidates.is_empty() {
            return Err(InvokeError::NoSuchMember {
                name: name.to_string(),
            });
        }
        let method = select_candidate(name, &candidates, Method::params, &args, self)?;
        prepare_args(method.params(), &mut args, self)?;

        let ptr = if ty == method.declared_in() {
            instance.into_ptr()
        } else {
            // SAFETY: `InstanceMut::new` captured the exact pointee type.
            match unsafe {
                self.graph
                    .try_cast_mut(instance.into_ptr(), ty, method.declared_in())
            } {
                Some(ptr) => ptr,
                None => {
                    return Err(InvokeError::WrongInstanceType {
                        expected: method.declared_in(),
                        found: ty,
                    });
                }
            }
        };
        method.invoke_raw(ptr, &mut args)
    }

    /// Reads a property through its getter.
    pub fn get_property(
        &self,
        name: &str,
        instance: Instance<'_>,
    ) -> Result<Variant, InvokeError> {
        let ty = instance.ident();
        let property = self
            .find_property(ty, name)
            .ok_or_else(|| InvokeError::NoSuchMember {
                name: name.to_string(),
            })?;
        let ptr = if ty == property.declared_in() {
            instance.ptr()
        } else {
            // SAFETY: `Instance::new` captured the exact pointee type.
            match unsafe {
                self.graph
                    .try_cast(instance.ptr(), ty, property.declared_in())
            } {
                Some(ptr) => ptr,
                None => {
                    return Err(InvokeError::WrongInstanceType {
                        expected: property.declared_in(),
                        found: ty,
                    });
                }
            }
        };
        Ok(property.get_raw(ptr))
    }

    /// Writes a property through its setter, converting the value to the
    /// property type first.
    ///
    /// `false` on a missing or read-only property, an unconvertible
    /// value, or an unrelated instance — the target stays unmodified.
    pub fn set_property(&self, name: &str, instance: InstanceMut<'_>, mut value: Variant) -> bool {
        let ty = instance.ident();
        let Some(property) = self.find_property(ty, name) else {
            return false;
        };
        if property.is_readonly() || !value.convert_in(property.value_type(), self) {
            return false;
        }
        let ptr = if ty == property.declared_in() {
            instance.into_ptr()
        } else {
            // SAFETY: `InstanceMut::new` captured the exact pointee type.
            match unsafe {
                self.graph
                    .try_cast_mut(instance.into_ptr(), ty, property.declared_in())
            } {
                Some(ptr) => ptr,
                None => return false,
            }
        };
        property.set_raw(ptr, value)
    }

    /// Constructs an instance of `ty` through a registered constructor.
    ///
    /// Overload selection follows the same discipline as
    /// [`invoke`](Registry::invoke); the result variant wraps the object
    /// per the constructor's [`policy`](Constructor::policy).
    pub fn create(&self, ty: TypeIdent, mut args: Vec<Variant>) -> Result<Variant, InvokeError> {
        let catalog = self
            .catalogs
            .get(&ty)
            .ok_or(InvokeError::NoSuchType { ident: ty })?;
        let candidates: Vec<&Constructor> = catalog.constructors().iter().collect();
        if candidates.is_empty() {
            return Err(InvokeError::NoSuchMember {
                name: "constructor".to_string(),
            });
        }
        let constructor =
            select_candidate("constructor", &candidates, Constructor::params, &args, self)?;
        prepare_args(constructor.params(), &mut args, self)?;
        constructor.invoke_raw(&mut args)
    }

    /// Tears down a constructed object through its type's destructor.
    ///
    /// Wrapper payloads (`Box<T>`, `Arc<T>`) resolve to the wrapped
    /// type's destructor. Without a registered destructor the payload is
    /// simply dropped. `false` when the variant is empty or its type has
    /// no catalog.
    pub fn destroy(&self, value: &mut Variant) -> bool {
        let Some(desc) = value.type_desc() else {
            return false;
        };
        let ty = desc.wrapped().unwrap_or(desc.ident());
        let Some(catalog) = self.catalogs.get(&ty) else {
            return false;
        };
        match catalog.destructor() {
            Some(destructor) => destructor.destroy(value),
            None => {
                value.clear();
                true
            }
        }
    }

    // -------------------------------------------------------------------------
    // Conversion

    /// Whether a conversion from `from` to `to` could succeed: identity,
    /// a registered pair, or a reference upcast along the base graph.
    pub fn can_convert(&self, from: TypeIdent, to: TypeIdent) -> bool {
        if from == to || self.conversions.contains(from, to) {
            return true;
        }
        self.reference_upcast_path(from, to).is_some()
    }

    /// Produces a converted copy of the variant's payload, `None` when no
    /// conversion applies.
    ///
    /// The source variant is never modified;
    /// [`Variant::convert`](crate::Variant::convert) builds on this to
    /// re-type in place.
    pub fn convert_value(&self, value: &Variant, to: TypeIdent) -> Option<Variant> {
        let from = value.type_ident()?;
        if from == to {
            return Some(value.clone());
        }
        if let Some(convert) = self.conversions.find(from, to) {
            return convert(value);
        }
        // Reference upcasts compose hop-by-hop along the base graph.
        let path = self.reference_upcast_path(from, to)?;
        let mut current = value.clone();
        for window in path.windows(2) {
            let (ref_from, ref_to) = self.conversions.ref_upcast_pair(window[0], window[1])?;
            debug_assert_eq!(current.type_ident(), Some(ref_from));
            let convert = self.conversions.find(ref_from, ref_to)?;
            current = convert(&current)?;
        }
        Some(current)
    }

    // The pointee path behind a reference-to-reference upcast, when both
    // sides are reference descriptors and the graph connects them.
    fn reference_upcast_path(&self, from: TypeIdent, to: TypeIdent) -> Option<Vec<TypeIdent>> {
        let from_desc = desc_by_ident(from)?;
        let to_desc = desc_by_ident(to)?;
        if !from_desc.is_reference() || !to_desc.is_reference() {
            return None;
        }
        let path = self.graph.path(from_desc.pointee()?, to_desc.pointee()?)?;
        if path.len() < 2 { None } else { Some(path) }
    }
}

impl Default for Registry {
    /// See [`Registry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("catalogs", &self.catalogs.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;

    use crate::catalog::{Access, ConstructPolicy, InvokeError, MemberOptions};
    use crate::ident::ident_of;
    use crate::registry::Registry;
    use crate::{Instance, InstanceMut, Variant};
    use crate::{impl_describe, impl_reflect_value, reflect_bases};

    // ---------------------------------------------------------------------
    // Test types

    #[derive(Clone, PartialEq, Debug)]
    struct Shape {
        visible: bool,
        name: String,
    }

    impl_describe!(Shape => "registry_tests::Shape", class);
    impl_reflect_value!(Shape => partial_eq, debug);
    reflect_bases!(Shape);

    #[derive(Clone, PartialEq, Debug)]
    struct Base {
        p1: i32,
    }

    #[derive(Clone, PartialEq, Debug)]
    struct Other {
        p2: i32,
    }

    #[derive(Clone, PartialEq, Debug)]
    struct Derived {
        base: Base,
        other: Other,
        p2: i32,
    }

    impl_describe!(Base => "registry_tests::Base", class);
    impl_describe!(Other => "registry_tests::Other", class);
    impl_describe!(Derived => "registry_tests::Derived", class);
    impl_reflect_value!(Base => partial_eq, debug);
    impl_reflect_value!(Other => partial_eq, debug);
    impl_reflect_value!(Derived => partial_eq, debug);

    reflect_bases!(Base);
    reflect_bases!(Other);
    reflect_bases!(Derived: Base => base, Other => other);

    fn shape_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_type::<Shape>()
            .bases()
            .constructor(|| Shape {
                visible: true,
                name: String::new(),
            })
            .property(
                "visible",
                |s: &Shape| s.visible,
                |s: &mut Shape, v| s.visible = v,
            )
            .property(
                "name",
                |s: &Shape| s.name.clone(),
                |s: &mut Shape, v| s.name = v,
            );
        registry
    }

    fn hierarchy_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_type::<Base>()
            .bases()
            .property("p1", |b: &Base| b.p1, |b: &mut Base, v| b.p1 = v)
            .property("p2", |b: &Base| b.p1 * 10, |b: &mut Base, v| b.p1 = v)
            .method("describe", |b: &mut Base| b.p1);
        registry
            .register_type::<Other>()
            .bases()
            .property("p2", |o: &Other| o.p2, |o: &mut Other, v| o.p2 = v);
        registry
            .register_type::<Derived>()
            .bases()
            .property("p2", |d: &Derived| d.p2, |d: &mut Derived, v| d.p2 = v);
        registry
    }

    fn derived() -> Derived {
        Derived {
            base: Base { p1: 1 },
            other: Other { p2: 2 },
            p2: 3,
        }
    }

    // ---------------------------------------------------------------------
    // Properties

    #[test]
    fn property_roundtrip_on_the_exact_type() {
        let registry = shape_registry();
        let mut shape = Shape {
            visible: false,
            name: String::from("unnamed"),
        };

        assert!(registry.set_property(
            "name",
            InstanceMut::new(&mut shape),
            Variant::new(String::from("circle")),
        ));
        let name = registry
            .get_property("name", Instance::new(&shape))
            .unwrap();
        assert_eq!(name.get::<String>().map(String::as_str), Some("circle"));
        assert_eq!(shape.name, "circle");
    }

    #[test]
    fn missing_property_fails_without_touching_the_target() {
        let registry = shape_registry();
        let mut shape = Shape {
            visible: false,
            name: String::from("kept"),
        };
        assert!(!registry.set_property(
            "radius",
            InstanceMut::new(&mut shape),
            Variant::new(1.0f64),
        ));
        assert_eq!(shape.name, "kept");
        assert_eq!(
            registry.get_property("radius", Instance::new(&shape)),
            Err(InvokeError::NoSuchMember {
                name: String::from("radius")
            })
        );
    }

    #[test]
    fn unconvertible_property_value_is_rejected() {
        let registry = shape_registry();
        let mut shape = Shape {
            visible: false,
            name: String::from("kept"),
        };
        assert!(!registry.set_property(
            "visible",
            InstanceMut::new(&mut shape),
            Variant::new(String::from("yes")),
        ));
        assert!(!shape.visible);
    }

    #[test]
    fn inherited_properties_list_before_own_in_declaration_order() {
        let registry = hierarchy_registry();
        let properties = registry.properties_of(ident_of::<Derived>());
        let names: alloc::vec::Vec<_> = properties
            .iter()
            .map(|p| (p.name(), p.declared_in()))
            .collect();
        assert_eq!(
            names,
            [
                ("p1", ident_of::<Base>()),
                ("p2", ident_of::<Base>()),
                ("p2", ident_of::<Other>()),
                ("p2", ident_of::<Derived>()),
            ]
        );
    }

    #[test]
    fn colliding_property_name_resolves_to_first_declared() {
        let registry = hierarchy_registry();
        let shared = registry.find_property(ident_of::<Derived>(), "p2").unwrap();
        // Three types contribute `p2`; the root-most declaration wins.
        assert_eq!(shared.declared_in(), ident_of::<Base>());

        let derived = derived();
        let value = registry
            .get_property("p2", Instance::new(&derived))
            .unwrap();
        assert_eq!(value.get::<i32>(), Some(&10));
    }

    #[test]
    fn inherited_property_reads_through_the_adjusted_pointer() {
        let registry = hierarchy_registry();
        let derived = derived();
        let value = registry
            .get_property("p1", Instance::new(&derived))
            .unwrap();
        assert_eq!(value.get::<i32>(), Some(&1));
    }

    // ---------------------------------------------------------------------
    // Invocation

    #[test]
    fn invoke_with_defaults_accepts_the_arity_window() {
        let mut registry = Registry::new();
        registry.register_type::<Shape>().method_with(
            "resize",
            |_: &mut Shape, w: i32, h: i32, scale: f64| f64::from(w * h) * scale,
            MemberOptions::with_defaults(vec![Variant::new(1.0f64)]),
        );
        let mut shape = Shape {
            visible: true,
            name: String::new(),
        };

        // Three arguments: everything supplied.
        let full = registry
            .invoke(
                "resize",
                InstanceMut::new(&mut shape),
                vec![
                    Variant::new(2i32),
                    Variant::new(3i32),
                    Variant::new(0.5f64),
                ],
            )
            .unwrap();
        assert_eq!(full.get::<f64>(), Some(&3.0));

        // Two arguments: the trailing default fills in.
        let defaulted = registry
            .invoke(
                "resize",
                InstanceMut::new(&mut shape),
                vec![Variant::new(2i32), Variant::new(3i32)],
            )
            .unwrap();
        assert_eq!(defaulted.get::<f64>(), Some(&6.0));

        // One argument: below the window.
        assert!(matches!(
            registry.invoke(
                "resize",
                InstanceMut::new(&mut shape),
                vec![Variant::new(2i32)],
            ),
            Err(InvokeError::NoMatchingOverload { .. })
        ));

        // Four arguments: above the window.
        assert!(matches!(
            registry.invoke(
                "resize",
                InstanceMut::new(&mut shape),
                vec![
                    Variant::new(2i32),
                    Variant::new(3i32),
                    Variant::new(1.0f64),
                    Variant::new(1.0f64),
                ],
            ),
            Err(InvokeError::NoMatchingOverload { .. })
        ));
    }

    #[test]
    fn arguments_convert_to_parameter_types() {
        let mut registry = Registry::new();
        registry
            .register_type::<Shape>()
            .method("grow", |_: &mut Shape, by: i64| by + 1);
        let mut shape = Shape {
            visible: true,
            name: String::new(),
        };

        // An i16 argument widens into the i64 parameter.
        let grown = registry
            .invoke(
                "grow",
                InstanceMut::new(&mut shape),
                vec![Variant::new(41i16)],
            )
            .unwrap();
        assert_eq!(grown.get::<i64>(), Some(&42));

        // A string argument does not.
        assert!(matches!(
            registry.invoke(
                "grow",
                InstanceMut::new(&mut shape),
                vec![Variant::new(String::from("41"))],
            ),
            Err(InvokeError::NoMatchingOverload { .. })
        ));
    }

    #[test]
    fn exact_overload_beats_convertible_and_ties_are_ambiguous() {
        let mut registry = Registry::new();
        registry
            .register_type::<Shape>()
            .method("pick", |_: &mut Shape, v: i64| v)
            .method("pick", |_: &mut Shape, _: f64| -1i64);
        let mut shape = Shape {
            visible: true,
            name: String::new(),
        };

        // i64 matches the first overload exactly.
        let exact = registry
            .invoke(
                "pick",
                InstanceMut::new(&mut shape),
                vec![Variant::new(7i64)],
            )
            .unwrap();
        assert_eq!(exact.get::<i64>(), Some(&7));

        // i16 converts into both overloads: ambiguous, nothing is guessed.
        assert!(matches!(
            registry.invoke(
                "pick",
                InstanceMut::new(&mut shape),
                vec![Variant::new(7i16)],
            ),
            Err(InvokeError::AmbiguousOverload { .. })
        ));
    }

    #[test]
    fn inherited_method_invokes_through_a_derived_instance() {
        let registry = hierarchy_registry();
        let mut derived = derived();
        let result = registry
            .invoke("describe", InstanceMut::new(&mut derived), vec![])
            .unwrap();
        assert_eq!(result.get::<i32>(), Some(&1));
    }

    #[test]
    fn unknown_method_reports_no_such_member() {
        let registry = hierarchy_registry();
        let mut derived = derived();
        assert_eq!(
            registry.invoke("vanish", InstanceMut::new(&mut derived), vec![]),
            Err(InvokeError::NoSuchMember {
                name: String::from("vanish")
            })
        );
    }

    #[test]
    fn duplicate_registration_overwrites() {
        let mut registry = Registry::new();
        registry
            .register_type::<Shape>()
            .method("answer", |_: &mut Shape| 1i32)
            .method("answer", |_: &mut Shape| 2i32);
        assert_eq!(registry.methods_of(ident_of::<Shape>()).len(), 1);

        let mut shape = Shape {
            visible: true,
            name: String::new(),
        };
        let answer = registry
            .invoke("answer", InstanceMut::new(&mut shape), vec![])
            .unwrap();
        assert_eq!(answer.get::<i32>(), Some(&2));
    }

    // ---------------------------------------------------------------------
    // Construction

    #[test]
    fn create_applies_the_wrap_policy() {
        let mut registry = Registry::new();
        registry
            .register_type::<Shape>()
            .constructor(|| Shape {
                visible: true,
                name: String::new(),
            })
            .constructor_with(
                |name: String| Shape {
                    visible: false,
                    name,
                },
                ConstructPolicy::Shared,
                MemberOptions::with_access(Access::Public),
            );

        let plain = registry.create(ident_of::<Shape>(), vec![]).unwrap();
        assert!(plain.is::<Shape>());

        let shared = registry
            .create(
                ident_of::<Shape>(),
                vec![Variant::new(String::from("disc"))],
            )
            .unwrap();
        let shared = shared.take::<Arc<Shape>>().unwrap();
        assert_eq!(shared.name, "disc");
    }

    #[test]
    fn destroy_consumes_constructed_values_of_the_type_only() {
        let mut registry = Registry::new();
        registry.register_type::<Shape>().constructor(|| Shape {
            visible: true,
            name: String::new(),
        });

        let mut value = registry.create(ident_of::<Shape>(), vec![]).unwrap();
        assert!(registry.destroy(&mut value));
        assert!(!value.is_valid());

        let mut unrelated = Variant::new(5i32);
        assert!(!registry.destroy(&mut unrelated));
        assert!(unrelated.is_valid());
    }

    #[test]
    fn create_on_an_unregistered_type_fails() {
        let registry = Registry::new();
        assert_eq!(
            registry.create(ident_of::<u8>(), vec![]),
            Err(InvokeError::NoSuchType {
                ident: ident_of::<u8>()
            })
        );
    }

    // ---------------------------------------------------------------------
    // Enumerations

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum Color {
        Red = 0,
        Green = 1,
        Blue = 2,
    }

    impl_describe!(Color => "registry_tests::Color", enumeration);
    impl_reflect_value!(Color => partial_eq, debug);

    #[test]
    fn enumeration_maps_names_and_values_both_ways() {
        let mut registry = Registry::new();
        registry
            .register_enum::<Color>(|c| *c as i64)
            .value("red", Color::Red)
            .value("green", Color::Green)
            .value("blue", Color::Blue)
            // An alias for an existing discriminant.
            .value("emerald", Color::Green);

        let table = registry.enumeration(ident_of::<Color>()).unwrap();
        assert_eq!(table.value_to_name(1), Some("green"));
        assert_eq!(table.value_to_name(99), None);
        assert_eq!(table.name_to_discriminant("blue"), Some(2));
        assert_eq!(
            table.name_to_value("green").unwrap().get::<Color>(),
            Some(&Color::Green)
        );
        assert_eq!(table.name_to_value("magenta"), None);
        // The alias is visible, but reverse lookup keeps the first name.
        assert_eq!(table.names().count(), 4);
        assert_eq!(table.value_to_name(Color::Green as i64), Some("green"));
    }

    // ---------------------------------------------------------------------
    // Conversion through the base graph

    #[test]
    fn reference_payloads_upcast_along_registered_edges() {
        let registry = hierarchy_registry();
        static DERIVED: Derived = Derived {
            base: Base { p1: 41 },
            other: Other { p2: 2 },
            p2: 3,
        };

        let mut value = Variant::new(&DERIVED);
        assert!(value.convert_in(ident_of::<&'static Base>(), &registry));
        let base = value.get::<&'static Base>().unwrap();
        assert!(core::ptr::eq(*base, &DERIVED.base));
    }

    #[derive(Clone, PartialEq, Debug)]
    struct Mid {
        base: Base,
    }

    #[derive(Clone, PartialEq, Debug)]
    struct Leaf {
        mid: Mid,
    }

    impl_describe!(Mid => "registry_tests::Mid", class);
    impl_describe!(Leaf => "registry_tests::Leaf", class);
    impl_reflect_value!(Mid => partial_eq, debug);
    impl_reflect_value!(Leaf => partial_eq, debug);
    reflect_bases!(Mid: Base => base);
    reflect_bases!(Leaf: Mid => mid);

    #[test]
    fn deeper_ancestors_list_before_nearer_ones() {
        let mut registry = Registry::new();
        registry
            .register_type::<Base>()
            .bases()
            .property_readonly("p1", |b: &Base| b.p1);
        registry
            .register_type::<Mid>()
            .bases()
            .property_readonly("mid_tag", |m: &Mid| m.base.p1);
        registry.register_type::<Leaf>().bases();

        let properties = registry.properties_of(ident_of::<Leaf>());
        let names: alloc::vec::Vec<_> = properties
            .iter()
            .map(|p| (p.name(), p.declared_in()))
            .collect();
        assert_eq!(
            names,
            [("p1", ident_of::<Base>()), ("mid_tag", ident_of::<Mid>())]
        );
    }

    #[test]
    fn reference_upcasts_compose_across_two_edges() {
        let mut registry = Registry::new();
        registry.register_bases::<Leaf>();
        static LEAF: Leaf = Leaf {
            mid: Mid {
                base: Base { p1: 8 },
            },
        };

        // No direct (Leaf, Base) conversion exists; the registry composes
        // the two registered edges.
        let mut value = Variant::new(&LEAF);
        assert!(value.convert_in(ident_of::<&'static Base>(), &registry));
        let base = value.get::<&'static Base>().unwrap();
        assert!(core::ptr::eq(*base, &LEAF.mid.base));
    }

    #[test]
    fn unrelated_reference_payloads_do_not_upcast() {
        let registry = hierarchy_registry();
        static SHAPE: Shape = Shape {
            visible: true,
            name: String::new(),
        };
        let mut value = Variant::new(&SHAPE);
        assert!(!value.convert_in(ident_of::<&'static Base>(), &registry));
        assert!(value.is::<&'static Shape>());
    }
}

