use alloc::vec::Vec;
use core::fmt;

use crate::catalog::{Constructor, Destructor, Enumeration, MetaMap, Method, Property};
use crate::ident::TypeIdent;

// -----------------------------------------------------------------------------
// TypeCatalog

/// One type's registered members, each list in registration order.
///
/// The catalog stores a type's *own* members only; the registry merges
/// inherited members in when queried, walking the base graph.
///
/// Registering a member whose (name, signature) already exists replaces
/// the earlier record — one policy, applied to every member kind.
pub struct TypeCatalog {
    ty: TypeIdent,
    constructors: Vec<Constructor>,
    destructor: Option<Destructor>,
    methods: Vec<Method>,
    properties: Vec<Property>,
    enumeration: Option<Enumeration>,
    meta: MetaMap,
}

impl TypeCatalog {
    pub(crate) fn new(ty: TypeIdent) -> Self {
        Self {
            ty,
            constructors: Vec::new(),
            destructor: None,
            methods: Vec::new(),
            properties: Vec::new(),
            enumeration: None,
            meta: MetaMap::new(),
        }
    }

    /// Identity of the cataloged type.
    #[inline]
    pub fn ty(&self) -> TypeIdent {
        self.ty
    }

    /// The registered constructors.
    #[inline]
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// The registered destructor, if any.
    #[inline]
    pub fn destructor(&self) -> Option<&Destructor> {
        self.destructor.as_ref()
    }

    /// The type's own methods.
    #[inline]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// The type's own properties.
    #[inline]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// The enumeration table, when the type registered one.
    #[inline]
    pub fn enumeration(&self) -> Option<&Enumeration> {
        self.enumeration.as_ref()
    }

    /// The type-level metadata.
    #[inline]
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    // Replace-on-duplicate mutators, used by the registrar.

    pub(crate) fn push_method(&mut self, method: Method) {
        match self
            .methods
            .iter_mut()
            .find(|m| m.name() == method.name() && m.same_signature(method.params()))
        {
            Some(slot) => *slot = method,
            None => self.methods.push(method),
        }
    }

    pub(crate) fn push_property(&mut self, property: Property) {
        match self
            .properties
            .iter_mut()
            .find(|p| p.name() == property.name())
        {
            Some(slot) => *slot = property,
            None => self.properties.push(property),
        }
    }

    pub(crate) fn push_constructor(&mut self, constructor: Constructor) {
        match self
            .constructors
            .iter_mut()
            .find(|c| c.same_signature(constructor.params()))
        {
            Some(slot) => *slot = constructor,
            None => self.constructors.push(constructor),
        }
    }

    pub(crate) fn ensure_destructor(&mut self, destructor: Destructor) {
        if self.destructor.is_none() {
            self.destructor = Some(destructor);
        }
    }

    pub(crate) fn enumeration_mut(&mut self) -> &mut Enumeration {
        let ty = self.ty;
        self.enumeration.get_or_insert_with(|| Enumeration::new(ty))
    }

    pub(crate) fn meta_mut(&mut self) -> &mut MetaMap {
        &mut self.meta
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("ty", &self.ty)
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .field("properties", &self.properties.len())
            .field("enumeration", &self.enumeration.is_some())
            .finish()
    }
}
