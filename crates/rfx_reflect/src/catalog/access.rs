use alloc::vec::Vec;
use core::fmt;

use crate::Variant;
use crate::ident::TypeIdent;

// -----------------------------------------------------------------------------
// Access

/// Access level recorded with every catalog member.
///
/// Purely informational metadata — the catalog enforces nothing; consumers
/// (serializers, editors, bindings) filter on it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.pad("public"),
            Self::Protected => f.pad("protected"),
            Self::Private => f.pad("private"),
        }
    }
}

// -----------------------------------------------------------------------------
// MetaMap

/// Key/value metadata attached to a type or member, in registration order.
///
/// Small and linear: metadata sets have a handful of entries, and
/// registration order is part of the contract.
#[derive(Clone, Default)]
pub struct MetaMap {
    entries: Vec<(&'static str, Variant)>,
}

impl MetaMap {
    /// Creates an empty map.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts a value, replacing an existing entry with the same key.
    pub fn insert(&mut self, key: &'static str, value: Variant) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Iterates entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Variant)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MetaMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(&'static str, Variant)> for MetaMap {
    fn from_iter<I: IntoIterator<Item = (&'static str, Variant)>>(iter: I) -> Self {
        let mut map = MetaMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

// -----------------------------------------------------------------------------
// ParamInfo

/// One parameter of a method or constructor.
#[derive(Clone)]
pub struct ParamInfo {
    name: Option<&'static str>,
    ty: TypeIdent,
    default: Option<Variant>,
}

impl ParamInfo {
    #[inline]
    pub(crate) fn new(
        name: Option<&'static str>,
        ty: TypeIdent,
        default: Option<Variant>,
    ) -> Self {
        Self { name, ty, default }
    }

    /// The parameter name, when one was registered.
    #[inline]
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Identity of the parameter type.
    #[inline]
    pub fn ty(&self) -> TypeIdent {
        self.ty
    }

    /// The registered default value, when one exists.
    #[inline]
    pub fn default(&self) -> Option<&Variant> {
        self.default.as_ref()
    }
}

impl fmt::Debug for ParamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamInfo")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// MemberOptions

/// Optional registration details of a member: access level, parameter
/// names, trailing default values, metadata.
///
/// Defaults apply to the *last* `defaults.len()` parameters; anything else
/// is a registration error and panics at registration time.
#[derive(Default)]
pub struct MemberOptions {
    /// Access tag, [`Access::Public`] unless said otherwise.
    pub access: Access,
    /// Names for the leading parameters; may be shorter than the
    /// parameter list.
    pub param_names: Vec<&'static str>,
    /// Default values for the trailing parameters.
    pub defaults: Vec<Variant>,
    /// Member metadata, inserted in order.
    pub meta: Vec<(&'static str, Variant)>,
}

impl MemberOptions {
    /// Options with just an access tag.
    pub fn with_access(access: Access) -> Self {
        Self {
            access,
            ..Self::default()
        }
    }

    /// Options with just trailing defaults.
    pub fn with_defaults(defaults: Vec<Variant>) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }
}

// Shared by method and constructor registration: pairs the adapter's
// parameter idents with names and trailing defaults, validating both.
pub(crate) fn build_params(
    idents: Vec<TypeIdent>,
    param_names: &[&'static str],
    defaults: Vec<Variant>,
) -> Vec<ParamInfo> {
    assert!(
        param_names.len() <= idents.len(),
        "more parameter names ({}) than parameters ({})",
        param_names.len(),
        idents.len(),
    );
    assert!(
        defaults.len() <= idents.len(),
        "more default values ({}) than parameters ({})",
        defaults.len(),
        idents.len(),
    );
    let first_default = idents.len() - defaults.len();
    let mut defaults = defaults.into_iter();
    idents
        .into_iter()
        .enumerate()
        .map(|(index, ty)| {
            let default = if index >= first_default {
                let value = defaults.next().expect("one default per trailing parameter");
                assert!(
                    value.type_ident() == Some(ty),
                    "default value for parameter {index} is not of the parameter type",
                );
                Some(value)
            } else {
                None
            };
            ParamInfo::new(param_names.get(index).copied(), ty, default)
        })
        .collect()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{MetaMap, build_params};
    use crate::Variant;
    use crate::ident::ident_of;

    #[test]
    fn meta_map_replaces_by_key() {
        let mut meta = MetaMap::new();
        meta.insert("unit", Variant::new(1i32));
        meta.insert("unit", Variant::new(2i32));
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get("unit").unwrap().get::<i32>(), Some(&2));
        assert!(meta.get("missing").is_none());
    }

    #[test]
    fn defaults_attach_to_trailing_parameters() {
        let params = build_params(
            alloc::vec![ident_of::<i32>(), ident_of::<bool>()],
            &["count"],
            alloc::vec![Variant::new(true)],
        );
        assert_eq!(params[0].name(), Some("count"));
        assert!(params[0].default().is_none());
        assert!(params[1].default().is_some());
    }

    #[test]
    #[should_panic(expected = "not of the parameter type")]
    fn mistyped_default_is_rejected() {
        build_params(
            alloc::vec![ident_of::<i32>()],
            &[],
            alloc::vec![Variant::new("five".to_string())],
        );
    }
}
