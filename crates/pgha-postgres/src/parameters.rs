//! PostgreSQL server parameters
//!
//! Parameter names are case-insensitive in PostgreSQL, so they are folded to
//! lower case on every insertion and lookup.

use indexmap::IndexMap;
use serde::Serialize;

/// Insertion-ordered collection of server parameters
///
/// Catalog instances (mandatory, default) are shared between merges and must
/// only ever be read; [`Clone`] gives a deep copy for callers that need one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: IndexMap<String, String>,
}

impl ParameterSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value in place
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(Self::normalize(name), value.into());
    }

    /// Builder variant of [`Self::add`]
    #[inline]
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// Append values to a comma-separated list parameter such as
    /// `shared_preload_libraries`
    pub fn append_to_list(&mut self, name: &str, values: &[&str]) {
        let joined = values.join(",");
        let result = match self.get(name) {
            Some(existing) if !existing.is_empty() => {
                if joined.is_empty() {
                    existing.to_string()
                } else {
                    format!("{existing},{joined}")
                }
            }
            _ => joined,
        };
        self.add(name, result);
    }

    /// Value of a parameter
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&Self::normalize(name)).map(String::as_str)
    }

    /// Whether a parameter is set
    #[inline]
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(&Self::normalize(name))
    }

    /// Value of a parameter, or the empty string
    #[inline]
    #[must_use]
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    /// Parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Borrow the underlying map
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.values
    }

    /// Number of parameters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameters are set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn normalize(name: &str) -> String {
        name.to_lowercase()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.add(name.as_ref(), value);
        }
        set
    }
}

/// Parameter tiers merged into the HA agent's dynamic configuration
///
/// Absent tiers behave as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    /// Values that always win, even over administrator input
    pub mandatory: Option<ParameterSet>,
    /// Values used when nothing else sets the parameter
    pub default: Option<ParameterSet>,
}

impl Parameters {
    /// Create with no tiers
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With mandatory tier
    #[inline]
    #[must_use]
    pub fn with_mandatory(mut self, set: ParameterSet) -> Self {
        self.mandatory = Some(set);
        self
    }

    /// With default tier
    #[inline]
    #[must_use]
    pub fn with_default(mut self, set: ParameterSet) -> Self {
        self.default = Some(set);
        self
    }
}
