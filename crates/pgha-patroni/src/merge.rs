//! Tiered merging of administrator input with built-in settings
//!
//! Administrator input is untyped. Every lookup goes through [`Input`], so a
//! value of the wrong shape is handled exactly like a missing one: it falls
//! through to the next tier. Nothing here fails.
//!
//! Catalog tiers are borrowed and only ever cloned from.

use pgha_postgres::{HBAs, HostBasedAuthentication, Parameters};
use serde_json::{Map, Number, Value as JsonValue};

/// Mapping type of every merged section
pub type JsonMap = Map<String, JsonValue>;

/// Shape of one administrator-supplied value
///
/// JSON `null` is [`Input::Absent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input<'a> {
    /// Missing or null
    Absent,
    /// `true` / `false`
    Boolean(bool),
    /// Any number
    Number(&'a Number),
    /// Text
    String(&'a str),
    /// List
    Sequence(&'a [JsonValue]),
    /// Object
    Mapping(&'a JsonMap),
}

impl<'a> Input<'a> {
    /// Classify an optional value
    #[must_use]
    pub fn of(value: Option<&'a JsonValue>) -> Self {
        match value {
            None | Some(JsonValue::Null) => Self::Absent,
            Some(JsonValue::Bool(b)) => Self::Boolean(*b),
            Some(JsonValue::Number(n)) => Self::Number(n),
            Some(JsonValue::String(s)) => Self::String(s),
            Some(JsonValue::Array(items)) => Self::Sequence(items),
            Some(JsonValue::Object(map)) => Self::Mapping(map),
        }
    }

    /// The mapping, or `None` for every other shape
    #[must_use]
    pub fn mapping(self) -> Option<&'a JsonMap> {
        match self {
            Self::Mapping(map) => Some(map),
            Self::Absent
            | Self::Boolean(_)
            | Self::Number(_)
            | Self::String(_)
            | Self::Sequence(_) => None,
        }
    }

    /// The sequence, or `None` for every other shape
    #[must_use]
    pub fn sequence(self) -> Option<&'a [JsonValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            Self::Absent
            | Self::Boolean(_)
            | Self::Number(_)
            | Self::String(_)
            | Self::Mapping(_) => None,
        }
    }

    /// Whether this input is [`Input::Absent`]
    #[inline]
    #[must_use]
    pub fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Look up `key` in an optional section and expect a mapping there
///
/// Wrong shapes are logged and treated as absent.
#[must_use]
pub fn section<'a>(parent: Option<&'a JsonMap>, key: &str) -> Option<&'a JsonMap> {
    let input = Input::of(parent.and_then(|map| map.get(key)));
    let mapping = input.mapping();
    if mapping.is_none() && !input.is_absent() {
        tracing::debug!(key, "ignoring section that is not a mapping");
    }
    mapping
}

/// Shape a known setting accepts from administrator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Anything but absent
    Any,
    /// `true` / `false`
    Boolean,
    /// Whole number
    Integer,
    /// Text
    String,
    /// List
    Sequence,
    /// Object
    Mapping,
}

impl Shape {
    /// Whether `input` has this shape
    #[must_use]
    pub fn accepts(self, input: Input<'_>) -> bool {
        match input {
            Input::Absent => false,
            Input::Boolean(_) => matches!(self, Self::Any | Self::Boolean),
            Input::Number(n) => {
                matches!(self, Self::Any) || (self == Self::Integer && (n.is_i64() || n.is_u64()))
            }
            Input::String(_) => matches!(self, Self::Any | Self::String),
            Input::Sequence(_) => matches!(self, Self::Any | Self::Sequence),
            Input::Mapping(_) => matches!(self, Self::Any | Self::Mapping),
        }
    }
}

/// One known setting and its non-input tiers
///
/// Resolution order: mandatory, derived from the cluster, administrator input of the
/// right [`Shape`], fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting<'a> {
    name: &'a str,
    shape: Shape,
    mandatory: Option<JsonValue>,
    derived: Option<JsonValue>,
    fallback: Option<JsonValue>,
}

impl<'a> Setting<'a> {
    /// Create setting with no tiers besides input
    #[must_use]
    pub fn new(name: &'a str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            mandatory: None,
            derived: None,
            fallback: None,
        }
    }

    /// Value that always wins
    #[must_use]
    pub fn mandatory(mut self, value: impl Into<JsonValue>) -> Self {
        self.mandatory = Some(value.into());
        self
    }

    /// Value computed from the cluster specification, when the specification
    /// sets one
    #[must_use]
    pub fn derived<V: Into<JsonValue>>(mut self, value: Option<V>) -> Self {
        self.derived = value.map(Into::into);
        self
    }

    /// Fallback value
    #[must_use]
    pub fn fallback(mut self, value: impl Into<JsonValue>) -> Self {
        self.fallback = Some(value.into());
        self
    }

    /// Setting name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    fn resolve(&self, input: Option<&JsonMap>) -> Option<JsonValue> {
        if let Some(value) = self.mandatory.as_ref().or(self.derived.as_ref()) {
            return Some(value.clone());
        }

        let given = Input::of(input.and_then(|map| map.get(self.name)));
        if self.shape.accepts(given) {
            return input.and_then(|map| map.get(self.name)).cloned();
        }
        if !given.is_absent() {
            tracing::debug!(setting = self.name, "ignoring value of unexpected shape");
        }

        self.fallback.clone()
    }
}

/// Merges the scalar settings of one section
///
/// Keys the merger does not know pass through from input unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarMerger<'a> {
    settings: Vec<Setting<'a>>,
}

impl<'a> ScalarMerger<'a> {
    /// Create merger with no known settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a known setting
    #[must_use]
    pub fn with(mut self, setting: Setting<'a>) -> Self {
        self.settings.push(setting);
        self
    }

    /// Merge `input` (the section as given by the administrator, if it was a
    /// mapping) with the known settings
    #[must_use]
    pub fn merge(&self, input: Option<&JsonMap>) -> JsonMap {
        let mut result = input.cloned().unwrap_or_default();
        for setting in &self.settings {
            match setting.resolve(input) {
                Some(value) => {
                    result.insert(setting.name.to_string(), value);
                }
                None => {
                    result.remove(setting.name);
                }
            }
        }
        result
    }
}

/// Merges parameter tiers: default, then input, then mandatory
#[derive(Debug, Clone, Copy)]
pub struct ParameterSetMerger<'a> {
    parameters: &'a Parameters,
}

impl<'a> ParameterSetMerger<'a> {
    /// Create merger over the given catalogs
    #[inline]
    #[must_use]
    pub fn new(parameters: &'a Parameters) -> Self {
        Self { parameters }
    }

    /// Merge administrator input found at the parameters location
    ///
    /// Input values of any shape pass through; input that is not a mapping is
    /// discarded entirely. Input names are folded to lower case like catalog
    /// names, so a mandatory value cannot be bypassed by letter case. When
    /// input names differ only in case, the lexically last one wins.
    #[must_use]
    pub fn merge(&self, input: Option<&JsonValue>) -> JsonMap {
        let mut result = JsonMap::new();

        if let Some(defaults) = &self.parameters.default {
            for (name, value) in defaults.iter() {
                result.insert(name.to_string(), JsonValue::from(value));
            }
        }

        let given = Input::of(input);
        match given.mapping() {
            Some(map) => {
                for (name, value) in map {
                    result.insert(name.to_lowercase(), value.clone());
                }
            }
            None if !given.is_absent() => {
                tracing::debug!("ignoring parameters that are not a mapping");
            }
            None => {}
        }

        if let Some(mandatory) = &self.parameters.mandatory {
            for (name, value) in mandatory.iter() {
                result.insert(name.to_string(), JsonValue::from(value));
            }
        }

        result
    }
}

/// Composes the ordered `pg_hba` list
#[derive(Debug, Clone, Copy)]
pub struct RuleListComposer<'a> {
    hbas: &'a HBAs,
}

impl<'a> RuleListComposer<'a> {
    /// Create composer over the given catalogs
    #[inline]
    #[must_use]
    pub fn new(hbas: &'a HBAs) -> Self {
        Self { hbas }
    }

    /// Mandatory rules, followed by the administrator's rules when they gave
    /// a list (even an empty one), otherwise by the default rules
    ///
    /// Administrator rules are already rendered; elements that are not
    /// strings are skipped.
    #[must_use]
    pub fn compose(&self, input: Option<&JsonValue>) -> Vec<String> {
        let mut rules = render_rules(&self.hbas.mandatory);

        let given = Input::of(input);
        match given.sequence() {
            Some(items) => {
                for item in items {
                    match Input::of(Some(item)) {
                        Input::String(rule) => rules.push(rule.to_string()),
                        Input::Absent
                        | Input::Boolean(_)
                        | Input::Number(_)
                        | Input::Sequence(_)
                        | Input::Mapping(_) => {
                            tracing::debug!("ignoring pg_hba entry that is not a string");
                        }
                    }
                }
            }
            None => {
                if !given.is_absent() {
                    tracing::debug!("ignoring pg_hba that is not a list");
                }
                rules.extend(render_rules(&self.hbas.default));
            }
        }

        rules
    }
}

/// Render catalog rules, dropping incomplete ones
fn render_rules(rules: &[HostBasedAuthentication]) -> Vec<String> {
    rules
        .iter()
        .map(ToString::to_string)
        .filter(|rule| {
            if rule.is_empty() {
                tracing::debug!("skipping incomplete pg_hba rule");
            }
            !rule.is_empty()
        })
        .collect()
}
