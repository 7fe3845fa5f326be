// ── Filter sets ──
//
// A FilterSet always holds every key its entity type recognizes. Keys that
// carry no constraint hold the `ALL` sentinel. The same set drives both the
// remote query string and the local fallback predicate.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sentinel meaning "no constraint on this key".
pub const ALL: &str = "ALL";

/// Key used for free-text search across several fields.
pub const SEARCH: &str = "search";

static UNCONSTRAINED: FilterValue = FilterValue::All;

/// One filter value: either the `ALL` sentinel or a concrete value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterValue {
    #[default]
    All,
    Is(String),
}

impl FilterValue {
    /// Blank input and any casing of `ALL` mean "no constraint".
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Is(trimmed.to_owned())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The concrete value, or `None` for `ALL`.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Is(v) => Some(v),
        }
    }

    pub fn as_str(&self) -> &str {
        self.value().unwrap_or(ALL)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FilterValue {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for FilterValue {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<FilterValue> for String {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::All => ALL.to_owned(),
            FilterValue::Is(v) => v,
        }
    }
}

/// Complete mapping of recognized filter keys to values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    values: IndexMap<String, FilterValue>,
}

impl FilterSet {
    /// A set with every key unconstrained.
    pub fn new(keys: &[&str]) -> Self {
        Self {
            values: keys
                .iter()
                .map(|k| ((*k).to_owned(), FilterValue::All))
                .collect(),
        }
    }

    /// Rebuild a set from query pairs. Unknown keys are ignored, missing
    /// keys read as `ALL`.
    pub fn from_query<'a, I>(keys: &[&str], pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut set = Self::new(keys);
        for (key, value) in pairs {
            set.set(key, value);
        }
        set
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn recognizes(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Value for `key`; missing keys read as `ALL`.
    pub fn get(&self, key: &str) -> &FilterValue {
        self.values.get(key).unwrap_or(&UNCONSTRAINED)
    }

    /// Concrete value for `key`, `None` when unconstrained.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).value()
    }

    /// Set one key. Returns `false` (and changes nothing) for a key this
    /// set does not recognize.
    pub fn set(&mut self, key: &str, value: impl Into<FilterValue>) -> bool {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Copy of this set with `changes` applied on top.
    #[must_use]
    pub fn merged<'a, I>(&self, changes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, FilterValue)>,
    {
        let mut next = self.clone();
        for (key, value) in changes {
            next.set(key, value);
        }
        next
    }

    /// Put every key back to `ALL`.
    pub fn reset(&mut self) {
        for value in self.values.values_mut() {
            *value = FilterValue::All;
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.values.values().all(FilterValue::is_all)
    }

    /// Query parameters for the list endpoint: one pair per constrained key.
    pub fn to_query(&self) -> Vec<(&str, String)> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.value().map(|v| (k.as_str(), v.to_owned())))
            .collect()
    }

    /// Stable identity of this set, used to skip redundant fetches.
    pub fn signature(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    // ── Predicates ───────────────────────────────────────────────────

    /// Case-insensitive equality against an enumerated key.
    pub fn accepts(&self, key: &str, candidate: &str) -> bool {
        match self.value(key) {
            None => true,
            Some(wanted) => wanted.to_lowercase() == candidate.to_lowercase(),
        }
    }

    /// Like [`accepts`](Self::accepts) for optional fields; an absent
    /// field only passes an unconstrained key.
    pub fn accepts_opt(&self, key: &str, candidate: Option<&str>) -> bool {
        match self.value(key) {
            None => true,
            Some(_) => candidate.is_some_and(|c| self.accepts(key, c)),
        }
    }

    /// Case-insensitive substring match of the `search` key across `fields`.
    pub fn search_hits(&self, fields: &[&str]) -> bool {
        match self.value(SEARCH) {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                fields.iter().any(|f| f.to_lowercase().contains(&needle))
            }
        }
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
