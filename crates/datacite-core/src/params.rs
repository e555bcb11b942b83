//! Mergeable query parameter model.
//!
//! A [`ParamTree`] holds every parameter accumulated by a collection query:
//! attribute filters, the `query` and `sort` expressions, the `random` flag
//! and the `page[...]` pagination controls. Values are [`ParamValue`]s, which
//! are scalars, ordered sequences, or nested ordered maps.
//!
//! Adding a parameter that already exists merges instead of overwriting:
//!
//! | existing | incoming | result                   |
//! |----------|----------|--------------------------|
//! | map      | map      | key-wise recursive merge |
//! | scalar   | list     | `[existing] + incoming`  |
//! | list     | scalar   | `existing + [incoming]`  |
//! | list     | list     | `existing + incoming`    |
//! | other    | other    | `[existing, incoming]`   |
//!
//! `Null` is the absent value: merging into `Null` yields the incoming value
//! and merging `Null` into anything leaves the existing value untouched.

use std::fmt;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamValue {
    /// Absent value; never rendered into a URL
    #[default]
    Null,
    /// Boolean, rendered as lowercase `true`/`false`
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
    /// Ordered sequence of values
    List(Vec<ParamValue>),
    /// Nested ordered mapping
    Map(ParamMap),
}

impl ParamValue {
    /// Returns true for the absent value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for values that are neither sequences nor maps.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Map(_))
    }

    /// Borrow the nested map, if this is one.
    #[must_use]
    pub const fn as_map(&self) -> Option<&ParamMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the sequence, if this is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Merge `incoming` into `self` following the module-level rules.
    pub fn merge(&mut self, incoming: ParamValue) {
        let existing = std::mem::take(self);
        *self = match (existing, incoming) {
            (existing, Self::Null) => existing,
            (Self::Null, incoming) => incoming,
            (Self::Map(mut map), Self::Map(other)) => {
                map.merge(other);
                Self::Map(map)
            }
            (Self::List(mut items), Self::List(more)) => {
                items.extend(more);
                Self::List(items)
            }
            (Self::List(mut items), incoming) => {
                items.push(incoming);
                Self::List(items)
            }
            (existing, Self::List(more)) => {
                let mut items = Vec::with_capacity(more.len() + 1);
                items.push(existing);
                items.extend(more);
                Self::List(items)
            }
            (existing, incoming) => Self::List(vec![existing, incoming]),
        };
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Map(_) => f.write_str(&crate::flatten::flatten(self, "")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

macro_rules! int_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
    }
}

impl<T> From<Option<T>> for ParamValue
where
    T: Into<ParamValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T> From<Vec<T>> for ParamValue
where
    T: Into<ParamValue>,
{
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<ParamMap> for ParamValue {
    fn from(map: ParamMap) -> Self {
        Self::Map(map)
    }
}

/// Insertion-ordered map from parameter name to value with unique keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamMap {
    entries: Vec<(String, ParamValue)>,
}

impl ParamMap {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut ParamValue> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a value, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merge a value under `key`, inserting it when the key is absent.
    pub fn merge_entry(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => slot.merge(value),
            None => self.entries.push((key, value)),
        }
    }

    /// Merge every entry of `other` into this map.
    pub fn merge(&mut self, other: ParamMap) {
        for (key, value) in other.entries {
            self.merge_entry(key, value);
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(name, _)| name == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParamMap
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for ParamMap {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Build a [`ParamMap`] from `key => value` pairs.
///
/// ```
/// use datacite_core::{param_map, ParamValue};
///
/// let query = param_map! {
///     "creators" => param_map! { "nameIdentifiers" => param_map! { "nameIdentifierScheme" => "ORCID" } },
///     "publicationYear" => 2016,
/// };
/// assert_eq!(query.get("publicationYear"), Some(&ParamValue::Int(2016)));
/// ```
#[macro_export]
macro_rules! param_map {
    () => {
        $crate::ParamMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ParamMap::new();
        $(map.insert($key, $value);)+
        map
    }};
}

/// Accumulated parameter state of a collection query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamTree {
    params: ParamMap,
}

impl ParamTree {
    /// Create an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            params: ParamMap::new(),
        }
    }

    /// Merge `value` into the tree under `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        self.params.merge_entry(name.as_str(), value);
        tracing::debug!(param = %name, params = ?self.params, "params updated");
    }

    /// Replace whatever is stored under `name`.
    ///
    /// Used for pagination controls, which carry a single current value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        self.params.insert(name.as_str(), value);
        tracing::debug!(param = %name, params = ?self.params, "params updated");
    }

    /// Look up a top-level parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Remove a top-level parameter.
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.params.remove(name)
    }

    /// Iterate over top-level parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter()
    }

    /// Returns true if no parameter is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Borrow the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &ParamMap {
        &self.params
    }
}

impl From<ParamMap> for ParamTree {
    fn from(params: ParamMap) -> Self {
        Self { params }
    }
}

impl<K, V> FromIterator<(K, V)> for ParamTree
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        for (key, value) in iter {
            tree.add(key, value);
        }
        tree
    }
}
