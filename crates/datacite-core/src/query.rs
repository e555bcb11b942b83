//! Query-string assembly for collection URLs.
//!
//! Turns a [`ParamTree`] into the `key=value&key=value` string DataCite
//! expects. The dialect parameters (`filter`, `query`, `sort`, `random`) are
//! flattened and passed through unescaped so `:` and `+` keep their structural
//! meaning. Everything else is percent-encoded.

use crate::flatten::flatten;
use crate::params::{ParamTree, ParamValue};
use url::form_urlencoded;

/// Parameters serialized with the `field:value+field:value` dialect.
pub const DIALECT_PARAMS: [&str; 4] = ["filter", "query", "sort", "random"];

/// Builder for assembling encoded query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Encode every non-null parameter of the tree, in insertion order.
    #[must_use]
    pub fn from_tree(tree: &ParamTree) -> Self {
        let mut params = Self::new();
        for (name, value) in tree.iter() {
            params.push_value(name, value);
        }
        params
    }

    /// Append a parameter, skipping `Null` and values that encode to nothing.
    pub fn push_value(&mut self, name: &str, value: &ParamValue) {
        if let Some(encoded) = encode_value(name, value) {
            self.pairs.push((name.to_string(), encoded));
        }
    }

    /// Join the pairs into `key=value&key=value`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Percent-encode a single token, with `+` for spaces.
#[must_use]
pub fn quote(token: &str) -> String {
    form_urlencoded::byte_serialize(token.as_bytes()).collect()
}

fn encode_value(name: &str, value: &ParamValue) -> Option<String> {
    let encoded = match value {
        ParamValue::Null => return None,
        ParamValue::List(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| quote(&item.to_string()))
            .collect::<Vec<_>>()
            .join(","),
        ParamValue::Map(_) => flatten(value, ""),
        _ if DIALECT_PARAMS.contains(&name) => flatten(value, ""),
        scalar => quote(&scalar.to_string()),
    };

    (!encoded.is_empty()).then_some(encoded)
}

/// Combine a collection URL with the encoded parameters of `tree`.
///
/// Returns `base_url` untouched when nothing is left to encode. The output is
/// a pure function of the tree's contents and insertion order.
#[must_use]
pub fn build_url(base_url: &str, tree: &ParamTree) -> String {
    let params = QueryParams::from_tree(tree);
    if params.is_empty() {
        return base_url.to_string();
    }
    format!("{base_url}?{}", params.to_query_string())
}
