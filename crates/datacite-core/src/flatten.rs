//! Serialization of nested parameter values into the DataCite query dialect.
//!
//! DataCite expresses structured constraints as `field:value` terms joined with
//! `+`, where nested fields are addressed with dotted paths:
//!
//! ```text
//! creators.nameIdentifiers.nameIdentifierScheme:ORCID+publicationYear:2016
//! ```

use crate::params::ParamValue;

/// Flatten `value` into the `field:value+field:value` dialect.
///
/// Maps contribute one term per entry, addressed by `prefix.key` (or `key` at
/// the top level). A sequence under a key expands to one term per element.
/// Scalars render as `prefix:value`, or as the bare value when `prefix` is
/// empty. Booleans are always lowercase. `Null` entries produce no term.
#[must_use]
pub fn flatten(value: &ParamValue, prefix: &str) -> String {
    match value {
        ParamValue::Map(map) => {
            let mut terms = Vec::with_capacity(map.len());

            for (key, child) in map.iter() {
                let child_prefix = if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{prefix}.{key}")
                };

                match child {
                    ParamValue::Null => {}
                    ParamValue::List(items) => terms.extend(
                        items
                            .iter()
                            .filter(|item| !item.is_null())
                            .map(|item| format!("{child_prefix}:{}", flatten(item, ""))),
                    ),
                    _ => terms.push(flatten(child, &child_prefix)),
                }
            }

            terms.retain(|term| !term.is_empty());
            terms.join("+")
        }
        ParamValue::Null => String::new(),
        leaf if prefix.is_empty() => leaf.to_string(),
        leaf => format!("{prefix}:{leaf}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param_map;

    #[test]
    fn scalar_without_prefix_is_unchanged() {
        assert_eq!(flatten(&ParamValue::from("climate change"), ""), "climate change");
        assert_eq!(flatten(&ParamValue::from(2016), ""), "2016");
    }

    #[test]
    fn scalar_with_prefix_is_tagged() {
        assert_eq!(flatten(&ParamValue::from("es"), "language"), "language:es");
    }

    #[test]
    fn booleans_are_lowercase_everywhere() {
        assert_eq!(flatten(&ParamValue::from(true), ""), "true");
        assert_eq!(flatten(&ParamValue::from(false), "flag"), "flag:false");

        let nested = ParamValue::Map(param_map! {
            "a" => param_map! { "b" => true, "c" => vec![false, true] },
        });
        let flat = flatten(&nested, "");
        assert_eq!(flat, "a.b:true+a.c:false+a.c:true");
        assert!(!flat.contains("True") && !flat.contains("False"));
    }

    #[test]
    fn nested_map_uses_dotted_paths() {
        let query = ParamValue::Map(param_map! {
            "creators" => param_map! {
                "nameIdentifiers" => param_map! { "nameIdentifierScheme" => "ORCID" },
            },
            "publicationYear" => 2016,
            "language" => "es",
        });

        assert_eq!(
            flatten(&query, ""),
            "creators.nameIdentifiers.nameIdentifierScheme:ORCID+publicationYear:2016+language:es"
        );
    }

    #[test]
    fn top_level_list_has_no_leading_dot() {
        let filter = ParamValue::Map(param_map! {
            "country_code" => vec!["tw", "hk"],
        });
        assert_eq!(flatten(&filter, ""), "country_code:tw+country_code:hk");
    }

    #[test]
    fn list_under_prefix_expands_per_element() {
        let filter = ParamValue::Map(param_map! {
            "country_code" => vec!["tw", "hk", "us"],
        });
        assert_eq!(
            flatten(&filter, "institutions"),
            "institutions.country_code:tw+institutions.country_code:hk+institutions.country_code:us"
        );
    }

    #[test]
    fn empty_and_null_maps_flatten_to_nothing() {
        assert_eq!(flatten(&ParamValue::Map(param_map! {}), ""), "");

        let all_null = ParamValue::Map(param_map! {
            "a" => ParamValue::Null,
            "b" => param_map! { "c" => ParamValue::Null },
        });
        assert_eq!(flatten(&all_null, ""), "");
    }

    #[test]
    fn null_entries_are_skipped_between_terms() {
        let query = ParamValue::Map(param_map! {
            "a" => 1,
            "b" => ParamValue::Null,
            "c" => 3,
        });
        assert_eq!(flatten(&query, ""), "a:1+c:3");
    }
}
