//! Translation of ORM filter dialect into the engine's native operators.
//!
//! The ORM speaks SQL-flavoured pattern operators (`$like`, `$ilike`) that the
//! document engine does not know. [`translate`] rewrites them into anchored
//! `$regex` operators and leaves everything else untouched.

use bson::{Bson, Document};

/// Rewrites pattern operators of `filter` into native `$regex` operators.
///
/// The input is not modified. Literal values and native operators pass through,
/// nested documents that are not operator maps are kept as sub-document
/// equality, and the filter arrays of `$and`, `$or` and `$nor` are translated
/// element by element.
pub fn translate(filter: &Document) -> Document {
    filter
        .iter()
        .map(|(key, value)| {
            let value = match (key.as_str(), value) {
                ("$and" | "$or" | "$nor", Bson::Array(filters)) => Bson::Array(
                    filters
                        .iter()
                        .map(|filter| match filter {
                            Bson::Document(filter) => Bson::Document(translate(filter)),
                            other => other.clone(),
                        })
                        .collect(),
                ),
                (_, Bson::Document(operators)) if is_operator_map(operators) => {
                    Bson::Document(translate_operators(operators))
                }
                _ => value.clone(),
            };

            (key.clone(), value)
        })
        .collect()
}

/// Converts a SQL wildcard pattern into an anchored regular expression.
///
/// `%` matches any run of characters, line breaks included; every other character
/// is matched literally.
pub fn like_to_regex(pattern: &str) -> String {
    let body = pattern
        .split('%')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    format!("(?s)^{body}$")
}

pub(crate) fn is_operator_map(document: &Document) -> bool {
    document
        .keys()
        .next()
        .is_some_and(|key| key.starts_with('$'))
}

fn translate_operators(operators: &Document) -> Document {
    let mut translated = Document::new();

    for (op, operand) in operators {
        match (op.as_str(), operand) {
            ("$like", Bson::String(pattern)) => {
                translated.insert("$regex", like_to_regex(pattern));
            }
            ("$ilike", Bson::String(pattern)) => {
                translated.insert("$regex", like_to_regex(pattern));
                translated.insert("$options", "i");
            }
            ("$not", Bson::Document(inner)) if is_operator_map(inner) => {
                translated.insert("$not", translate_operators(inner));
            }
            _ => {
                translated.insert(op.clone(), operand.clone());
            }
        }
    }

    translated
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_like_to_regex_anchors_and_escapes() {
        assert_eq!(like_to_regex("tes%"), "(?s)^tes.*$");
        assert_eq!(like_to_regex("%tes"), "(?s)^.*tes$");
        assert_eq!(like_to_regex("%tes%"), "(?s)^.*tes.*$");
        assert_eq!(like_to_regex("a.b%"), "(?s)^a\\.b.*$");
        assert_eq!(like_to_regex("exact"), "(?s)^exact$");
    }

    #[test]
    fn test_translate_replaces_like_with_regex() {
        let filter = doc! { "value": { "$like": "tes%" }, "id": 1 };

        assert_eq!(translate(&filter), doc! { "value": { "$regex": "(?s)^tes.*$" }, "id": 1 });
    }

    #[test]
    fn test_translate_keeps_sibling_operators() {
        let filter = doc! { "value": { "$like": "%x", "$ne": "ax" } };

        assert_eq!(translate(&filter), doc! { "value": { "$regex": "(?s)^.*x$", "$ne": "ax" } });
    }

    #[test]
    fn test_translate_ilike_sets_case_insensitive_option() {
        let filter = doc! { "name": { "$ilike": "al%" } };

        assert_eq!(translate(&filter), doc! { "name": { "$regex": "(?s)^al.*$", "$options": "i" } });
    }

    #[test]
    fn test_translate_passes_sub_documents_through() {
        let filter = doc! { "address": { "city": "100% Town" } };

        assert_eq!(translate(&filter), filter);
    }

    #[test]
    fn test_translate_recurses_into_logical_operators() {
        let filter = doc! { "$or": [{ "name": { "$like": "a%" } }, { "id": 2 }] };

        assert_eq!(
            translate(&filter),
            doc! { "$or": [{ "name": { "$regex": "(?s)^a.*$" } }, { "id": 2 }] },
        );
    }

    #[test]
    fn test_translate_does_not_mutate_input() {
        let filter = doc! { "value": { "$like": "tes%" } };
        let _ = translate(&filter);

        assert_eq!(filter, doc! { "value": { "$like": "tes%" } });
    }
}
