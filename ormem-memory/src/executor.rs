//! Query execution over a single collection.
//!
//! Every operation scans the whole collection with a compiled [`FilterMatcher`];
//! there are no indexes. Reads sort, then skip `offset`, then take `limit`.

use std::cmp::Ordering;
use bson::{Bson, Document};

use ormem_core::{
    metadata::EntityMetadata,
    query::{FindOptions, OrderBy, QueryResult, SortDirection},
};

use crate::evaluator::{Comparable, FilterMatcher, lookup};

/// Returns the matching documents, sorted, then offset, then limited.
///
/// Without sort keys the storage order is kept. The sort is stable, so documents
/// that tie on every key keep their relative storage order.
pub fn find_all(documents: &[Document], matcher: &FilterMatcher, options: &FindOptions) -> Vec<Document> {
    let mut matched = documents
        .iter()
        .filter(|doc| matcher.matches(doc))
        .collect::<Vec<_>>();

    if !options.order_by.is_empty() {
        matched.sort_by(|a, b| compare_documents(a, b, &options.order_by));
    }

    matched
        .into_iter()
        .skip(options.offset.unwrap_or(0))
        .take(options.effective_limit().unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

/// Returns the first document [`find_all`] would return, or `None`.
pub fn find_first(documents: &[Document], matcher: &FilterMatcher, options: &FindOptions) -> Option<Document> {
    let options = FindOptions { limit: Some(1), ..options.clone() };

    find_all(documents, matcher, &options)
        .into_iter()
        .next()
}

/// Counts the matching documents.
pub fn count(documents: &[Document], matcher: &FilterMatcher) -> usize {
    documents
        .iter()
        .filter(|doc| matcher.matches(doc))
        .count()
}

/// Merges `patch` into every matching document in place.
///
/// Patch fields overwrite existing ones; other fields are left untouched.
/// Primary keys are not re-checked for uniqueness.
pub fn update_matching(
    documents: &mut [Document],
    matcher: &FilterMatcher,
    patch: &Document,
    metadata: &EntityMetadata,
) -> QueryResult {
    let mut keys = Vec::new();

    for doc in documents.iter_mut().filter(|doc| matcher.matches(doc)) {
        for (field, value) in patch {
            doc.insert(field.clone(), value.clone());
        }

        keys.push(metadata.primary_key_value(doc));
    }

    QueryResult::from_keys(keys)
}

/// Splits `documents` into the ones that survive and the result of removing the rest.
///
/// The match set is computed before anything is removed.
pub fn delete_matching(
    documents: Vec<Document>,
    matcher: &FilterMatcher,
    metadata: &EntityMetadata,
) -> (Vec<Document>, QueryResult) {
    let (removed, kept): (Vec<_>, Vec<_>) = documents
        .into_iter()
        .partition(|doc| matcher.matches(doc));

    let keys = removed
        .iter()
        .map(|doc| metadata.primary_key_value(doc))
        .collect::<Vec<Option<Bson>>>();

    (kept, QueryResult::from_keys(keys))
}

/// Compares two documents by successive sort keys.
///
/// Missing fields sort as null; values of different types order by type class.
pub(crate) fn compare_documents(a: &Document, b: &Document, order_by: &[OrderBy]) -> Ordering {
    order_by
        .iter()
        .fold(Ordering::Equal, |ordering, key| {
            ordering.then_with(|| {
                let left = Comparable::from(lookup(a, &key.field));
                let right = Comparable::from(lookup(b, &key.field));

                match key.direction {
                    SortDirection::Asc => left.sort_cmp(&right),
                    SortDirection::Desc => right.sort_cmp(&left),
                }
            })
        })
}
