//! The collection store backing the in-memory driver.
//!
//! A [`DocumentStore`] maps collection names to ordered sequences of documents.
//! Collections are created on first access and keep insertion order.

use bson::Document;
use std::collections::HashMap;

type StoreMap = HashMap<String, Vec<Document>>;

/// Collection name to documents, in insertion order.
///
/// The store does no locking of its own; the driver owns it behind a single lock.
#[derive(Debug, Default, Clone)]
pub struct DocumentStore {
    collections: StoreMap,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The documents of `name`, creating an empty collection on first access.
    pub fn get(&mut self, name: &str) -> &mut Vec<Document> {
        self.collections
            .entry(name.to_string())
            .or_default()
    }

    /// The documents of `name` if the collection exists.
    pub fn peek(&self, name: &str) -> Option<&[Document]> {
        self.collections
            .get(name)
            .map(Vec::as_slice)
    }

    /// Replaces the documents of `name` wholesale.
    pub fn replace(&mut self, name: &str, documents: Vec<Document>) {
        self.collections.insert(name.to_string(), documents);
    }

    /// Empties every collection. Collection names stay registered.
    pub fn clear(&mut self) {
        for documents in self.collections.values_mut() {
            documents.clear();
        }
    }

    /// Names of all collections created so far, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names = self.collections
            .keys()
            .cloned()
            .collect::<Vec<_>>();

        names.sort();
        names
    }

    /// Total number of stored documents across collections.
    pub fn len(&self) -> usize {
        self.collections
            .values()
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
