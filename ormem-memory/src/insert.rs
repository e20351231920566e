//! The insert pipeline: primary-key uniqueness, default filling, append.

use bson::{Bson, Document};
use chrono::{DateTime, Utc};

use ormem_core::{
    error::{DriverError, DriverResult},
    metadata::{DefaultRule, EntityMetadata},
    query::QueryResult,
};

use crate::evaluator::FilterMatcher;

/// Inserts documents of one entity into its collection.
#[derive(Debug, Clone, Copy)]
pub struct InsertPipeline<'a> {
    metadata: &'a EntityMetadata,
}

impl<'a> InsertPipeline<'a> {
    pub fn new(metadata: &'a EntityMetadata) -> Self {
        Self { metadata }
    }

    /// Checks the primary key of `data`, fills its defaults and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::DuplicateKey`] if a stored document has the same
    /// primary key. `documents` is left untouched in that case.
    pub fn insert(&self, documents: &mut Vec<Document>, data: Document) -> DriverResult<QueryResult> {
        self.insert_at(documents, data, Utc::now())
    }

    pub(crate) fn insert_at(
        &self,
        documents: &mut Vec<Document>,
        mut data: Document,
        now: DateTime<Utc>,
    ) -> DriverResult<QueryResult> {
        let key = self.metadata.primary_key_filter(&data);
        let matcher = FilterMatcher::compile(&key)?;

        if documents.iter().any(|doc| matcher.matches(doc)) {
            log::warn!(
                "Rejected insert into {}: duplicate key {}",
                self.metadata.name,
                key,
            );

            return Err(DriverError::DuplicateKey(key.to_string(), self.metadata.name.clone()));
        }

        self.fill_defaults(&mut data, now);

        let insert_id = self.metadata.primary_key_value(&data);
        documents.push(data);

        Ok(QueryResult::from_keys(vec![insert_id]))
    }

    /// Injects default values for fields that are absent or null.
    fn fill_defaults(&self, data: &mut Document, now: DateTime<Utc>) {
        for (field, rule) in self.metadata.defaults() {
            if !matches!(data.get(field), None | Some(Bson::Null)) {
                continue;
            }

            let value = match rule {
                DefaultRule::CurrentTimestamp => Bson::DateTime(bson::DateTime::from_chrono(now)),
            };

            data.insert(field, value);
        }
    }
}
