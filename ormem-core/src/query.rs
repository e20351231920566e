//! Filter and find-option vocabulary shared by drivers and the ORM facade.
//!
//! Filters are plain BSON documents in query-by-example form: a field mapped to a
//! literal means equality, a field mapped to an operator document applies those
//! operators, and top-level keys combine with an implicit AND.
//!
//! ```ignore
//! use ormem_core::query::{Filter, FindOptions, SortDirection};
//!
//! let filter = Filter::and([
//!     Filter::eq("status", "active"),
//!     Filter::like("name", "Al%"),
//! ]);
//!
//! let options = FindOptions::builder()
//!     .order_by("created_at", SortDirection::Desc)
//!     .limit(10)
//!     .build();
//! ```
//!
//! # Filter Expression API
//!
//! The [`Filter`] struct builds filter documents:
//!
//! - Comparison: `eq`, `ne`, `gt`, `gte`, `lt`, `lte`
//! - Pattern: `like`, `ilike`, `regex`
//! - Existence: `exists`, `not_exists`
//! - Membership: `any_of`, `none_of`
//! - Logical: `and`, `or`, `nor`

use bson::{Bson, Document, doc};
use std::fmt;

/// A query-by-example filter document.
pub type FilterQuery = Document;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    #[default]
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

impl SortDirection {
    /// Parses a direction token such as `"ASC"`, `"desc"` or `"desc nulls last"`.
    ///
    /// Matching is case-insensitive and by prefix. Unrecognized tokens sort ascending.
    pub fn parse(token: &str) -> Self {
        let token = token.trim().to_ascii_lowercase();

        if token.starts_with("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

impl From<&str> for SortDirection {
    fn from(token: &str) -> Self {
        SortDirection::parse(token)
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// One sort key of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: impl Into<SortDirection>) -> Self {
        Self { field: field.into(), direction: direction.into() }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Execution options for reads.
///
/// Sort keys are applied first (the first key is the primary key), then `offset`,
/// then `limit`. A `limit` of zero means unbounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
    /// Number of documents to skip.
    pub offset: Option<usize>,
    /// Sort keys in priority order.
    pub order_by: Vec<OrderBy>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder for fluent construction.
    pub fn builder() -> FindOptionsBuilder {
        FindOptionsBuilder::new()
    }

    /// The effective limit, with zero treated as absent.
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|limit| *limit > 0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FindOptionsBuilder {
    options: FindOptions,
}

impl FindOptionsBuilder {
    pub fn new() -> Self {
        FindOptionsBuilder { options: FindOptions::default() }
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// Sets the number of documents to skip.
    pub fn offset(mut self, offset: usize) -> Self {
        self.options.offset = Some(offset);
        self
    }

    /// Appends a sort key. Keys added first take priority.
    ///
    /// `direction` accepts a [`SortDirection`] or a token such as `"DESC"`.
    pub fn order_by(mut self, field: impl Into<String>, direction: impl Into<SortDirection>) -> Self {
        self.options.order_by.push(OrderBy::new(field, direction));
        self
    }

    pub fn build(self) -> FindOptions {
        self.options
    }
}

/// The outcome of a write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Number of documents inserted, updated or removed.
    pub affected_rows: usize,
    /// Primary key of the inserted document, or of the first affected one.
    pub insert_id: Option<Bson>,
    /// Primary keys of every affected document, in storage order.
    pub inserted_ids: Vec<Bson>,
}

impl QueryResult {
    /// Builds a result from the primary keys of the affected documents.
    ///
    /// `keys` holds one entry per affected document; documents without a
    /// resolvable key still count towards `affected_rows`.
    pub fn from_keys(keys: Vec<Option<Bson>>) -> Self {
        QueryResult {
            affected_rows: keys.len(),
            insert_id: keys.first().cloned().flatten(),
            inserted_ids: keys.into_iter().flatten().collect(),
        }
    }
}

/// Helper struct for constructing filter documents.
///
/// Every method returns a [`FilterQuery`]; combine them with [`Filter::and`],
/// [`Filter::or`] and [`Filter::nor`].
pub struct Filter;

impl Filter {
    /// Matches every document.
    pub fn all() -> FilterQuery {
        Document::new()
    }

    /// Matches documents where the field equals the value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> FilterQuery {
        let mut filter = Document::new();
        filter.insert(field.into(), value.into());
        filter
    }

    /// Matches documents where the field does not equal the value.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> FilterQuery {
        Self::op(field, "$ne", value)
    }

    /// Matches documents where the field is greater than the value.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> FilterQuery {
        Self::op(field, "$gt", value)
    }

    /// Matches documents where the field is greater than or equal to the value.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> FilterQuery {
        Self::op(field, "$gte", value)
    }

    /// Matches documents where the field is less than the value.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> FilterQuery {
        Self::op(field, "$lt", value)
    }

    /// Matches documents where the field is less than or equal to the value.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> FilterQuery {
        Self::op(field, "$lte", value)
    }

    /// Matches documents where the field matches a SQL wildcard pattern (`%` = any run of characters).
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> FilterQuery {
        Self::op(field, "$like", pattern.into())
    }

    /// Case-insensitive variant of [`Filter::like`].
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> FilterQuery {
        Self::op(field, "$ilike", pattern.into())
    }

    /// Matches documents where the string field matches a regular expression.
    pub fn regex(field: impl Into<String>, pattern: impl Into<String>) -> FilterQuery {
        Self::op(field, "$regex", pattern.into())
    }

    /// Matches documents where the field is present.
    pub fn exists(field: impl Into<String>) -> FilterQuery {
        Self::op(field, "$exists", true)
    }

    /// Matches documents where the field is absent.
    pub fn not_exists(field: impl Into<String>) -> FilterQuery {
        Self::op(field, "$exists", false)
    }

    /// Matches documents where the field equals any of the values.
    pub fn any_of<V: Into<Bson>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> FilterQuery {
        Self::op(field, "$in", Self::array(values))
    }

    /// Matches documents where the field equals none of the values.
    pub fn none_of<V: Into<Bson>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> FilterQuery {
        Self::op(field, "$nin", Self::array(values))
    }

    /// Matches documents satisfying every filter.
    pub fn and(filters: impl IntoIterator<Item = FilterQuery>) -> FilterQuery {
        doc! { "$and": Self::array(filters) }
    }

    /// Matches documents satisfying at least one filter.
    pub fn or(filters: impl IntoIterator<Item = FilterQuery>) -> FilterQuery {
        doc! { "$or": Self::array(filters) }
    }

    /// Matches documents satisfying none of the filters.
    pub fn nor(filters: impl IntoIterator<Item = FilterQuery>) -> FilterQuery {
        doc! { "$nor": Self::array(filters) }
    }

    fn op(field: impl Into<String>, op: &str, value: impl Into<Bson>) -> FilterQuery {
        let mut operators = Document::new();
        operators.insert(op, value.into());
        Self::eq(field, operators)
    }

    fn array<V: Into<Bson>>(values: impl IntoIterator<Item = V>) -> Bson {
        Bson::Array(values.into_iter().map(Into::into).collect())
    }
}
