//! Expression evaluation for in-memory document filtering and sorting.
//!
//! This module provides the evaluation engine for compiled [`Expr`] trees, plus
//! the cross-type value ordering used when sorting query results.

use std::{collections::HashMap, cmp::Ordering, convert::Infallible};
use bson::{Bson, Document, datetime::DateTime};
use regex::Regex;

use ormem_core::{error::DriverResult, query::FilterQuery};

use crate::{
    expr::{Expr, FieldOp, QueryVisitor, as_integer},
    translate::translate,
};

/// Type-erased, comparable representation of BSON values.
///
/// Integers keep their exact value; only a comparison between an integer and a
/// double looks at both as real numbers, so `Int32(1)`, `Int64(1)` and
/// `Double(1.0)` compare equal while distinct large `Int64` values never do.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value, also used for missing fields
    Null,
    /// Boolean value
    Bool(bool),
    /// Int32 or Int64 value
    Int(i64),
    /// Double value
    Double(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Any other BSON value, compared structurally
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null | Bson::Undefined => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(i64::from(*value)),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Double(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> From<Option<&'a Bson>> for Comparable<'a> {
    fn from(bson: Option<&'a Bson>) -> Self {
        bson.map_or(Comparable::Null, Comparable::from)
    }
}

/// 2^63 as a double; the first value past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Exact ordering of an integer against a double, `None` for NaN.
fn cmp_int_double(int: i64, double: f64) -> Option<Ordering> {
    if double.is_nan() {
        return None;
    }
    if double >= I64_BOUND {
        return Some(Ordering::Less);
    }
    if double < -I64_BOUND {
        return Some(Ordering::Greater);
    }

    let whole = double.trunc();

    Some(int.cmp(&(whole as i64)).then_with(|| {
        0.0_f64.partial_cmp(&(double - whole)).unwrap_or(Ordering::Equal)
    }))
}

impl<'a> Comparable<'a> {
    /// Position of this value's type class in the cross-type sort order.
    fn type_rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Int(_) | Comparable::Double(_) => 1,
            Comparable::String(_) => 2,
            Comparable::Map(_) => 3,
            Comparable::Array(_) => 4,
            Comparable::Bool(_) => 5,
            Comparable::DateTime(_) => 6,
            Comparable::Other(_) => 7,
        }
    }

    fn is_nan(&self) -> bool {
        matches!(self, Comparable::Double(value) if value.is_nan())
    }

    /// Numeric ordering across integer and double, `None` if either side is NaN
    /// or not a number.
    fn cmp_numbers(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Int(a), Comparable::Int(b)) => Some(a.cmp(b)),
            (Comparable::Double(a), Comparable::Double(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Double(b)) => cmp_int_double(*a, *b),
            (Comparable::Double(a), Comparable::Int(b)) => cmp_int_double(*b, *a).map(Ordering::reverse),
            _ => None,
        }
    }

    /// Total order used for sorting.
    ///
    /// Values of different type classes order by class. NaN sorts below every
    /// other number, arrays compare element by element, documents compare by
    /// their sorted keys and values, and other BSON values by element type.
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        self.type_rank()
            .cmp(&other.type_rank())
            .then_with(|| self.sort_cmp_same_class(other))
    }

    fn sort_cmp_same_class(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Array(a), Comparable::Array(b)) => a
                .iter()
                .zip(b)
                .map(|(a, b)| a.sort_cmp(b))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Comparable::Map(a), Comparable::Map(b)) => {
                let mut a = a.iter().collect::<Vec<_>>();
                let mut b = b.iter().collect::<Vec<_>>();
                a.sort_by(|x, y| x.0.cmp(y.0));
                b.sort_by(|x, y| x.0.cmp(y.0));

                a.iter()
                    .zip(&b)
                    .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| va.sort_cmp(vb)))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or_else(|| a.len().cmp(&b.len()))
            }
            (Comparable::Other(a), Comparable::Other(b)) => {
                (a.element_type() as u8).cmp(&(b.element_type() as u8)).then_with(|| match (a, b) {
                    (Bson::ObjectId(a), Bson::ObjectId(b)) => a.cmp(b),
                    _ => Ordering::Equal,
                })
            }
            _ => match (self.is_nan(), other.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
            },
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => self.cmp_numbers(other) == Some(Ordering::Equal),
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => self.cmp_numbers(other),
        }
    }
}

/// Resolves a field path against a document.
///
/// A key containing dots is first looked up verbatim; otherwise each segment
/// descends into a sub-document, or into an array by numeric index.
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    if let Some(value) = document.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            Bson::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> bool {
        match self.visit_expr(expr) {
            Ok(matched) => matched,
            Err(never) => match never {},
        }
    }

    /// Equality with array-any semantics; a null literal matches a missing field.
    fn equals(found: Option<&Bson>, value: &Bson) -> bool {
        let Some(found) = found else {
            return matches!(value, Bson::Null | Bson::Undefined);
        };
        let target = Comparable::from(value);

        match Comparable::from(found) {
            Comparable::Array(items) => {
                items.iter().any(|item| item == &target) || Comparable::Array(items) == target
            }
            found => found == target,
        }
    }

    fn compare(found: Option<&Bson>, op: &FieldOp, value: &Bson) -> bool {
        let Some(found) = found else {
            return false;
        };
        let target = Comparable::from(value);
        let satisfies = |candidate: &Comparable<'_>| match candidate.partial_cmp(&target) {
            Some(ordering) => match op {
                FieldOp::Gt => ordering == Ordering::Greater,
                FieldOp::Gte => ordering != Ordering::Less,
                FieldOp::Lt => ordering == Ordering::Less,
                FieldOp::Lte => ordering != Ordering::Greater,
                _ => false,
            },
            None => false,
        };

        match Comparable::from(found) {
            Comparable::Array(items) => items.iter().any(satisfies),
            found => satisfies(&found),
        }
    }

    fn contains_any(found: Option<&Bson>, values: &Bson) -> bool {
        match values {
            Bson::Array(values) => values.iter().any(|value| Self::equals(found, value)),
            _ => false,
        }
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = Infallible;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(lookup(self.document, field).is_some() == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let found = lookup(self.document, field);

        Ok(match op {
            FieldOp::Eq => Self::equals(found, value),
            FieldOp::Ne => !Self::equals(found, value),
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => Self::compare(found, op, value),
            FieldOp::In => Self::contains_any(found, value),
            FieldOp::Nin => !Self::contains_any(found, value),
            FieldOp::All => match (found, value) {
                (Some(Bson::Array(_)), Bson::Array(values)) if !values.is_empty() => {
                    values.iter().all(|value| Self::equals(found, value))
                }
                _ => false,
            },
            FieldOp::Size => match (found, as_integer(value)) {
                (Some(Bson::Array(items)), Some(size)) => items.len() as i64 == size,
                _ => false,
            },
        })
    }

    fn visit_regex(&mut self, field: &str, pattern: &Regex) -> Result<Self::Output, Self::Error> {
        Ok(match lookup(self.document, field) {
            Some(Bson::String(value)) => pattern.is_match(value),
            Some(Bson::Array(items)) => items
                .iter()
                .any(|item| matches!(item, Bson::String(value) if pattern.is_match(value))),
            _ => false,
        })
    }
}

/// A filter compiled for repeated evaluation.
///
/// Compiling translates the ORM dialect (`$like`, `$ilike`) and parses the result
/// into an [`Expr`] tree, so every operator error surfaces before any document is
/// looked at.
#[derive(Debug, Clone)]
pub struct FilterMatcher {
    expr: Expr,
}

impl FilterMatcher {
    /// Translates and parses `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidQuery`](ormem_core::error::DriverError::InvalidQuery) if the filter uses an unknown operator,
    /// a malformed operand or an invalid regular expression.
    pub fn compile(filter: &FilterQuery) -> DriverResult<Self> {
        Ok(Self { expr: Expr::parse(&translate(filter))? })
    }

    /// Whether `document` satisfies the filter.
    pub fn matches(&self, document: &Document) -> bool {
        DocumentEvaluator::new(document).evaluate(&self.expr)
    }
}
