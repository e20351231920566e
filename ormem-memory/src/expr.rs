//! Native filter expressions of the in-memory engine.
//!
//! Filter documents are parsed once into an [`Expr`] tree. Parsing validates every
//! operator and compiles regular expressions, so evaluating the tree against a
//! document cannot fail.
//!
//! Supported vocabulary:
//!
//! - Top level: `$and`, `$or`, `$nor` (each a non-empty array of filters)
//! - Field level: `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`,
//!   `$all`, `$size`, `$exists`, `$regex` (with `$options`), `$not`

use bson::{Bson, Document};
use regex::{Regex, RegexBuilder};

use ormem_core::error::{DriverError, DriverResult};

use crate::translate::is_operator_map;

/// Field comparison operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to. Arrays match when any element is equal.
    Eq,
    /// Not equal to. Also matches missing fields.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Equal to any of the listed values.
    In,
    /// Equal to none of the listed values.
    Nin,
    /// Array containing every listed value.
    All,
    /// Array of exactly this length.
    Size,
}

/// A compiled filter expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match). Empty matches everything.
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression (inverts the result).
    Not(Box<Expr>),
    /// Checks if a field exists or doesn't exist.
    Exists(String, bool),
    /// Field comparison expression.
    Field {
        /// The field path to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
    /// Regular expression match on a string field.
    Regex {
        field: String,
        pattern: Regex,
    },
}

impl Expr {
    /// Parses a native filter document.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidQuery`] for unknown operators, malformed
    /// operands and regular expressions that fail to compile.
    pub fn parse(filter: &Document) -> DriverResult<Expr> {
        let mut exprs = Vec::with_capacity(filter.len());

        for (key, value) in filter {
            exprs.push(match key.as_str() {
                "$and" => Expr::And(Self::parse_all(key, value)?),
                "$or" => Expr::Or(Self::parse_all(key, value)?),
                "$nor" => Expr::Or(Self::parse_all(key, value)?).not(),
                op if op.starts_with('$') => {
                    return Err(DriverError::InvalidQuery(format!("unknown top-level operator {op}")));
                }
                field => Self::parse_field(field, value)?,
            });
        }

        Ok(Self::conjunction(exprs))
    }

    /// Negates this expression (logical NOT).
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    fn conjunction(mut exprs: Vec<Expr>) -> Expr {
        if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Expr::And(exprs)
        }
    }

    fn parse_all(op: &str, value: &Bson) -> DriverResult<Vec<Expr>> {
        match value {
            Bson::Array(filters) if !filters.is_empty() => filters
                .iter()
                .map(|filter| match filter {
                    Bson::Document(filter) => Self::parse(filter),
                    other => Err(DriverError::InvalidQuery(format!(
                        "{op} entries must be documents, got {:?}",
                        other.element_type(),
                    ))),
                })
                .collect(),
            _ => Err(DriverError::InvalidQuery(format!("{op} requires a non-empty array"))),
        }
    }

    fn parse_field(field: &str, value: &Bson) -> DriverResult<Expr> {
        match value {
            Bson::Document(operators) if is_operator_map(operators) => {
                Self::parse_operators(field, operators)
            }
            literal => Ok(Expr::Field {
                field: field.to_string(),
                op: FieldOp::Eq,
                value: literal.clone(),
            }),
        }
    }

    fn parse_operators(field: &str, operators: &Document) -> DriverResult<Expr> {
        let options = match operators.get("$options") {
            None => None,
            Some(Bson::String(options)) if operators.contains_key("$regex") => Some(options.as_str()),
            Some(_) => {
                return Err(DriverError::InvalidQuery(format!(
                    "$options on field {field} must be a string next to $regex",
                )));
            }
        };

        let mut exprs = Vec::with_capacity(operators.len());

        for (op, operand) in operators {
            let field_expr = |op: FieldOp| Expr::Field {
                field: field.to_string(),
                op,
                value: operand.clone(),
            };

            exprs.push(match op.as_str() {
                "$eq" => field_expr(FieldOp::Eq),
                "$ne" => field_expr(FieldOp::Ne),
                "$gt" => field_expr(FieldOp::Gt),
                "$gte" => field_expr(FieldOp::Gte),
                "$lt" => field_expr(FieldOp::Lt),
                "$lte" => field_expr(FieldOp::Lte),
                "$in" | "$nin" | "$all" => {
                    if !matches!(operand, Bson::Array(_)) {
                        return Err(DriverError::InvalidQuery(format!("{op} on field {field} requires an array")));
                    }

                    field_expr(match op.as_str() {
                        "$in" => FieldOp::In,
                        "$nin" => FieldOp::Nin,
                        _ => FieldOp::All,
                    })
                }
                "$size" => {
                    if as_integer(operand).is_none_or(|size| size < 0) {
                        return Err(DriverError::InvalidQuery(format!(
                            "$size on field {field} requires a non-negative integer",
                        )));
                    }

                    field_expr(FieldOp::Size)
                }
                "$exists" => Expr::Exists(field.to_string(), is_truthy(operand)),
                "$regex" => Expr::Regex {
                    field: field.to_string(),
                    pattern: compile_regex(field, operand, options)?,
                },
                "$options" => continue,
                "$not" => match operand {
                    Bson::Document(inner) if is_operator_map(inner) => {
                        Self::parse_operators(field, inner)?.not()
                    }
                    _ => {
                        return Err(DriverError::InvalidQuery(format!(
                            "$not on field {field} requires an operator document",
                        )));
                    }
                },
                other => {
                    return Err(DriverError::InvalidQuery(format!("unknown operator {other} on field {field}")));
                }
            });
        }

        Ok(Self::conjunction(exprs))
    }
}

/// Integral value of a numeric operand.
pub(crate) fn as_integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(value) => Some(i64::from(*value)),
        Bson::Int64(value) => Some(*value),
        Bson::Double(value) if value.fract() == 0.0 => Some(*value as i64),
        _ => None,
    }
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(value) => *value,
        Bson::Null | Bson::Undefined => false,
        Bson::Int32(value) => *value != 0,
        Bson::Int64(value) => *value != 0,
        Bson::Double(value) => *value != 0.0,
        _ => true,
    }
}

fn compile_regex(field: &str, operand: &Bson, options: Option<&str>) -> DriverResult<Regex> {
    let Bson::String(pattern) = operand else {
        return Err(DriverError::InvalidQuery(format!("$regex on field {field} requires a string")));
    };
    let options = options.unwrap_or_default();

    RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .ignore_whitespace(options.contains('x'))
        .build()
        .map_err(|e| {
            log::error!("Invalid regex pattern '{}' on field {}: {}", pattern, field, e);
            DriverError::InvalidQuery(format!("invalid regex on field {field}: {e}"))
        })
}

/// A visitor over compiled expressions.
pub trait QueryVisitor {
    type Output;
    type Error;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_regex(&mut self, field: &str, pattern: &Regex) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
            Expr::Regex { field, pattern } => self.visit_regex(field, pattern),
        }
    }
}
