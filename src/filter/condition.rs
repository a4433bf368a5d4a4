//! Filter conditions: the `(operator, value)` pairs extracted from a column's filter text.
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Comparison operator of a single condition.
///
/// `Display` yields the wire spelling; `FromStr` accepts the wire spelling plus
/// the `!=` alias, and is case-insensitive for `LIKE` / `IN`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum FilterOp {
    #[strum(to_string = "=")]
    Eq,
    #[strum(to_string = "!", serialize = "!=")]
    Ne,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = "<=")]
    Le,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = ">=")]
    Ge,
    #[strum(to_string = "LIKE")]
    Like,
    #[strum(to_string = "IN")]
    In,
}

/// Reasons a column's filter text fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("operator '{0}' is missing a value")]
    MissingValue(FilterOp),
    #[error("operator '{second}' follows '{first}' without a value in between")]
    ConsecutiveOperators { first: FilterOp, second: FilterOp },
    #[error("empty value for operator '{0}'")]
    EmptyValue(FilterOp),
    #[error("IN requires at least one value")]
    EmptyList,
    #[error("IN list contains an empty item")]
    EmptyListItem,
    #[error("no condition found")]
    NoConditions,
}

/// Right-hand side of a condition. `IN` always carries a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionValue {
    Scalar(String),
    List(Vec<String>),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => write!(f, "{value}"),
            Self::List(items) => write!(f, "({})", items.join(",")),
        }
    }
}

/// One parsed condition. Displays as `"<OP> <value>"`, the column-less half of a wire filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub op: FilterOp,
    pub value: ConditionValue,
}

impl FilterCondition {
    /// Build a condition from an operator and its raw value text.
    ///
    /// `None` infers the operator: `IN` when the value contains a comma, `LIKE` otherwise.
    /// `IN` values are normalized into a list whether or not they were parenthesized.
    pub fn new(op: Option<FilterOp>, raw_value: &str) -> Result<Self, ParseError> {
        let raw_value = raw_value.trim();
        let op = op.unwrap_or(if raw_value.contains(',') {
            FilterOp::In
        } else {
            FilterOp::Like
        });
        if raw_value.is_empty() {
            return Err(ParseError::EmptyValue(op));
        }
        let value = if op == FilterOp::In {
            ConditionValue::List(parse_list(raw_value)?)
        } else {
            ConditionValue::Scalar(raw_value.to_string())
        };
        Ok(Self { op, value })
    }

    /// Scalar condition; no normalization is applied.
    pub fn scalar(op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            op,
            value: ConditionValue::Scalar(value.into()),
        }
    }

    /// `IN` condition over the given items.
    pub fn in_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            op: FilterOp::In,
            value: ConditionValue::List(items.into_iter().map(Into::into).collect()),
        }
    }

    /// Wire form for the given column: `"<column> <OP> <value>"`.
    pub fn serialize(&self, column: &str) -> String {
        format!("{column} {self}")
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.value)
    }
}

fn parse_list(raw: &str) -> Result<Vec<String>, ParseError> {
    let inner = match raw.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => inner.trim(),
        None => raw,
    };
    if inner.is_empty() {
        return Err(ParseError::EmptyList);
    }
    inner
        .split(',')
        .map(|item| {
            let item = item.trim();
            if item.is_empty() {
                Err(ParseError::EmptyListItem)
            } else {
                Ok(item.to_string())
            }
        })
        .collect()
}
