//! Evaluation of wire filters against table data
//!
//! This module applies the filter list produced by [`FilterSet::get_filters`]
//! to rows held in memory or to a polars `DataFrame`, with the same matching
//! rules the query service uses.
//!
//! [`FilterSet::get_filters`]: crate::filter::FilterSet::get_filters

use std::cmp::Ordering;
use std::collections::BTreeMap;

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::filter::{ConditionValue, FilterCondition, FilterOp, ParseError, SYS_FILTER_MARKER};
use crate::filter::{parse_conditions, split_column};

/// Errors raised while compiling or applying filters
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("malformed filter '{0}'")]
    MalformedFilter(String),
    #[error("invalid condition in filter '{filter}': {source}")]
    InvalidCondition {
        filter: String,
        #[source]
        source: ParseError,
    },
    #[error("filter '{0}' must contain exactly one condition")]
    MultipleConditions(String),
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// A single compiled wire filter
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    /// Column the filter applies to
    pub column: String,
    /// The parsed condition
    pub condition: FilterCondition,
    /// Lower-cased comparison value; `null` compares as empty
    compare_to: String,
    /// Lower-cased `IN` items with quotes removed
    in_list: Vec<String>,
}

impl ColumnFilter {
    pub fn new(column: impl Into<String>, condition: FilterCondition) -> Self {
        let compare_to = match &condition.value {
            ConditionValue::Scalar(v) => normalize_cell(Some(v.as_str())),
            ConditionValue::List(_) => String::new(),
        };
        let in_list = match &condition.value {
            ConditionValue::List(items) => items
                .iter()
                .map(|item| item.trim_matches(|c| c == '"' || c == '\'').trim().to_lowercase())
                .collect(),
            ConditionValue::Scalar(_) => Vec::new(),
        };
        Self {
            column: column.into(),
            condition,
            compare_to,
            in_list,
        }
    }

    /// Compile one wire filter. A leading system-filter marker is stripped.
    pub fn from_wire(filter: &str) -> Result<Self, FilterError> {
        let body = filter.strip_prefix(SYS_FILTER_MARKER).unwrap_or(filter);
        let (column, remainder) =
            split_column(body).ok_or_else(|| FilterError::MalformedFilter(filter.to_string()))?;
        let mut conditions =
            parse_conditions(remainder).map_err(|source| FilterError::InvalidCondition {
                filter: filter.to_string(),
                source,
            })?;
        if conditions.len() != 1 {
            return Err(FilterError::MultipleConditions(filter.to_string()));
        }
        Ok(Self::new(column, conditions.remove(0)))
    }

    /// Test a single cell value. Missing cells and `null` compare as empty.
    pub fn matches_value(&self, cell: Option<&str>) -> bool {
        let cell = normalize_cell(cell);
        match self.condition.op {
            FilterOp::Like => cell.contains(&self.compare_to),
            FilterOp::In => self.in_list.iter().any(|item| *item == cell),
            op => compare(&cell, &self.compare_to).is_some_and(|ord| ordering_matches(op, ord)),
        }
    }

    /// Test a row given as column name to cell text
    pub fn matches_row(&self, row: &BTreeMap<String, String>) -> bool {
        self.matches_value(row.get(&self.column).map(String::as_str))
    }

    /// Create a boolean mask for this filter over a DataFrame
    pub fn create_mask(&self, df: &DataFrame) -> Result<BooleanChunked, FilterError> {
        let column = df
            .column(&self.column)
            .map_err(|_| FilterError::UnknownColumn(self.column.clone()))?;
        let as_text = column.cast(&DataType::String)?;
        let values = as_text.str()?;
        let mask: Vec<bool> = values.into_iter().map(|v| self.matches_value(v)).collect();
        Ok(BooleanChunked::from_slice(self.column.as_str().into(), &mask))
    }
}

/// Conjunction of compiled filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub filters: Vec<ColumnFilter>,
}

impl RowFilter {
    /// Compile a wire list. The first bad filter aborts compilation.
    pub fn from_wire<I, S>(filters: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filters = filters
            .into_iter()
            .map(|f| ColumnFilter::from_wire(f.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { filters })
    }

    pub fn matches_row(&self, row: &BTreeMap<String, String>) -> bool {
        self.filters.iter().all(|f| f.matches_row(row))
    }

    pub fn create_mask(&self, df: &DataFrame) -> Result<BooleanChunked, FilterError> {
        let mut mask = BooleanChunked::full("mask".into(), true, df.height());
        for filter in &self.filters {
            mask = mask & filter.create_mask(df)?;
        }
        Ok(mask)
    }
}

/// Service for applying filter lists to table data
pub struct TableFilterService;

impl TableFilterService {
    /// Keep the rows of `df` that pass every filter
    pub fn filter_dataframe<S: AsRef<str>>(df: &DataFrame, filters: &[S]) -> Result<DataFrame, FilterError> {
        let row_filter = RowFilter::from_wire(filters)?;
        if row_filter.filters.is_empty() {
            return Ok(df.clone());
        }
        let mask = row_filter.create_mask(df)?;
        let filtered = df.filter(&mask)?;
        debug!(before = df.height(), after = filtered.height(), "applied table filters");
        Ok(filtered)
    }

    /// Keep the rows that pass every filter
    pub fn filter_rows<'a, S: AsRef<str>>(
        rows: &'a [BTreeMap<String, String>],
        filters: &[S],
    ) -> Result<Vec<&'a BTreeMap<String, String>>, FilterError> {
        let row_filter = RowFilter::from_wire(filters)?;
        Ok(rows.iter().filter(|row| row_filter.matches_row(row)).collect())
    }
}

fn normalize_cell(cell: Option<&str>) -> String {
    match cell {
        Some(v) if !v.trim().eq_ignore_ascii_case("null") => v.trim().to_lowercase(),
        _ => String::new(),
    }
}

/// Numeric when both sides parse as numbers, otherwise string order.
///
/// Against a numeric target an empty cell reads as `0`.
fn compare(cell: &str, target: &str) -> Option<Ordering> {
    let Ok(target_num) = target.parse::<f64>() else {
        return Some(cell.cmp(target));
    };
    let cell_num = if cell.is_empty() { Ok(0.0) } else { cell.parse::<f64>() };
    match cell_num {
        Ok(value) => value.partial_cmp(&target_num),
        Err(_) => Some(cell.cmp(target)),
    }
}

fn ordering_matches(op: FilterOp, ord: Ordering) -> bool {
    match op {
        FilterOp::Eq => ord == Ordering::Equal,
        FilterOp::Ne => ord != Ordering::Equal,
        FilterOp::Lt => ord == Ordering::Less,
        FilterOp::Le => ord != Ordering::Greater,
        FilterOp::Gt => ord == Ordering::Greater,
        FilterOp::Ge => ord != Ordering::Less,
        FilterOp::Like | FilterOp::In => false,
    }
}
