//! The filter set of one table view: per-column filters, system filters and
//! filters on columns the view does not have.
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::column::{ColumnDef, ColumnFilterState, FilterStatus};
use super::condition::{ConditionValue, FilterOp};
use super::wire::{is_sys_filter, split_column};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    columns: Vec<ColumnFilterState>,
    #[serde(default)]
    sys_filters: Vec<String>,
    #[serde(default)]
    hidden_filters: Vec<String>,
}

impl FilterSet {
    /// Create a filter set for the given columns. Immutable columns are skipped.
    pub fn new(columns: &[ColumnDef]) -> Self {
        Self {
            columns: build_states(columns),
            sys_filters: Vec::new(),
            hidden_filters: Vec::new(),
        }
    }

    /// Replace the column list, carrying existing filters over.
    ///
    /// Text of a column that goes away becomes a hidden filter; a hidden filter
    /// whose column appears moves into that column.
    pub fn set_columns(&mut self, columns: &[ColumnDef]) {
        let mut carried: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.has_text())
            .map(|c| format!("{} {}", c.name(), c.raw_text().trim()))
            .collect();
        carried.append(&mut self.hidden_filters);
        self.columns = build_states(columns);
        self.set_filters(carried);
    }

    pub fn columns(&self) -> &[ColumnFilterState] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnFilterState> {
        self.columns.iter().find(|c| c.name() == name)
    }

    fn column_mut(&mut self, name: &str) -> Option<&mut ColumnFilterState> {
        self.columns.iter_mut().find(|c| c.name() == name)
    }

    pub fn sys_filters(&self) -> &[String] {
        &self.sys_filters
    }

    pub fn hidden_filters(&self) -> &[String] {
        &self.hidden_filters
    }

    /// Set a column's raw filter text. Returns `None` for an unknown column.
    pub fn set_column_text(&mut self, name: &str, text: impl Into<String>) -> Option<&FilterStatus> {
        let column = self.column_mut(name)?;
        Some(column.set_text(text))
    }

    /// Toggle a column's visibility. Returns `false` for an unknown column.
    pub fn set_column_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.column_mut(name) {
            Some(column) => {
                column.set_visible(visible);
                true
            }
            None => false,
        }
    }

    /// Merge wire filters into the set.
    ///
    /// System filters are kept verbatim. Other filters are appended to their
    /// column's text, or kept verbatim as hidden filters when the column is
    /// unknown. Existing state is not cleared; see [`FilterSet::replace_filters`].
    pub fn set_filters<I, S>(&mut self, filters: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for filter in filters {
            let filter = filter.as_ref();
            if is_sys_filter(filter) {
                self.sys_filters.push(filter.to_string());
                continue;
            }
            let Some((name, remainder)) = split_column(filter) else {
                warn!(filter, "dropping filter without a condition");
                continue;
            };
            match self.column_mut(name) {
                Some(column) => {
                    column.append_text(remainder);
                }
                None => {
                    debug!(filter, "no such column, keeping as hidden filter");
                    self.hidden_filters.push(filter.to_string());
                }
            }
        }
    }

    /// Clear all state, then [`FilterSet::set_filters`].
    pub fn replace_filters<I, S>(&mut self, filters: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear();
        self.set_filters(filters);
    }

    /// Remove every column's text and both filter lists.
    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
        self.sys_filters.clear();
        self.hidden_filters.clear();
    }

    /// Re-parse every non-empty column. All failures are marked; checking does not stop early.
    pub fn validate_filters(&mut self) -> bool {
        let mut valid = true;
        for column in self.columns.iter_mut().filter(|c| c.has_text()) {
            if !column.reparse().is_valid() {
                valid = false;
            }
        }
        valid
    }

    /// Names of the columns currently marked invalid.
    pub fn invalid_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.is_valid())
            .map(|c| c.name())
            .collect()
    }

    /// The wire list to submit, or `None` when any column fails validation.
    ///
    /// Column conditions come first in column order, then hidden filters, then
    /// system filters when requested.
    pub fn get_filters(&mut self, include_sys_filters: bool) -> Option<Vec<String>> {
        if !self.validate_filters() {
            debug!(invalid = ?self.invalid_columns(), "filter validation failed");
            return None;
        }
        let mut filters: Vec<String> = self
            .columns
            .iter()
            .flat_map(ColumnFilterState::serialized)
            .collect();
        filters.extend(self.hidden_filters.iter().cloned());
        if include_sys_filters {
            filters.extend(self.sys_filters.iter().cloned());
        }
        Some(filters)
    }

    /// Clear the text of invisible columns. Returns whether anything changed.
    pub fn clear_hidden_filters(&mut self) -> bool {
        let mut changed = false;
        for column in self.columns.iter_mut().filter(|c| !c.is_visible()) {
            if column.clear() {
                debug!(column = column.name(), "cleared filter on invisible column");
                changed = true;
            }
        }
        changed
    }

    /// Number of parsed column conditions plus hidden and system filters.
    ///
    /// Invalid columns hold no conditions and add nothing.
    pub fn num_filters(&self) -> usize {
        let column_count: usize = self.columns.iter().map(|c| c.conditions().len()).sum();
        column_count + self.hidden_filters.len() + self.sys_filters.len()
    }

    /// Set an enumerated column's text from a selection of its values.
    ///
    /// No value clears the filter, one value becomes `= v`, more become `IN (a,b)`.
    /// Values outside the column's enumeration are ignored.
    pub fn set_enum_selection<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> Option<&FilterStatus> {
        let column = self.column_mut(name)?;
        let selected: Vec<&str> = values
            .iter()
            .map(|v| v.as_ref().trim())
            .filter(|v| !v.is_empty())
            .filter(|v| {
                column
                    .def()
                    .enums
                    .as_ref()
                    .is_none_or(|enums| enums.iter().any(|e| e.as_str() == *v))
            })
            .collect();
        let text = match selected.as_slice() {
            [] => String::new(),
            [single] => format!("= {single}"),
            many => format!("IN ({})", many.join(",")),
        };
        Some(column.set_text(text))
    }

    /// The selected values of a column whose text is a single `=` or `IN` condition.
    pub fn enum_selection(&self, name: &str) -> Option<Vec<String>> {
        let column = self.column(name)?;
        match column.conditions() {
            [] => Some(Vec::new()),
            [cond] => match (&cond.op, &cond.value) {
                (FilterOp::Eq, ConditionValue::Scalar(v)) => Some(vec![v.clone()]),
                (FilterOp::In, ConditionValue::List(items)) => Some(items.clone()),
                _ => None,
            },
            _ => None,
        }
    }
}

fn build_states(columns: &[ColumnDef]) -> Vec<ColumnFilterState> {
    columns
        .iter()
        .filter(|def| !def.immutable)
        .cloned()
        .map(ColumnFilterState::new)
        .collect()
}
