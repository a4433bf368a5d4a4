//! Per-column filter state.
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::condition::{FilterCondition, ParseError};
use super::parser::parse_conditions;

/// Description of a table column as far as filtering is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Immutable columns cannot be filtered and get no filter state.
    #[serde(default)]
    pub immutable: bool,
    /// Enumerated values, if the column only takes a fixed set.
    #[serde(default)]
    pub enums: Option<Vec<String>>,
}

fn default_visible() -> bool {
    true
}

impl ColumnDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            visible: true,
            immutable: false,
            enums: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn with_enums<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enums = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Parse status of a column's filter text.
///
/// `Empty -> Parsed -> Invalid -> Parsed`, re-evaluated on every text change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterStatus {
    #[default]
    Empty,
    Parsed,
    Invalid(ParseError),
}

impl FilterStatus {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}

/// Filter text of one column along with its parsed conditions.
///
/// Only the definition and raw text are saved; conditions and status are
/// rebuilt by parsing the text on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SavedColumn", into = "SavedColumn")]
pub struct ColumnFilterState {
    def: ColumnDef,
    raw_text: String,
    conditions: Vec<FilterCondition>,
    status: FilterStatus,
}

#[derive(Serialize, Deserialize)]
struct SavedColumn {
    #[serde(flatten)]
    def: ColumnDef,
    #[serde(default)]
    text: String,
}

impl From<SavedColumn> for ColumnFilterState {
    fn from(saved: SavedColumn) -> Self {
        let mut state = Self::new(saved.def);
        state.set_text(saved.text);
        state
    }
}

impl From<ColumnFilterState> for SavedColumn {
    fn from(state: ColumnFilterState) -> Self {
        Self {
            def: state.def,
            text: state.raw_text,
        }
    }
}

impl ColumnFilterState {
    pub fn new(def: ColumnDef) -> Self {
        Self {
            def,
            raw_text: String::new(),
            conditions: Vec::new(),
            status: FilterStatus::Empty,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn def(&self) -> &ColumnDef {
        &self.def
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn status(&self) -> &FilterStatus {
        &self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }

    pub fn is_visible(&self) -> bool {
        self.def.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.def.visible = visible;
    }

    pub fn has_text(&self) -> bool {
        !self.raw_text.trim().is_empty()
    }

    /// Replace the filter text and re-parse it.
    pub fn set_text(&mut self, text: impl Into<String>) -> &FilterStatus {
        self.raw_text = text.into();
        self.reparse()
    }

    /// Append a condition to the existing text, joined with `"; "`.
    pub fn append_text(&mut self, text: &str) -> &FilterStatus {
        if self.has_text() {
            let joined = format!("{}; {}", self.raw_text.trim(), text.trim());
            self.set_text(joined)
        } else {
            self.set_text(text.trim())
        }
    }

    /// Clear the text. Returns whether a filter was removed; whitespace does not count.
    pub fn clear(&mut self) -> bool {
        let changed = self.has_text();
        self.set_text("");
        changed
    }

    /// Parse the current text again and update the status.
    ///
    /// On failure the previous conditions are dropped so nothing stale is submitted.
    pub fn reparse(&mut self) -> &FilterStatus {
        match parse_conditions(&self.raw_text) {
            Ok(conditions) if conditions.is_empty() => {
                self.conditions = conditions;
                self.status = FilterStatus::Empty;
            }
            Ok(conditions) => {
                self.conditions = conditions;
                self.status = FilterStatus::Parsed;
            }
            Err(err) => {
                debug!(column = %self.def.name, text = %self.raw_text, error = %err, "invalid column filter");
                self.conditions.clear();
                self.status = FilterStatus::Invalid(err);
            }
        }
        &self.status
    }

    /// Wire strings for this column's conditions.
    pub fn serialized(&self) -> Vec<String> {
        self.conditions
            .iter()
            .map(|c| c.serialize(&self.def.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::condition::FilterOp;
    use pretty_assertions::assert_eq;

    #[test]
    fn state_machine_transitions() {
        let mut state = ColumnFilterState::new(ColumnDef::new("mag"));
        assert_eq!(state.status(), &FilterStatus::Empty);

        assert_eq!(state.set_text("> 5"), &FilterStatus::Parsed);
        assert_eq!(state.conditions(), &[FilterCondition::scalar(FilterOp::Gt, "5")]);

        assert_eq!(
            state.set_text("> "),
            &FilterStatus::Invalid(ParseError::MissingValue(FilterOp::Gt))
        );
        assert!(state.conditions().is_empty());
        assert!(!state.is_valid());

        assert_eq!(state.set_text("> 6"), &FilterStatus::Parsed);
        assert!(state.is_valid());

        assert!(state.clear());
        assert_eq!(state.status(), &FilterStatus::Empty);
        assert!(!state.clear());
    }

    #[test]
    fn append_joins_with_semicolon() {
        let mut state = ColumnFilterState::new(ColumnDef::new("mag"));
        state.append_text("> 100");
        state.append_text("< 200");
        assert_eq!(state.raw_text(), "> 100; < 200");
        assert_eq!(state.serialized(), vec!["mag > 100", "mag < 200"]);
    }

    #[test]
    fn whitespace_only_text_is_not_a_filter_to_clear() {
        let mut state = ColumnFilterState::new(ColumnDef::new("mag"));
        state.set_text("   ");
        assert_eq!(state.status(), &FilterStatus::Empty);
        assert!(!state.clear());
        assert_eq!(state.raw_text(), "");
    }

    #[test]
    fn saved_state_reparses_on_load() {
        let mut state = ColumnFilterState::new(ColumnDef::new("mag").hidden());
        state.set_text("> ");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "mag",
                "title": null,
                "visible": false,
                "immutable": false,
                "enums": null,
                "text": "> ",
            })
        );

        let loaded: ColumnFilterState = serde_json::from_value(json).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.status(), &FilterStatus::Invalid(ParseError::MissingValue(FilterOp::Gt)));
    }

    #[test]
    fn column_def_deserializes_with_defaults() {
        let def: ColumnDef = serde_json::from_str(r#"{"name": "band"}"#).unwrap();
        assert_eq!(def, ColumnDef::new("band"));
    }
}
