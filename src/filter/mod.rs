//! Per-column table filters: parsing, validation and the wire list sent with a query.
pub mod column;
pub mod condition;
pub mod parser;
pub mod set;
pub mod wire;

pub use column::{ColumnDef, ColumnFilterState, FilterStatus};
pub use condition::{ConditionValue, FilterCondition, FilterOp, ParseError};
pub use parser::{CONDITION_HELP, parse_conditions};
pub use set::FilterSet;
pub use wire::{SYS_FILTER_MARKER, is_sys_filter, split_column};
