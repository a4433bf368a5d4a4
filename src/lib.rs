pub mod config;
pub mod filter;
pub mod logging;
pub mod services;

// Re-export commonly used types
pub use filter::{ColumnDef, FilterCondition, FilterOp, FilterSet, FilterStatus, ParseError};
pub use services::{FilterError, TableFilterService};
