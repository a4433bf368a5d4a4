pub mod table_filter_service;

pub use table_filter_service::{ColumnFilter, FilterError, RowFilter, TableFilterService};
