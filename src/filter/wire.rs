//! Wire format helpers shared by the filter set and the table evaluator.
//!
//! A wire filter is either an opaque system filter starting with
//! [`SYS_FILTER_MARKER`] or `"<column> <OP> <value>"`.

/// Leading character of a system filter.
pub const SYS_FILTER_MARKER: char = '#';

pub fn is_sys_filter(filter: &str) -> bool {
    filter.starts_with(SYS_FILTER_MARKER)
}

/// Split a wire filter on its first whitespace run into `(column, remainder)`.
///
/// Returns `None` when there is no remainder.
pub fn split_column(filter: &str) -> Option<(&str, &str)> {
    let (column, rest) = filter.trim().split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    if column.is_empty() || rest.is_empty() {
        None
    } else {
        Some((column, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_first_whitespace_run() {
        assert_eq!(split_column("mag > 12345"), Some(("mag", "> 12345")));
        assert_eq!(split_column("name \t IN (a, b)"), Some(("name", "IN (a, b)")));
        assert_eq!(split_column("lonely"), None);
        assert_eq!(split_column("trailing   "), None);
    }

    #[test]
    fn system_marker() {
        assert!(is_sys_filter("#bcdid IN (1,2)"));
        assert!(!is_sys_filter("bcdid IN (1,2)"));
    }
}
