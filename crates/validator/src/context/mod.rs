//! Run state
//!
//! - [`ValidationContext`] — one per validated value: the subject, its path,
//!   run options, the accumulated messages and the fatal-failure slot.
//! - [`PropertyContext`] — one per field within a parent context while its
//!   rule chain executes.
//!
//! Paths are dotted for fields and bracketed for indexers:
//! `order.lines[2].product`, `tags[primary]`.

mod property;
mod validation;

pub use property::PropertyContext;
pub use validation::{ValidationContext, ValidationOutcome};

/// Default name and path of a value validated without an enclosing field.
pub const VALUE_NAME: &str = "value";

/// Appends `name` to a path prefix.
///
/// Indexer segments (`[..]`) attach without a separating dot.
///
/// ```rust,ignore
/// assert_eq!(join_path(None, "name"), "name");
/// assert_eq!(join_path(Some("order"), "lines"), "order.lines");
/// assert_eq!(join_path(Some("order.lines"), "[2]"), "order.lines[2]");
/// ```
#[must_use]
pub fn join_path(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        None | Some("") => name.to_owned(),
        Some(prefix) if name.starts_with('[') => format!("{prefix}{name}"),
        Some(prefix) => format!("{prefix}.{name}"),
    }
}

/// Last dotted segment of a path, ignoring dots inside indexers.
#[must_use]
pub fn last_segment(path: &str) -> &str {
    let mut depth = 0_usize;
    let mut start = 0;
    for (i, c) in path.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => start = i + 1,
            _ => {}
        }
    }
    &path[start..]
}
