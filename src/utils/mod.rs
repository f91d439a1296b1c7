//! Project-specific utilities live here.

use time::OffsetDateTime;

/// Formats a shared log prefix for project logs.
pub fn log_prefix(module: &str) -> String {
    format!("project::{module}")
}

/// Calendar year in UTC.
pub fn current_year() -> i32 {
    OffsetDateTime::now_utc().year()
}
