//! Ledger routes. Each module exposes a `router()` merged into the app.
//!
//! Amounts go over the wire as JSON numbers and dates as `YYYY-MM-DD`.

pub mod dashboard;
pub mod expenses;
pub mod settlements;

use chrono::{DateTime, Utc};

pub(crate) fn calendar_day(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}
