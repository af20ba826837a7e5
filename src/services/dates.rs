//! Date arithmetic shared by the demand model and the service adapters.

use chrono::{Duration, NaiveDate};

/// The past-year analog of a date: 364 days earlier, i.e. exactly 52 weeks,
/// which keeps the weekday aligned with the prior year.
pub fn comparable_date(date: NaiveDate) -> NaiveDate {
    date - Duration::days(364)
}

/// Consecutive days starting at `start`.
pub fn date_range(start: NaiveDate, num_days: usize) -> Vec<NaiveDate> {
    (0..num_days)
        .map(|i| start + Duration::days(i as i64))
        .collect()
}
