//! Calendar day ranges
//!
//! Timelines are rendered newest day first, so ranges are produced in that
//! order.

use crate::types::DailyDate;

/// Every calendar day from `start` to `end` inclusive, newest first
///
/// Returns an empty sequence when `start` is after `end`.
///
/// # Examples
/// ```
/// use costline_core::date_range::generate_date_range;
/// use costline_core::types::DailyDate;
///
/// let start = DailyDate::from_ymd(2024, 2, 28).unwrap();
/// let end = DailyDate::from_ymd(2024, 3, 1).unwrap();
/// let days: Vec<String> = generate_date_range(start, end)
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(days, ["2024-03-01", "2024-02-29", "2024-02-28"]);
/// ```
pub fn generate_date_range(start: DailyDate, end: DailyDate) -> Vec<DailyDate> {
    if start > end {
        tracing::debug!("Empty date range: {} is after {}", start, end);
        return Vec::new();
    }

    let mut dates = Vec::with_capacity(start.days_until(&end) as usize + 1);
    let mut current = Some(start);
    while let Some(date) = current
        && date <= end
    {
        dates.push(date);
        current = date.succ();
    }

    dates.reverse();
    dates
}

/// The `days`-long range ending on `end`, as `(start, end)`
///
/// `days` of zero is treated as one.
pub fn trailing_range(end: DailyDate, days: u32) -> (DailyDate, DailyDate) {
    let mut start = end;
    for _ in 1..days.max(1) {
        match start.pred() {
            Some(prev) => start = prev,
            None => break,
        }
    }
    (start, end)
}
