//! Composed timeline pipeline
//!
//! Runs bucket, range, and group in order and applies the display trim of a
//! trailing empty run.

use crate::day_bucketer::{DayGroup, group_empty_dates, group_events_by_day, trim_trailing_empty};
use chrono_tz::Tz;
use costline_core::date_range::generate_date_range;
use costline_core::types::{CurrencyCode, DailyDate, DayKey, Event};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Day-bucketed events over an explicit date range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// First day of the range (inclusive)
    pub start: DailyDate,
    /// Last day of the range (inclusive)
    pub end: DailyDate,
    /// Groups, newest first
    pub groups: Vec<DayGroup>,
    /// Events that fall outside the range or carry no valid timestamp
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unplaced: Vec<Event>,
}

/// Timeline-wide totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineTotals {
    /// Number of events placed in the range
    pub events: usize,
    /// Number of days with at least one event
    pub active_days: usize,
    /// Summed cost per currency
    pub cost: BTreeMap<CurrencyCode, Decimal>,
}

impl Timeline {
    /// Number of events placed in the range
    pub fn event_count(&self) -> usize {
        self.groups.iter().map(DayGroup::event_count).sum()
    }

    /// Totals over every group
    pub fn totals(&self) -> TimelineTotals {
        let mut totals = TimelineTotals::default();
        for group in &self.groups {
            if group.is_empty_range() {
                continue;
            }
            totals.events += group.event_count();
            totals.active_days += 1;
            for (currency, amount) in group.cost_totals() {
                *totals.cost.entry(currency).or_insert(Decimal::ZERO) += amount;
            }
        }
        totals
    }
}

/// Builds a [`Timeline`] from a flat event list
///
/// # Examples
/// ```
/// use costline_core::types::{DailyDate, Event};
/// use costline_timeline::TimelineBuilder;
/// use chrono_tz::Tz;
///
/// let events = vec![Event::new("evt_1", "api_request", "2024-01-05T10:00:00Z")];
/// let timeline = TimelineBuilder::new(Tz::UTC).build(
///     events,
///     DailyDate::from_ymd(2024, 1, 1).unwrap(),
///     DailyDate::from_ymd(2024, 1, 5).unwrap(),
/// );
///
/// // The trailing empty run (Jan 4 back to Jan 1) is trimmed
/// assert_eq!(timeline.groups.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    tz: Tz,
    keep_trailing_empty: bool,
}

impl TimelineBuilder {
    /// Create a builder bucketing days in `tz`
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            keep_trailing_empty: false,
        }
    }

    /// Keep a trailing empty run instead of trimming it
    pub fn keep_trailing_empty(mut self, keep: bool) -> Self {
        self.keep_trailing_empty = keep;
        self
    }

    /// Timezone whose midnight starts each day
    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Bucket `events` over `[start, end]`
    pub fn build<I>(&self, events: I, start: DailyDate, end: DailyDate) -> Timeline
    where
        I: IntoIterator<Item = Event>,
    {
        let mut by_day = group_events_by_day(events, &self.tz);
        let dates = generate_date_range(start, end);
        let mut groups = group_empty_dates(&dates, &by_day);

        if !self.keep_trailing_empty && let Some(trimmed) = trim_trailing_empty(&mut groups) {
            debug!("Trimmed trailing empty run of {} days", trimmed.day_span());
        }

        by_day.retain(|key, _| match key {
            DayKey::Date(date) => *date < start || *date > end,
            DayKey::Invalid => true,
        });
        if let Some(invalid) = by_day.get(&DayKey::Invalid) {
            warn!("{} events have no valid timestamp", invalid.len());
        }
        let unplaced: Vec<Event> = by_day.into_values().flatten().collect();
        if !unplaced.is_empty() {
            debug!("{} events not placed in {}..{}", unplaced.len(), start, end);
        }

        Timeline {
            start,
            end,
            groups,
            unplaced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costline_core::types::CostInfo;

    fn date(y: i32, m: u32, d: u32) -> DailyDate {
        DailyDate::from_ymd(y, m, d).unwrap()
    }

    fn costed(id: &str, timestamp: &str, cents: i64) -> Event {
        Event::new(id, "api_request", timestamp)
            .with_cost(CostInfo::new(Decimal::new(cents, 2), CurrencyCode::new("USD")))
    }

    #[test]
    fn test_build_trims_trailing_empty_run() {
        let events = vec![costed("a", "2024-01-05T10:00:00Z", 100)];

        let timeline = TimelineBuilder::new(Tz::UTC).build(events, date(2024, 1, 1), date(2024, 1, 5));

        assert_eq!(timeline.groups.len(), 1);
        assert!(!timeline.groups[0].is_empty_range());
    }

    #[test]
    fn test_build_can_keep_trailing_empty_run() {
        let events = vec![costed("a", "2024-01-05T10:00:00Z", 100)];

        let timeline = TimelineBuilder::new(Tz::UTC)
            .keep_trailing_empty(true)
            .build(events, date(2024, 1, 1), date(2024, 1, 5));

        assert_eq!(timeline.groups.len(), 2);
        assert_eq!(
            timeline.groups[1],
            DayGroup::EmptyRange {
                start_date: date(2024, 1, 4),
                end_date: date(2024, 1, 1),
            }
        );
    }

    #[test]
    fn test_leading_empty_run_is_kept() {
        let events = vec![costed("a", "2024-01-01T10:00:00Z", 100)];

        let timeline = TimelineBuilder::new(Tz::UTC).build(events, date(2024, 1, 1), date(2024, 1, 3));

        assert_eq!(timeline.groups.len(), 2);
        assert!(timeline.groups[0].is_empty_range());
    }

    #[test]
    fn test_unplaced_events() {
        let events = vec![
            costed("in", "2024-01-02T10:00:00Z", 100),
            costed("before", "2023-12-31T10:00:00Z", 100),
            costed("after", "2024-01-04T10:00:00Z", 100),
            Event::new("broken", "api_request", "garbage"),
        ];

        let timeline = TimelineBuilder::new(Tz::UTC).build(events, date(2024, 1, 1), date(2024, 1, 3));

        assert_eq!(timeline.event_count(), 1);
        let mut unplaced: Vec<_> = timeline.unplaced.iter().map(|e| e.id.as_str()).collect();
        unplaced.sort();
        assert_eq!(unplaced, ["after", "before", "broken"]);
    }

    #[test]
    fn test_totals() {
        let events = vec![
            costed("a", "2024-01-03T10:00:00Z", 150),
            costed("b", "2024-01-03T11:00:00Z", 50),
            costed("c", "2024-01-01T10:00:00Z", 25),
            Event::new("d", "page_view", "2024-01-01T12:00:00Z"),
        ];

        let totals = TimelineBuilder::new(Tz::UTC)
            .build(events, date(2024, 1, 1), date(2024, 1, 3))
            .totals();

        assert_eq!(totals.events, 4);
        assert_eq!(totals.active_days, 2);
        assert_eq!(totals.cost[&CurrencyCode::new("USD")], Decimal::new(225, 2));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let events = vec![
            costed("a", "2024-01-03T10:00:00Z", 150),
            costed("b", "2024-01-01T10:00:00Z", 25),
        ];
        let builder = TimelineBuilder::new(Tz::UTC).keep_trailing_empty(true);

        let first = builder.build(events.clone(), date(2023, 12, 28), date(2024, 1, 4));
        let second = builder.build(events, date(2023, 12, 28), date(2024, 1, 4));

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
