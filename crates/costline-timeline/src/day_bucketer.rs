//! Day bucketing for event timelines
//!
//! Events are partitioned by the calendar day they fall on, then laid out
//! over an explicit newest-first date range. Runs of days without events
//! collapse into a single [`DayGroup::EmptyRange`].
//!
//! # Examples
//!
//! ```
//! use costline_core::date_range::generate_date_range;
//! use costline_core::types::{DailyDate, Event};
//! use costline_timeline::day_bucketer::{DayGroup, group_empty_dates, group_events_by_day};
//! use chrono_tz::Tz;
//!
//! let events = vec![
//!     Event::new("evt_2", "api_request", "2024-01-03T09:00:00Z"),
//!     Event::new("evt_1", "api_request", "2024-01-01T12:00:00Z"),
//! ];
//! let by_day = group_events_by_day(events, &Tz::UTC);
//! let dates = generate_date_range(
//!     DailyDate::from_ymd(2024, 1, 1).unwrap(),
//!     DailyDate::from_ymd(2024, 1, 3).unwrap(),
//! );
//! let groups = group_empty_dates(&dates, &by_day);
//!
//! assert_eq!(groups.len(), 3);
//! assert!(matches!(groups[1], DayGroup::EmptyRange { .. }));
//! ```

use chrono_tz::Tz;
use costline_core::types::{CurrencyCode, DailyDate, DayKey, Event};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Events bucketed by calendar day, input order preserved per bucket
pub type EventsByDay = BTreeMap<DayKey, Vec<Event>>;

/// One row of a day-bucketed timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DayGroup {
    /// A day with at least one event
    Day {
        /// Calendar day
        date: DailyDate,
        /// Events of that day, in input order
        events: Vec<Event>,
    },
    /// Consecutive days without events
    ///
    /// `start_date` is the later boundary, `end_date` the earlier one, since
    /// timelines run newest first.
    EmptyRange {
        /// Day the empty run began in traversal order (later date)
        start_date: DailyDate,
        /// Day the empty run was last extended to (earlier date)
        end_date: DailyDate,
    },
}

impl DayGroup {
    /// Whether this is a collapsed empty run
    pub fn is_empty_range(&self) -> bool {
        matches!(self, Self::EmptyRange { .. })
    }

    /// Number of events in the group
    pub fn event_count(&self) -> usize {
        match self {
            Self::Day { events, .. } => events.len(),
            Self::EmptyRange { .. } => 0,
        }
    }

    /// Number of calendar days the group covers
    pub fn day_span(&self) -> usize {
        match self {
            Self::Day { .. } => 1,
            Self::EmptyRange {
                start_date,
                end_date,
            } => end_date.days_until(start_date) as usize + 1,
        }
    }

    /// Summed event cost per currency; empty for empty runs
    pub fn cost_totals(&self) -> BTreeMap<CurrencyCode, Decimal> {
        let mut totals = BTreeMap::new();
        if let Self::Day { events, .. } = self {
            for cost in events.iter().filter_map(|e| e.cost.as_ref()) {
                *totals.entry(cost.currency.clone()).or_insert(Decimal::ZERO) += cost.amount;
            }
        }
        totals
    }
}

/// Bucket events by their calendar day in `tz`
///
/// Events without a parsed timestamp land in [`DayKey::Invalid`].
pub fn group_events_by_day<I>(events: I, tz: &Tz) -> EventsByDay
where
    I: IntoIterator<Item = Event>,
{
    let mut by_day = EventsByDay::new();
    for event in events {
        by_day.entry(event.day_key(tz)).or_default().push(event);
    }
    by_day
}

/// Lay bucketed events over `dates`, collapsing empty runs
///
/// `dates` is walked once in the given order (newest first as produced by
/// `generate_date_range`). The output follows the same order and covers every
/// input date exactly once.
pub fn group_empty_dates(dates: &[DailyDate], events_by_day: &EventsByDay) -> Vec<DayGroup> {
    let mut groups = Vec::new();
    let mut pending: Option<(DailyDate, DailyDate)> = None;

    for &date in dates {
        match events_by_day
            .get(&DayKey::Date(date))
            .filter(|events| !events.is_empty())
        {
            Some(events) => {
                if let Some((start_date, end_date)) = pending.take() {
                    groups.push(DayGroup::EmptyRange {
                        start_date,
                        end_date,
                    });
                }
                groups.push(DayGroup::Day {
                    date,
                    events: events.clone(),
                });
            }
            None => {
                let start_date = pending.map_or(date, |(start, _)| start);
                pending = Some((start_date, date));
            }
        }
    }

    if let Some((start_date, end_date)) = pending {
        groups.push(DayGroup::EmptyRange {
            start_date,
            end_date,
        });
    }

    groups
}

/// Drop a trailing empty run, returning it
pub fn trim_trailing_empty(groups: &mut Vec<DayGroup>) -> Option<DayGroup> {
    if groups.last().is_some_and(DayGroup::is_empty_range) {
        groups.pop()
    } else {
        None
    }
}
