//! Day-bucketed event timelines for costline
//!
//! Partitions billing events into calendar days over an explicit range and
//! collapses runs of empty days.

pub mod day_bucketer;
pub mod timeline;

pub use day_bucketer::{DayGroup, EventsByDay, group_empty_dates, group_events_by_day, trim_trailing_empty};
pub use timeline::{Timeline, TimelineBuilder, TimelineTotals};
