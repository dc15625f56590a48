//! Filtering module for billing events
//!
//! Narrows loaded events by local calendar date and event type before they
//! reach the deviation report.
//!
//! # Examples
//!
//! ```
//! use costline::filters::EventFilter;
//! use costline_core::types::DailyDate;
//!
//! let filter = EventFilter::new()
//!     .with_since(DailyDate::from_ymd(2024, 1, 1).unwrap())
//!     .with_until(DailyDate::from_ymd(2024, 1, 31).unwrap())
//!     .with_name("api_request");
//! ```

use chrono_tz::Tz;
use costline_core::types::{DailyDate, Event};

/// Filter configuration for events
///
/// All bounds are optional and combine with AND.
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    /// Start date filter (inclusive)
    pub since_date: Option<DailyDate>,
    /// End date filter (inclusive)
    pub until_date: Option<DailyDate>,
    /// Event type filter
    pub name: Option<String>,
    /// Timezone for local dates; UTC when unset
    pub timezone: Option<Tz>,
}

impl EventFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start date filter
    pub fn with_since(mut self, date: DailyDate) -> Self {
        self.since_date = Some(date);
        self
    }

    /// Set the end date filter
    pub fn with_until(mut self, date: DailyDate) -> Self {
        self.until_date = Some(date);
        self
    }

    /// Set the event type filter
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the timezone used to derive local dates
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = Some(tz);
        self
    }

    fn has_date_bounds(&self) -> bool {
        self.since_date.is_some() || self.until_date.is_some()
    }

    /// Check if an event passes the filter
    ///
    /// An event without a valid timestamp never passes a date bound.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(name) = &self.name
            && event.name.as_str() != name
        {
            return false;
        }

        if !self.has_date_bounds() {
            return true;
        }

        let tz = self.timezone.unwrap_or(Tz::UTC);
        let Some(date) = event.timestamp.map(|ts| ts.to_daily_date_with_tz(&tz)) else {
            return false;
        };

        if let Some(since) = &self.since_date
            && date < *since
        {
            return false;
        }

        if let Some(until) = &self.until_date
            && date > *until
        {
            return false;
        }

        true
    }

    /// Keep only matching events, preserving order
    pub fn apply(&self, events: Vec<Event>) -> Vec<Event> {
        events.into_iter().filter(|e| self.matches(e)).collect()
    }
}
