//! Core types, errors, and date utilities for costline
//!
//! This crate provides the event and statistics types shared by the
//! timeline and deviation crates, the error type used at the I/O edges,
//! timezone configuration, and the calendar range helper.

pub mod date_range;
pub mod error;
pub mod timezone;
pub mod types;

// Re-export commonly used types
pub use error::{CostlineError, Result};
pub use types::{
    CostInfo, CurrencyCode, DailyDate, DayKey, Event, EventId, EventName, EventStatistics,
    ISOTimestamp, Statistic,
};
