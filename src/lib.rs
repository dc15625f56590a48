//! costline - day-bucketed billing event timelines and cost deviation reports
//!
//! This library provides functionality to:
//! - Load exported billing event pages (JSON or JSONL) from disk
//! - Group events by calendar day in a chosen timezone, collapsing empty days
//! - Compare each event's cost against its type's average and percentiles
//! - Render both reports as tables or JSON
//!
//! # Examples
//!
//! ```no_run
//! use costline::{data_loader::DataLoader, timezone::TimezoneConfig};
//! use costline_timeline::TimelineBuilder;
//!
//! # async fn example() -> costline::Result<()> {
//! let tz_config = TimezoneConfig::default();
//! let loader = DataLoader::new(None).await?;
//! let events = loader.load_events_sorted().await?;
//!
//! let today = tz_config.today();
//! let (since, until) = costline::date_range::trailing_range(today, 7);
//! let timeline = TimelineBuilder::new(tz_config.tz).build(events, since, until);
//! println!("{} events over {} groups", timeline.event_count(), timeline.groups.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod data_loader;
pub mod filters;
pub mod output;
pub mod reports;

// Re-export core modules so the binary and downstream users share one path
pub use costline_core::{date_range, error, timezone, types};

// Re-export commonly used types
pub use costline_core::error::{CostlineError, Result};
pub use costline_core::types::{DailyDate, DayKey, Event, EventStatistics};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
