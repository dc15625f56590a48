//! Output formatting module for costline
//!
//! Formatters for the timeline and deviation reports:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output
//!
//! # Examples
//!
//! ```
//! use costline::output::get_formatter;
//! use costline_core::types::{DailyDate, Event};
//! use costline_timeline::TimelineBuilder;
//! use chrono_tz::Tz;
//!
//! let timeline = TimelineBuilder::new(Tz::UTC).build(
//!     vec![Event::new("evt_1", "api_request", "2024-01-05T10:00:00Z")],
//!     DailyDate::from_ymd(2024, 1, 1).unwrap(),
//!     DailyDate::from_ymd(2024, 1, 5).unwrap(),
//! );
//!
//! let formatter = get_formatter(false, false);
//! println!("{}", formatter.format_timeline(&timeline, "UTC"));
//!
//! let json_formatter = get_formatter(true, false);
//! println!("{}", json_formatter.format_timeline(&timeline, "UTC"));
//! ```

use crate::reports::DeviationRow;
use colored::Colorize;
use costline_core::types::CurrencyCode;
use costline_deviation::{ColorBucket, ColorPalette, CostDeviation};
use costline_timeline::{DayGroup, Timeline};
use prettytable::{Table, format, row};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

/// Width of the textual deviation bar
const BAR_WIDTH: usize = 10;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a day-bucketed timeline
    fn format_timeline(&self, timeline: &Timeline, tz_name: &str) -> String;

    /// Format deviation rows
    fn format_deviations(&self, rows: &[DeviationRow]) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter {
    /// Whether to color deviation bars
    pub color: bool,
    /// Colors of deviation buckets
    pub palette: ColorPalette,
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(color: bool) -> Self {
        Self {
            color,
            palette: ColorPalette::default(),
        }
    }

    /// Format one amount with enough precision for sub-cent event costs
    fn format_amount(amount: Decimal) -> String {
        if !amount.is_zero() && amount.abs() < Decimal::new(1, 2) {
            format!("{:.6}", amount)
        } else {
            format!("{:.2}", amount)
        }
    }

    /// Format per-currency totals as `1.25 USD, 3.00 EUR`
    fn format_costs(costs: &BTreeMap<CurrencyCode, Decimal>) -> String {
        if costs.is_empty() {
            return "-".to_string();
        }
        costs
            .iter()
            .map(|(currency, amount)| format!("{} {}", Self::format_amount(*amount), currency))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render a `[#####.....]` bar for `deviation`
    fn format_bar(&self, deviation: &CostDeviation) -> String {
        let filled = ((deviation.bar_fill_percent / 100.0) * BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(BAR_WIDTH);
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));

        if self.color {
            let (r, g, b) = self.palette.token(deviation.color_bucket).rgb;
            bar.truecolor(r, g, b).to_string()
        } else {
            bar
        }
    }

    fn format_deviation_percent(deviation: &CostDeviation) -> String {
        format!("{:+.1}%", deviation.deviation_percent)
    }

    fn format_bucket(bucket: ColorBucket) -> String {
        bucket.to_string()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_timeline(&self, timeline: &Timeline, tz_name: &str) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row![b -> "Date", b -> "Events", b -> "Cost", b -> "Event Types"]);

        for group in &timeline.groups {
            match group {
                DayGroup::Day { date, events } => {
                    let names: BTreeSet<&str> = events.iter().map(|e| e.name.as_str()).collect();
                    table.add_row(row![
                        date.to_string(),
                        r -> events.len(),
                        r -> Self::format_costs(&group.cost_totals()),
                        names.into_iter().collect::<Vec<_>>().join(", ")
                    ]);
                }
                DayGroup::EmptyRange {
                    start_date,
                    end_date,
                } => {
                    let label = if start_date == end_date {
                        start_date.to_string()
                    } else {
                        format!("{start_date} → {end_date}")
                    };
                    table.add_row(row![
                        i -> label,
                        r -> 0,
                        r -> "-",
                        i -> format!("no events ({} days)", group.day_span())
                    ]);
                }
            }
        }

        let totals = timeline.totals();
        table.add_row(row![
            b -> "TOTAL",
            rb -> totals.events,
            rb -> Self::format_costs(&totals.cost),
            b -> format!("{} active days", totals.active_days)
        ]);

        let mut output = format!(
            "Events {} to {} ({})\n",
            timeline.start, timeline.end, tz_name
        );
        output.push_str(&table.to_string());
        if !timeline.unplaced.is_empty() {
            output.push_str(&format!(
                "{} events outside the range or without a valid timestamp\n",
                timeline.unplaced.len()
            ));
        }
        output
    }

    fn format_deviations(&self, rows: &[DeviationRow]) -> String {
        if rows.is_empty() {
            return "No costed events with reference statistics\n".to_string();
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row![
            b -> "Timestamp",
            b -> "Event",
            b -> "Label",
            b -> "Cost",
            b -> "Average",
            b -> "Threshold",
            b -> "Deviation",
            b -> "Bar",
            b -> "Level"
        ]);

        for row in rows {
            let cost = row
                .event
                .cost
                .as_ref()
                .map(|c| format!("{} {}", Self::format_amount(c.amount), c.currency))
                .unwrap_or_else(|| "-".to_string());
            table.add_row(row![
                row.event.raw_timestamp,
                row.event.name,
                row.event.label,
                r -> cost,
                r -> format!("{:.4}", row.reference.average),
                r -> format!("{:.4}", row.reference.threshold),
                r -> Self::format_deviation_percent(&row.deviation),
                self.format_bar(&row.deviation),
                Self::format_bucket(row.deviation.color_bucket)
            ]);
        }

        table.to_string()
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Colors reported alongside each bucket
    pub palette: ColorPalette,
}

impl JsonFormatter {
    /// Create a new JsonFormatter
    pub fn new() -> Self {
        Self {
            palette: ColorPalette::default(),
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_timeline(&self, timeline: &Timeline, tz_name: &str) -> String {
        let output = json!({
            "timezone": tz_name,
            "start": timeline.start,
            "end": timeline.end,
            "groups": timeline.groups,
            "totals": timeline.totals(),
            "unplaced": timeline.unplaced.len(),
        });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_deviations(&self, rows: &[DeviationRow]) -> String {
        let items: Vec<_> = rows
            .iter()
            .map(|row| {
                json!({
                    "event": row.event,
                    "reference": row.reference,
                    "deviation": row.deviation,
                    "color": self.palette.token(row.deviation.color_bucket).hex,
                })
            })
            .collect();
        let output = json!({ "events": items });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Get the appropriate formatter based on output preference
pub fn get_formatter(json: bool, color: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter::new())
    } else {
        Box::new(TableFormatter::new(color))
    }
}
