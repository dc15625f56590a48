//! CLI interface for costline
//!
//! # Example
//!
//! ```bash
//! # Last 30 days of events, bucketed by day in the local timezone
//! costline timeline
//!
//! # January 2024 in Berlin time, keeping the empty tail
//! costline timeline --since 2024-01-01 --until 2024-01-31 -z Europe/Berlin --keep-trailing-empty
//!
//! # Cost deviation of API requests against their p95
//! costline deviation --stats stats.json --name api_request --threshold p95 --json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use costline_core::date_range::trailing_range;
use costline_core::error::{CostlineError, Result};
use costline_core::types::{DailyDate, Statistic};
use std::path::PathBuf;

/// Day-bucketed billing event timelines and cost deviation reports
#[derive(Parser, Debug, Clone)]
#[command(name = "costline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Timezone for day boundaries (e.g. "America/New_York", "Europe/Berlin", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true, env = "COSTLINE_TIMEZONE")]
    pub timezone: Option<String>,

    /// Use UTC for day boundaries (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Directory or file holding exported event pages
    #[arg(long, global = true, env = "COSTLINE_DATA_PATH")]
    pub data_path: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available reports
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show events grouped by day, collapsing empty days
    Timeline(TimelineArgs),
    /// Show each costed event against its type's average and threshold
    Deviation(DeviationArgs),
}

/// Arguments for the timeline report
#[derive(Args, Debug, Clone)]
pub struct TimelineArgs {
    /// First day of the range (YYYY-MM-DD or YYYY-MM)
    #[arg(long)]
    pub since: Option<String>,

    /// Last day of the range (YYYY-MM-DD or YYYY-MM); defaults to today
    #[arg(long)]
    pub until: Option<String>,

    /// Range length in days when --since is not given
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    /// Only include events of this type
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Keep a trailing run of empty days instead of trimming it
    #[arg(long)]
    pub keep_trailing_empty: bool,
}

/// Arguments for the deviation report
#[derive(Args, Debug, Clone)]
pub struct DeviationArgs {
    /// Statistics export (JSON) with per-type averages and percentiles
    #[arg(long)]
    pub stats: PathBuf,

    /// Only include events on or after this day (YYYY-MM-DD or YYYY-MM)
    #[arg(long)]
    pub since: Option<String>,

    /// Only include events on or before this day (YYYY-MM-DD or YYYY-MM)
    #[arg(long)]
    pub until: Option<String>,

    /// Only include events of this type
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Percentile used as the upper reference
    #[arg(long, value_enum, default_value = "p99")]
    pub threshold: ThresholdArg,
}

/// Percentiles accepted as the deviation threshold
///
/// Totals and averages are left out: the average is the lower reference
/// already, so using it as the threshold would leave every bar empty.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdArg {
    P99,
    P95,
    P50,
    P10,
}

impl From<ThresholdArg> for Statistic {
    fn from(arg: ThresholdArg) -> Self {
        match arg {
            ThresholdArg::P99 => Statistic::P99,
            ThresholdArg::P95 => Statistic::P95,
            ThresholdArg::P50 => Statistic::P50,
            ThresholdArg::P10 => Statistic::P10,
        }
    }
}

/// Parse a date filter string
///
/// Accepts `YYYY-MM-DD`, or `YYYY-MM` meaning the first day of that month.
pub fn parse_date_filter(date_str: &str) -> Result<DailyDate> {
    if let Ok(date) = chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(DailyDate::new(date));
    }

    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() == 2 {
        let year = parts[0]
            .parse::<i32>()
            .map_err(|_| CostlineError::InvalidDate(format!("Invalid year in '{date_str}'")))?;
        let month = parts[1]
            .parse::<u32>()
            .map_err(|_| CostlineError::InvalidDate(format!("Invalid month in '{date_str}'")))?;

        if !(1..=12).contains(&month) {
            return Err(CostlineError::InvalidDate(format!(
                "Month must be between 1-12, got {month}"
            )));
        }

        DailyDate::from_ymd(year, month, 1)
            .ok_or_else(|| CostlineError::InvalidDate(format!("Invalid date: {date_str}")))
    } else {
        Err(CostlineError::InvalidDate(format!(
            "Invalid date format '{}', expected YYYY-MM-DD or YYYY-MM",
            date_str
        )))
    }
}

/// Resolve the inclusive timeline range
///
/// `until` defaults to `today`; `since` defaults to `days` days ending on
/// `until`.
pub fn resolve_timeline_range(
    args: &TimelineArgs,
    today: DailyDate,
) -> Result<(DailyDate, DailyDate)> {
    let until = match &args.until {
        Some(s) => parse_date_filter(s)?,
        None => today,
    };
    let since = match &args.since {
        Some(s) => parse_date_filter(s)?,
        None => trailing_range(until, args.days).0,
    };

    if since > until {
        return Err(CostlineError::InvalidArgument(format!(
            "--since {since} is after --until {until}"
        )));
    }
    Ok((since, until))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> DailyDate {
        DailyDate::from_ymd(y, m, d).unwrap()
    }

    fn timeline_args(cli: Cli) -> TimelineArgs {
        match cli.command {
            Command::Timeline(args) => args,
            other => panic!("expected timeline, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_date_filter() {
        assert_eq!(parse_date_filter("2024-01-15").unwrap(), date(2024, 1, 15));
        assert_eq!(parse_date_filter("2024-03").unwrap(), date(2024, 3, 1));
        assert!(matches!(
            parse_date_filter("2024-13"),
            Err(CostlineError::InvalidDate(_))
        ));
        assert!(parse_date_filter("2024/01/15").is_err());
        assert!(parse_date_filter("last-week").is_err());
    }

    #[test]
    fn test_timeline_defaults() {
        let cli = Cli::try_parse_from(["costline", "timeline"]).unwrap();
        assert!(!cli.json);
        let args = timeline_args(cli);
        assert_eq!(args.days, 30);
        assert!(!args.keep_trailing_empty);

        let (since, until) = resolve_timeline_range(&args, date(2024, 3, 30)).unwrap();
        assert_eq!(until, date(2024, 3, 30));
        assert_eq!(since, date(2024, 3, 1));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "costline",
            "timeline",
            "--since",
            "2024-01-01",
            "--until",
            "2024-01-05",
            "--utc",
            "--json",
        ])
        .unwrap();
        assert!(cli.utc);
        assert!(cli.json);

        let args = timeline_args(cli);
        let range = resolve_timeline_range(&args, date(2030, 1, 1)).unwrap();
        assert_eq!(range, (date(2024, 1, 1), date(2024, 1, 5)));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let cli = Cli::try_parse_from([
            "costline",
            "timeline",
            "--since",
            "2024-02-01",
            "--until",
            "2024-01-01",
        ])
        .unwrap();
        let args = timeline_args(cli);
        assert!(matches!(
            resolve_timeline_range(&args, date(2024, 3, 1)),
            Err(CostlineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_deviation_args() {
        let cli = Cli::try_parse_from([
            "costline",
            "deviation",
            "--stats",
            "stats.json",
            "--threshold",
            "p95",
        ])
        .unwrap();
        match cli.command {
            Command::Deviation(args) => {
                assert_eq!(args.stats, PathBuf::from("stats.json"));
                assert_eq!(args.threshold, ThresholdArg::P95);
                assert_eq!(Statistic::from(args.threshold), Statistic::P95);
            }
            other => panic!("expected deviation, got {other:?}"),
        }

        assert!(Cli::try_parse_from(["costline", "deviation"]).is_err());
        for rejected in ["p42", "average", "avg", "total"] {
            assert!(
                Cli::try_parse_from([
                    "costline",
                    "deviation",
                    "--stats",
                    "s.json",
                    "--threshold",
                    rejected,
                ])
                .is_err(),
                "--threshold {rejected} should be rejected"
            );
        }

        let cli = Cli::try_parse_from(["costline", "deviation", "--stats", "s.json"]).unwrap();
        match cli.command {
            Command::Deviation(args) => assert_eq!(args.threshold, ThresholdArg::P99),
            other => panic!("expected deviation, got {other:?}"),
        }
    }
}
