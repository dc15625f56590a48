//! Command handlers
//!
//! Each handler loads what it needs, runs the pure pipeline and returns the
//! rendered report. Printing is left to the binary.

use crate::cli::{DeviationArgs, TimelineArgs, parse_date_filter, resolve_timeline_range};
use crate::data_loader::{DataLoader, load_statistics};
use crate::filters::EventFilter;
use crate::output::get_formatter;
use crate::reports::deviation_rows;
use costline_core::error::{CostlineError, Result};
use costline_core::timezone::TimezoneConfig;
use costline_core::types::Statistic;
use costline_deviation::ReferenceTable;
use costline_timeline::TimelineBuilder;
use tracing::{info, warn};

/// Rendering options shared by all reports
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Render JSON instead of tables
    pub json: bool,
    /// Color table output
    pub color: bool,
}

/// Build and render the day-bucketed timeline
pub async fn run_timeline(
    loader: &DataLoader,
    tz_config: &TimezoneConfig,
    args: &TimelineArgs,
    options: OutputOptions,
) -> Result<String> {
    let (since, until) = resolve_timeline_range(args, tz_config.today())?;
    info!(
        "Building timeline {}..{} in {}",
        since,
        until,
        tz_config.display_name()
    );

    let mut filter = EventFilter::new().with_timezone(tz_config.tz);
    if let Some(name) = &args.name {
        filter = filter.with_name(name.clone());
    }
    let events = filter.apply(loader.load_events_sorted().await?);

    let timeline = TimelineBuilder::new(tz_config.tz)
        .keep_trailing_empty(args.keep_trailing_empty)
        .build(events, since, until);
    info!(
        "Placed {} events in {} groups",
        timeline.event_count(),
        timeline.groups.len()
    );

    Ok(get_formatter(options.json, options.color)
        .format_timeline(&timeline, tz_config.display_name()))
}

/// Build and render the cost deviation report
pub async fn run_deviation(
    loader: &DataLoader,
    tz_config: &TimezoneConfig,
    args: &DeviationArgs,
    options: OutputOptions,
) -> Result<String> {
    let threshold = Statistic::from(args.threshold);
    let stats = load_statistics(&args.stats).await?;
    let references = ReferenceTable::from_statistics(&stats, threshold);
    if references.is_empty() {
        warn!(
            "{} has no average/{} cost statistics for any event type",
            args.stats.display(),
            threshold
        );
    }

    let mut filter = EventFilter::new().with_timezone(tz_config.tz);
    if let Some(since) = &args.since {
        filter = filter.with_since(parse_date_filter(since)?);
    }
    if let Some(until) = &args.until {
        filter = filter.with_until(parse_date_filter(until)?);
    }
    if let (Some(since), Some(until)) = (filter.since_date, filter.until_date)
        && since > until
    {
        return Err(CostlineError::InvalidArgument(format!(
            "--since {since} is after --until {until}"
        )));
    }
    if let Some(name) = &args.name {
        filter = filter.with_name(name.clone());
    }

    let events = filter.apply(loader.load_events_sorted().await?);
    let rows = deviation_rows(events, &references);
    info!("Computed deviation for {} events", rows.len());

    Ok(get_formatter(options.json, options.color).format_deviations(&rows))
}
