//! costline - day-bucketed billing event timelines and cost deviation reports

use clap::Parser;
use costline::{
    cli::{Cli, Command},
    commands::{OutputOptions, run_deviation, run_timeline},
    data_loader::DataLoader,
    error::Result,
    timezone::TimezoneConfig,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log targets of every workspace crate
const LOG_TARGETS: [&str; 4] = [
    "costline",
    "costline_core",
    "costline_timeline",
    "costline_deviation",
];

fn log_filter(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --verbose overrides RUST_LOG
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new(log_filter("info"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter("warn")))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using timezone: {}", tz_config.display_name());

    let loader = DataLoader::new(cli.data_path.as_deref()).await?;
    info!("Reading events from {:?}", loader.paths());

    let options = OutputOptions {
        json: cli.json,
        color: !cli.no_color && is_terminal::is_terminal(std::io::stdout()),
    };

    let output = match &cli.command {
        Command::Timeline(args) => {
            info!("Running timeline report");
            run_timeline(&loader, &tz_config, args, options).await?
        }
        Command::Deviation(args) => {
            info!("Running deviation report");
            run_deviation(&loader, &tz_config, args, options).await?
        }
    };

    println!("{output}");
    Ok(())
}
