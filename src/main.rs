use std::path::PathBuf;

use live_events_lib::aggregator;
use live_events_lib::config::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(clap::Parser, Debug)]
#[command(version, about = "Merge live-event playlist feeds into one categorized M3U", long_about = None)]
struct Args {
    /// Path to the sources config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output playlist path (overrides the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Check configuration, list sources and exit
    #[arg(long)]
    check: bool,

    /// Run everything but do not write the playlist
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("live_events={0},live_events_lib={0}", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = AppConfig::load(args.config.as_deref())?;
    config.validate()?;

    // -- CHECK MODE --
    if args.check {
        println!("Loaded config with {} sources:", config.sources.len());
        for source in &config.sources {
            println!("  {} -> {}", source.name, source.url);
        }
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| config.output_path.clone());
    info!("Aggregating {} sources into {}", config.sources.len(), output.display());

    let summary = aggregator::run_and_write(&config, &output, args.dry_run).await?;
    if args.dry_run {
        println!("{}", summary.to_message());
    }
    Ok(())
}
