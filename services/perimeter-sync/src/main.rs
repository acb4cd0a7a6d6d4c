//! Fire perimeter KML sync service.
//!
//! Polls a feature service for fire perimeters and writes them as KML:
//! - Latest observation per mission
//! - Optional reprojection to WGS84
//! - HTML attribute tables on every placemark
//! - Optional git commit and push of the written file

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use perimeter_sync::fetch::FeatureQuery;
use perimeter_sync::{DeploymentConfig, GitPublisher, HttpFeatureSource, Scheduler};

#[derive(Parser, Debug)]
#[command(name = "perimeter-sync")]
#[command(about = "Fire perimeter feature service to KML sync")]
struct Args {
    /// Deployment configuration file
    #[arg(
        long,
        env = "PERIMETER_CONFIG",
        default_value = "config/deployments/cal_fire_intel.yaml"
    )]
    config: PathBuf,

    /// Output directory (overrides the configured one)
    #[arg(long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Run once and exit (vs continuous polling)
    #[arg(long)]
    once: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = DeploymentConfig::load(&args.config)?;
    if let Some(dir) = args.output_dir {
        config.output.dir = dir;
    }

    info!(
        deployment = %config.deployment.id,
        output = %config.output.path().display(),
        publish = config.publish.enabled,
        "Starting perimeter sync"
    );

    let query = FeatureQuery::from_config(&config.source, config.wants_centroids());
    let source = HttpFeatureSource::new(
        &config.source.url,
        query,
        Duration::from_secs(config.source.timeout_secs),
    )
    .context("Failed to create HTTP client")?;

    let publisher = config
        .publish
        .enabled
        .then(|| GitPublisher::new(config.publish_repo_dir(), &config.publish));

    let scheduler = Scheduler::new(source, publisher, config);

    if args.once {
        info!("Running single iteration");
        let outcome = scheduler.run_once().await;
        info!(outcome = ?outcome, "Iteration complete");
    } else {
        info!("Starting continuous polling");

        // Shutdown signal
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        // Handle Ctrl+C
        let shutdown_tx_clone = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal");
            shutdown_tx_clone.send(()).ok();
        });

        scheduler.run_forever(shutdown_tx.subscribe()).await;
    }

    Ok(())
}
