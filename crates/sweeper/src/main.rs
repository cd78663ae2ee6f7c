use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fichaje_sweeper::{run_sweep, SweepConfig, SweepRange};

/// Scans started shifts for late clock-ins and emits delay events.
#[derive(Debug, Parser)]
#[command(name = "fichaje-sweeper", version, about)]
struct Args {
    /// First day to scan (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day to scan, inclusive (YYYY-MM-DD). Defaults to --start.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Keep running, sweeping the current day on a fixed interval.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fichaje_sweeper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = SweepConfig::from_env();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = fichaje_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    fichaje_db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    let bus = Arc::new(fichaje_events::EventBus::default());
    let persistence_handle = tokio::spawn(fichaje_events::EventPersistence::run(
        pool.clone(),
        bus.subscribe(),
    ));

    if args.watch {
        watch(&pool, &bus, &config).await?;
    } else {
        let start = args.start.unwrap_or_else(|| Utc::now().date_naive());
        let end = args.end.unwrap_or(start);
        anyhow::ensure!(start <= end, "--end must not precede --start");

        run_sweep(&pool, &bus, &config, &SweepRange { start, end }).await?;
    }

    // Close the channel so the persistence sink drains and exits.
    drop(bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), persistence_handle).await;

    Ok(())
}

/// Sweep the current day repeatedly until interrupted.
///
/// The day is recomputed on every tick, so a long-lived process rolls over
/// at midnight without restart.
async fn watch(
    pool: &fichaje_db::DbPool,
    bus: &fichaje_events::EventBus,
    config: &SweepConfig,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs));
    tracing::info!(interval_secs = config.interval_secs, "Watch mode started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let range = SweepRange::for_reference(Utc::now());
                if let Err(error) = run_sweep(pool, bus, config, &range).await {
                    tracing::error!(%error, "Sweep run failed, will retry next interval");
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("Watch mode stopping");
                return Ok(());
            }
        }
    }
}
