//! Yard weighbridge operations service
//!
//! Weighbridge, gate-slot, ANPR and wait-queue core for a bulk-goods yard.
//! Reads configuration from TOML file (~/.config/yard-weighbridge/config.toml).

use std::sync::Arc;

use tracing::{error, info};

use yard_weighbridge::domain::{Clock, RepositoryProvider, SystemClock};
use yard_weighbridge::shared::shutdown::{listen_for_shutdown_signals, ShutdownSignal};
use yard_weighbridge::{
    default_config_path, start_no_show_sweep, AnprService, AppConfig, GateService,
    InMemoryRepositoryProvider, InMemoryTicketNumberSource, StaticVehicleLookup,
    WaitQueueService, WeighingService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("YARD_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting yard weighbridge service...");

    // ── Core wiring ────────────────────────────────────────────
    let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let numbers = Arc::new(InMemoryTicketNumberSource::new());
    let vehicle_lookup = Arc::new(StaticVehicleLookup::new());

    let _weighing = Arc::new(WeighingService::new(
        repos.clone(),
        numbers,
        clock.clone(),
        config.weighing.default_tolerance_percent,
    ));
    let _gate = Arc::new(GateService::new(repos.clone(), clock.clone()));
    let _anpr = Arc::new(AnprService::new(
        repos.clone(),
        vehicle_lookup,
        clock.clone(),
    ));
    let _wait_queue = Arc::new(WaitQueueService::new(
        repos.clone(),
        clock.clone(),
        config.queue.overtime_threshold_minutes,
    ));
    info!(tenant = %config.site.tenant_id, "Services wired");

    // ── Background tasks ───────────────────────────────────────
    let shutdown = ShutdownSignal::new();
    if config.sweep.enabled {
        start_no_show_sweep(
            repos.clone(),
            clock.clone(),
            shutdown.clone(),
            config.sweep.check_interval_secs,
        );
    } else {
        info!("No-show sweep disabled by config");
    }

    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));
    info!("Yard weighbridge service up; waiting for shutdown signal");

    shutdown.wait().await;

    // Grace period for the sweep loop to observe the signal and finish.
    info!(
        timeout_secs = config.server.shutdown_timeout_secs,
        "Draining background tasks"
    );
    tokio::time::sleep(tokio::time::Duration::from_secs(
        config.server.shutdown_timeout_secs,
    ))
    .await;
    info!("Yard weighbridge service stopped");
    Ok(())
}
