//! energy-telemetry entry point: CLI wiring, hub construction, and output.

use std::process::ExitCode;
use std::sync::Arc;

use energy_telemetry::cli::{self, CliCommand, CliOptions};
use energy_telemetry::error::Result;
use energy_telemetry::io::export::{export_history, export_readings};
use energy_telemetry::logging;
use energy_telemetry::pubsub::Hub;
use energy_telemetry::sim::types::Snapshot;
use tracing::info;

fn main() -> ExitCode {
    let opts = match cli::parse_args() {
        Ok(CliCommand::Run(opts)) => opts,
        Ok(CliCommand::Help) => {
            cli::print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            return ExitCode::FAILURE;
        }
    };

    logging::init_tracing();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(opts)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(opts: CliOptions) -> Result<()> {
    let config = opts.resolve_config()?;
    let hub = Hub::from_config(&config)?;
    info!(
        devices = config.devices.len(),
        tick_ms = config.engine.tick_ms,
        seeded = config.engine.seed.is_some(),
        "hub ready"
    );

    if opts.ticks > 0 {
        let snapshots = stream_snapshots(&hub, opts.ticks).await;
        if let Some(path) = &opts.readings_out {
            export_readings(&snapshots, path)?;
            eprintln!("Readings written to {}", path.display());
        }
    }

    if let Some(period) = opts.history_period() {
        let points = hub.generate_historical_data(period);
        println!("\nHistory ({period}):");
        for p in &points {
            println!("  {:>8}  {:>8.2} kWh", p.time, p.consumption);
        }
        if let Some(path) = &opts.history_out {
            export_history(&points, path)?;
            eprintln!("History written to {}", path.display());
        }
    }

    #[cfg(feature = "api")]
    if opts.serve {
        serve(hub, opts.port).await?;
    }

    Ok(())
}

/// Subscribes for `ticks` snapshots, printing each, then unsubscribes.
///
/// Stops early on Ctrl-C.
async fn stream_snapshots(hub: &Hub, ticks: usize) -> Vec<Snapshot> {
    let (subscription, mut rx) = hub.subscribe_channel();
    let mut snapshots = Vec::with_capacity(ticks);

    while snapshots.len() < ticks {
        tokio::select! {
            received = rx.recv() => match received {
                Some(snapshot) => {
                    println!("{snapshot}");
                    snapshots.push(Arc::unwrap_or_clone(snapshot));
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    let _ = subscription.unsubscribe();
    snapshots
}

#[cfg(feature = "api")]
async fn serve(hub: Hub, port: u16) -> Result<()> {
    use std::net::SocketAddr;

    use energy_telemetry::api::{self, AppState};

    let (state, subscription) = AppState::attach(hub);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let served = api::serve(state, addr).await;
    let _ = subscription.unsubscribe();
    Ok(served?)
}
