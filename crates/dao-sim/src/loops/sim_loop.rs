//! Fixed-interval simulation loop.
//!
//! The loop is the only writer of the fleet: commands arriving on the channel
//! are applied between ticks, and a fresh snapshot is published after every
//! mutation for display collaborators to read.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};

use dao_core::{AlertSeverity, FleetCommand, FleetSnapshot, FleetStore, TickReport};

/// Run until shutdown and hand back the final store.
pub async fn run_sim_loop(
    mut store: FleetStore,
    tick_interval: Duration,
    mut commands: mpsc::Receiver<FleetCommand>,
    snapshots: watch::Sender<FleetSnapshot>,
    mut shutdown: broadcast::Receiver<()>,
) -> FleetStore {
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately.
    ticker.tick().await;

    let mut commands_open = true;
    tracing::info!(
        "Simulation loop started ({} vehicles, {}ms interval)",
        store.vehicles().len(),
        tick_interval.as_millis()
    );

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Simulation loop shutting down at tick {}", store.tick_count());
                break;
            }
            maybe_command = commands.recv(), if commands_open => {
                match maybe_command {
                    Some(command) => {
                        apply_command(&mut store, command);
                        snapshots.send_replace(store.snapshot());
                    }
                    None => {
                        tracing::debug!("Command channel closed");
                        commands_open = false;
                    }
                }
            }
            _ = ticker.tick() => {
                let report = store.tick(tick_interval);
                log_report(&report);
                snapshots.send_replace(store.snapshot());
            }
        }
    }

    store
}

/// Apply one command. Rejected commands are logged and dropped.
pub fn apply_command(store: &mut FleetStore, command: FleetCommand) {
    tracing::debug!("Applying {:?}", command);
    if let Err(e) = store.apply(command) {
        tracing::warn!("Command rejected: {}", e);
    }
}

fn log_report(report: &TickReport) {
    for alert in &report.new_alerts {
        match alert.severity {
            AlertSeverity::Critical => {
                tracing::warn!("[tick {}] {} ({})", report.tick, alert.message, alert.id)
            }
            AlertSeverity::Warning | AlertSeverity::Info => {
                tracing::info!("[tick {}] {} ({})", report.tick, alert.message, alert.id)
            }
        }
    }
    for id in &report.evasive {
        tracing::info!("[tick {}] Drone {} holding to give way", report.tick, id);
    }
    for id in &report.returning {
        tracing::info!("[tick {}] Drone {} returning on low battery", report.tick, id);
    }
    for id in &report.docked {
        tracing::debug!("[tick {}] Drone {} docked", report.tick, id);
    }
}
