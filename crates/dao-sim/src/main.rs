//! dao-sim - run the airspace simulation with a scripted scenario.
//!
//! Usage:
//!   cargo run -p dao-sim -- --scenario dispersal --ticks 400 --tick-ms 50

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use tokio::sync::{broadcast, mpsc, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dao_core::{FleetSnapshot, FleetStore};
use dao_sim::config::{Config, LogFormat};
use dao_sim::loops::sim_loop::run_sim_loop;
use dao_sim::scenarios::{
    create_crossing_scenario, create_dispersal_scenario, create_emergency_scenario, Scenario,
};

/// Available scenarios
#[derive(Debug, Clone, ValueEnum)]
enum ScenarioType {
    /// Two vehicles swap docks through the grid center
    Crossing,
    /// Every vehicle flies to the opposite quadrant
    Dispersal,
    /// Launch, hover, resume, emergency landing
    Emergency,
}

/// Drone airspace orchestrator simulation
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scenario to run
    #[arg(long, value_enum, default_value = "crossing")]
    scenario: ScenarioType,

    /// Load a JSON scenario script instead of a built-in scenario
    #[arg(long)]
    scenario_file: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(long, default_value_t = 300)]
    ticks: u64,

    /// Tick interval in milliseconds (overrides DAO_TICK_MS)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// RNG seed (overrides DAO_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(tick_ms) = args.tick_ms {
        config.tick_interval_ms = tick_ms.max(1);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    init_tracing(&config)?;

    let rules = config.rules();
    let scenario = match (&args.scenario_file, &args.scenario) {
        (Some(path), _) => Scenario::from_json_file(path)?,
        (None, ScenarioType::Crossing) => create_crossing_scenario(&rules.dock_grid),
        (None, ScenarioType::Dispersal) => create_dispersal_scenario(&rules.dock_grid),
        (None, ScenarioType::Emergency) => create_emergency_scenario(&rules.dock_grid),
    };
    tracing::info!(
        "Scenario {} ({} steps), seed {}, {} ticks",
        scenario.name,
        scenario.steps.len(),
        config.seed,
        args.ticks
    );

    let store = FleetStore::new(rules, config.seed, Utc::now());
    let (command_tx, command_rx) = mpsc::channel(64);
    let (snapshot_tx, mut snapshot_rx) = watch::channel(store.snapshot());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let sim = tokio::spawn(run_sim_loop(
        store,
        config.tick_interval(),
        command_rx,
        snapshot_tx,
        shutdown_rx,
    ));

    for step in scenario.steps_between(None, 0) {
        command_tx.send(step.command.clone()).await?;
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last_tick = 0;

    while last_tick < args.ticks {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let tick = snapshot_rx.borrow_and_update().tick;
                if tick <= last_tick {
                    continue;
                }
                for step in scenario.steps_between(Some(last_tick), tick) {
                    command_tx.send(step.command.clone()).await?;
                }
                last_tick = tick;
            }
        }
    }

    let _ = shutdown_tx.send(());
    let store = sim.await?;
    let snapshot = store.snapshot();

    if args.json {
        println!("{}", snapshot.to_json_pretty()?);
    } else {
        print_summary(&snapshot);
    }

    Ok(())
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("dao_sim=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
    Ok(())
}

fn print_summary(snapshot: &FleetSnapshot) {
    println!("\nTick {} @ {}", snapshot.tick, snapshot.clock.format("%H:%M:%S"));
    println!(
        "{:<10} {:<10} {:<10} {:>7} {:>5} {:>4}  position",
        "drone", "status", "phase", "battery", "layer", "quad"
    );
    for v in &snapshot.vehicles {
        println!(
            "{:<10} {:<10} {:<10} {:>6.1}% {:>5} {:>4}  {}",
            v.name,
            format!("{:?}", v.status).to_lowercase(),
            v.operation_phase.to_string(),
            v.battery,
            v.current_layer.get(),
            v.quadrant.to_string(),
            v.position
        );
    }

    println!("\nAlerts ({} open):", snapshot.open_alert_count());
    for alert in &snapshot.alerts {
        println!(
            "  [{}] {:?} {}{}",
            alert.timestamp.format("%H:%M:%S"),
            alert.severity,
            alert.message,
            if alert.resolved { " (resolved)" } else { "" }
        );
    }

    let m = &snapshot.metrics;
    println!("\nThroughput:          {:.1} ops/h", m.operational_throughput);
    println!("Average wait:        {:.1} s", m.average_wait_time);
    println!("Path efficiency:     {:.1}%", m.path_efficiency);
    println!("Collision avoidance: {}", m.collision_avoidance_events);
    println!("Utilization:         {:.1}%", m.system_utilization);
}
