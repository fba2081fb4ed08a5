//! Simulation loop integration tests.
//!
//! Runs the loop on a paused tokio clock so ticks advance instantly.

use std::time::Duration;

use chrono::Utc;
use dao_core::{AirspaceRules, FleetCommand, FleetSnapshot, FleetStore, OperationPhase, Position};
use dao_sim::loops::sim_loop::run_sim_loop;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

const INTERVAL: Duration = Duration::from_secs(1);

struct Harness {
    commands: mpsc::Sender<FleetCommand>,
    snapshots: watch::Receiver<FleetSnapshot>,
    shutdown: broadcast::Sender<()>,
    handle: JoinHandle<FleetStore>,
}

fn start(store: FleetStore) -> Harness {
    let (commands, command_rx) = mpsc::channel(16);
    let (snapshot_tx, snapshots) = watch::channel(store.snapshot());
    let (shutdown, shutdown_rx) = broadcast::channel(1);
    let handle = tokio::spawn(run_sim_loop(store, INTERVAL, command_rx, snapshot_tx, shutdown_rx));
    Harness {
        commands,
        snapshots,
        shutdown,
        handle,
    }
}

async fn wait_for_tick(snapshots: &mut watch::Receiver<FleetSnapshot>, tick: u64) {
    loop {
        if snapshots.borrow_and_update().tick >= tick {
            return;
        }
        snapshots.changed().await.expect("loop alive");
    }
}

fn new_store() -> FleetStore {
    FleetStore::new(AirspaceRules::default(), 42, Utc::now())
}

#[tokio::test(start_paused = true)]
async fn loop_ticks_and_applies_commands() {
    let mut harness = start(new_store());
    harness
        .commands
        .send(FleetCommand::PlanPath {
            vehicle_id: 1,
            target: Position::new(10.0, 10.0, 0.0),
        })
        .await
        .unwrap();

    wait_for_tick(&mut harness.snapshots, 5).await;
    let snapshot = harness.snapshots.borrow().clone();
    let vehicle = snapshot.vehicles.iter().find(|v| v.id == 1).unwrap();
    assert_eq!(vehicle.operation_phase, OperationPhase::Takeoff);
    assert!(vehicle.position.z > 0.0);

    harness.shutdown.send(()).unwrap();
    let store = harness.handle.await.unwrap();
    assert!(store.tick_count() >= 5);
}

#[tokio::test(start_paused = true)]
async fn rejected_commands_do_not_stop_the_loop() {
    let mut harness = start(new_store());
    harness
        .commands
        .send(FleetCommand::Emergency { vehicle_id: 99 })
        .await
        .unwrap();
    harness
        .commands
        .send(FleetCommand::ResolveAlert {
            alert_id: "alert-2".to_string(),
        })
        .await
        .unwrap();

    wait_for_tick(&mut harness.snapshots, 3).await;
    harness.shutdown.send(()).unwrap();
    let store = harness.handle.await.unwrap();

    assert_eq!(store.alerts().count(), 3);
    assert!(store.alert("alert-2").unwrap().resolved);
    assert!(!store.alert("alert-3").unwrap().resolved);
}

#[tokio::test(start_paused = true)]
async fn clock_follows_ticks_after_command_channel_closes() {
    let store = new_store();
    let start_clock = store.clock();
    let mut harness = start(store);
    drop(harness.commands);

    wait_for_tick(&mut harness.snapshots, 4).await;
    harness.shutdown.send(()).unwrap();
    let store = harness.handle.await.unwrap();

    let elapsed = store.clock() - start_clock;
    assert_eq!(elapsed.num_seconds() as u64, store.tick_count());
}
