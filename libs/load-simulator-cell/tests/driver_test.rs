use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use tokio::time::{sleep, timeout};

use load_simulator_cell::*;
use shared_config::{DelayRange, SimulatorConfig};
use shared_models::Operation;
use shared_utils::test_utils::{Behavior, ScriptedServiceApi, TestConfig};

fn test_config(load_percentage: u8, max_users: u32) -> SimulatorConfig {
    TestConfig {
        load_percentage,
        max_users,
        ..TestConfig::default()
    }
    .to_simulator_config()
}

#[tokio::test]
async fn test_batch_size_follows_load_percentage() {
    let api = Arc::new(ScriptedServiceApi::new());
    let driver = SimulationDriver::with_api(&test_config(50, 100), api.clone());

    assert_eq!(driver.active_sessions(), 50);

    let report = driver.run_batch(1, &ShutdownSignal::never()).await.unwrap();

    assert_eq!(report.batch, 1);
    assert_eq!(report.target, 50);
    assert_eq!(report.launched, 50);
    assert_eq!(report.completed, 50);
    assert_eq!(report.abandoned, 0);
    assert_eq!(api.call_count(Operation::Login), 50);
    assert_eq!(api.call_count(Operation::DeleteProduct), 50);
}

#[tokio::test]
async fn test_batch_counts_abandoned_sessions() {
    let api = Arc::new(ScriptedServiceApi::failing(Operation::Login));
    let driver = SimulationDriver::with_api(&test_config(100, 4), api.clone());

    let report = driver.run_batch(3, &ShutdownSignal::never()).await.unwrap();

    assert_eq!(report.launched, 4);
    assert_eq!(report.completed, 0);
    assert_eq!(report.abandoned, 4);
    assert_eq!(api.call_count(Operation::Login), 12);
}

#[tokio::test]
async fn test_zero_load_launches_nothing() {
    let api = Arc::new(ScriptedServiceApi::new());
    let driver = SimulationDriver::with_api(&test_config(0, 100), api.clone());

    let report = driver.run_batch(1, &ShutdownSignal::never()).await.unwrap();

    assert_eq!(report.launched, 0);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_triggered_shutdown_stops_launching() {
    let api = Arc::new(ScriptedServiceApi::new());
    let driver = SimulationDriver::with_api(&test_config(100, 10), api.clone());
    let (stop, shutdown) = ShutdownSignal::channel();
    stop.send(true).unwrap();

    let report = driver.run_batch(1, &shutdown).await.unwrap();

    assert_eq!(report.launched, 0);
    assert_eq!(driver.run(shutdown).await, 0);
}

#[tokio::test]
async fn test_dropped_sender_counts_as_shutdown() {
    let (stop, shutdown) = ShutdownSignal::channel();
    assert!(!shutdown.is_triggered());

    drop(stop);

    assert!(shutdown.is_triggered());
}

#[tokio::test]
async fn test_run_repeats_batches_until_stopped() {
    let api = Arc::new(ScriptedServiceApi::new());
    let mut config = test_config(100, 2);
    config.workflow.batch_pause = DelayRange::millis(5, 5);
    let driver = Arc::new(SimulationDriver::with_api(&config, api.clone()));
    let (stop, shutdown) = ShutdownSignal::channel();

    let runner = {
        let driver = Arc::clone(&driver);
        tokio::spawn(async move { driver.run(shutdown).await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop.send(true).unwrap();

    let batches = timeout(Duration::from_secs(5), runner)
        .await
        .expect("driver should stop promptly")
        .unwrap();

    assert!(batches >= 2, "only {} batches ran", batches);
    assert_eq!(api.call_count(Operation::Login) as u64, batches * 2);
}

#[tokio::test(start_paused = true)]
async fn test_launches_are_staggered() {
    let api = Arc::new(ScriptedServiceApi::new());
    let mut config = test_config(100, 5);
    config.workflow.launch_stagger = DelayRange::millis(500, 2000);
    let driver = SimulationDriver::with_api(&config, api.clone());

    let report = driver.run_batch(1, &ShutdownSignal::never()).await.unwrap();

    assert_eq!(report.launched, 5);
    assert_eq!(report.completed, 5);
    // One stagger follows every launch.
    assert!(report.elapsed >= Duration::from_millis(2500), "{:?}", report.elapsed);
    assert!(report.elapsed <= Duration::from_secs(10), "{:?}", report.elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_batch_waits_for_every_session() {
    let api = Arc::new(ScriptedServiceApi::new());
    let mut config = test_config(100, 5);
    config.workflow.launch_stagger = DelayRange::millis(500, 2000);
    config.workflow.think_times.session_cooldown = DelayRange::secs(5, 5);
    let driver = SimulationDriver::with_api(&config, api.clone());

    let report = driver.run_batch(1, &ShutdownSignal::never()).await.unwrap();

    assert_eq!(report.completed, 5);
    assert_eq!(api.call_count(Operation::Login), 5);
    // The last launch comes after four staggers and still needs its cooldown.
    assert!(report.elapsed >= Duration::from_secs(7), "{:?}", report.elapsed);
    assert!(report.elapsed <= Duration::from_secs(13), "{:?}", report.elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_next_batch_starts_after_sessions_and_pause() {
    let api = Arc::new(ScriptedServiceApi::new());
    let mut config = test_config(100, 2);
    config.workflow.think_times.session_cooldown = DelayRange::secs(5, 5);
    config.workflow.batch_pause = DelayRange::secs(3, 3);
    let driver = Arc::new(SimulationDriver::with_api(&config, api.clone()));
    let (stop, shutdown) = ShutdownSignal::channel();

    let runner = {
        let driver = Arc::clone(&driver);
        tokio::spawn(async move { driver.run(shutdown).await })
    };

    sleep(Duration::from_millis(7900)).await;
    assert_eq!(api.call_count(Operation::Login), 2);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(api.call_count(Operation::Login), 4);

    stop.send(true).unwrap();
    assert_eq!(runner.await.unwrap(), 2);
}

#[tokio::test]
async fn test_panicking_session_fails_the_batch() {
    let api = Arc::new(ScriptedServiceApi::new().with(Operation::Login, Behavior::Panic));
    let driver = SimulationDriver::with_api(&test_config(100, 3), api.clone());

    let result = driver.run_batch(4, &ShutdownSignal::never()).await;

    assert_matches!(
        result,
        Err(SimulationError::BatchIncomplete {
            batch: 4,
            launched: 3,
            failed: 3
        })
    );
    assert_eq!(api.call_count(Operation::Login), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_batch_waits_error_pause() {
    let api = Arc::new(ScriptedServiceApi::new().with(Operation::Login, Behavior::Panic));
    let mut config = test_config(100, 2);
    config.workflow.batch_pause = DelayRange::secs(1, 1);
    config.workflow.error_pause = Duration::from_secs(10);
    let driver = Arc::new(SimulationDriver::with_api(&config, api.clone()));
    let (stop, shutdown) = ShutdownSignal::channel();

    let runner = {
        let driver = Arc::clone(&driver);
        tokio::spawn(async move { driver.run(shutdown).await })
    };

    sleep(Duration::from_millis(9900)).await;
    assert_eq!(api.call_count(Operation::Login), 2);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(api.call_count(Operation::Login), 4);

    stop.send(true).unwrap();
    assert_eq!(runner.await.unwrap(), 2);
}
