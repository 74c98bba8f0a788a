use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use load_simulator_cell::{ErrorInjector, FailureKind};
use shared_config::ErrorSelection;

const ROLLS: usize = 200_000;

fn injected_fraction(injector: &ErrorInjector, seed: u64) -> f64 {
    let mut rng = StdRng::seed_from_u64(seed);
    let injected = (0..ROLLS).filter(|_| injector.roll(&mut rng).is_some()).count();
    injected as f64 / ROLLS as f64
}

#[test]
fn test_weighted_fraction_converges_to_rate() {
    for (seed, percentage) in [(1, 2.0), (2, 10.0), (3, 50.0), (4, 90.0)] {
        let rate = percentage / 100.0;
        let injector = ErrorInjector::new(rate, ErrorSelection::Weighted);

        let fraction = injected_fraction(&injector, seed);

        assert!(
            (fraction - rate).abs() < 0.01,
            "rate {} produced fraction {}",
            rate,
            fraction
        );
    }
}

#[test]
fn test_cascade_fraction_falls_through() {
    let rate = 0.5;
    let injector = ErrorInjector::new(rate, ErrorSelection::Cascade);
    let miss_all = 0.6 * 0.7 * 0.8 * 0.9;

    let fraction = injected_fraction(&injector, 11);

    assert!((fraction - rate * (1.0 - miss_all)).abs() < 0.01, "fraction {}", fraction);
}

#[test]
fn test_weighted_kind_distribution() {
    let injector = ErrorInjector::new(1.0, ErrorSelection::Weighted);
    let mut rng = StdRng::seed_from_u64(21);
    let mut counts: HashMap<FailureKind, usize> = HashMap::new();

    for _ in 0..ROLLS {
        let kind = injector.roll(&mut rng).expect("full rate always injects");
        *counts.entry(kind).or_insert(0) += 1;
    }

    for (kind, weight) in FailureKind::WEIGHTED {
        let share = counts.get(&kind).copied().unwrap_or(0) as f64 / ROLLS as f64;
        assert!((share - weight).abs() < 0.01, "{} share {}", kind, share);
    }
}

#[test]
fn test_failure_latencies() {
    use std::time::Duration;

    assert_eq!(FailureKind::RateLimit.latency(), Duration::from_millis(100));
    assert_eq!(FailureKind::InvalidData.latency(), Duration::ZERO);
    assert_eq!(FailureKind::ServerError.latency(), Duration::from_millis(200));
    assert_eq!(FailureKind::Timeout.latency(), Duration::from_secs(2));
}

#[tokio::test]
async fn test_inject_without_latency_returns_immediately() {
    let injector = ErrorInjector::new(1.0, ErrorSelection::Weighted).without_latency();
    let start = std::time::Instant::now();

    for _ in 0..50 {
        assert!(injector.inject().await.is_some());
    }

    assert!(start.elapsed() < std::time::Duration::from_secs(1));
}
