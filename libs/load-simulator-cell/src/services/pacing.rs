use std::time::Duration;

use rand::Rng;
use shared_config::DelayRange;

/// Draws a delay uniformly from `range`.
pub fn sample_delay(range: &DelayRange) -> Duration {
    let (min, max) = range.bounds();
    if min == max {
        return min;
    }
    rand::thread_rng().gen_range(min..=max)
}

/// Sleeps for a delay drawn from `range`. Zero-length ranges return at once.
pub async fn think(range: &DelayRange) {
    pause(sample_delay(range)).await;
}

pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// True with probability `p`, clamped to `[0, 1]`.
pub fn chance(p: f64) -> bool {
    if p <= 0.0 {
        return false;
    }
    if p >= 1.0 {
        return true;
    }
    rand::thread_rng().gen_bool(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stays_within_range() {
        let range = DelayRange::millis(500, 2000);
        for _ in 0..1_000 {
            let delay = sample_delay(&range);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(2000));
        }
    }

    #[test]
    fn fixed_range_returns_exact_value() {
        assert_eq!(sample_delay(&DelayRange::ZERO), Duration::ZERO);
        assert_eq!(
            sample_delay(&DelayRange::fixed(Duration::from_secs(10))),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn chance_extremes() {
        assert!(!chance(0.0));
        assert!(chance(1.0));
        assert!(!chance(-1.0));
    }
}
