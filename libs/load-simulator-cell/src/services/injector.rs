use std::fmt;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use shared_config::{ErrorSelection, SimulatorConfig};

use super::pacing::pause;

/// Kind of synthetic failure applied to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    RateLimit,
    InvalidData,
    ServerError,
    Timeout,
}

impl FailureKind {
    /// Kinds in selection order with their share of injected errors.
    pub const WEIGHTED: [(FailureKind, f64); 4] = [
        (FailureKind::RateLimit, 0.4),
        (FailureKind::InvalidData, 0.3),
        (FailureKind::ServerError, 0.2),
        (FailureKind::Timeout, 0.1),
    ];

    /// Latency the failure imposes before the call is reported as failed.
    pub fn latency(&self) -> Duration {
        match self {
            FailureKind::RateLimit => Duration::from_millis(100),
            FailureKind::InvalidData => Duration::ZERO,
            FailureKind::ServerError => Duration::from_millis(200),
            FailureKind::Timeout => Duration::from_secs(2),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::RateLimit => "rate limit",
            FailureKind::InvalidData => "invalid data",
            FailureKind::ServerError => "server error",
            FailureKind::Timeout => "timeout",
        };
        f.write_str(label)
    }
}

/// Decides, independently per call, whether to fake a failure.
#[derive(Debug, Clone)]
pub struct ErrorInjector {
    rate: f64,
    selection: ErrorSelection,
    simulate_latency: bool,
}

impl ErrorInjector {
    /// `rate` is the probability in `[0, 1]` that a call is considered for
    /// failure.
    pub fn new(rate: f64, selection: ErrorSelection) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
            selection,
            simulate_latency: true,
        }
    }

    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(config.error_rate(), config.error_selection)
    }

    /// Never injects anything.
    pub fn disabled() -> Self {
        Self::new(0.0, ErrorSelection::Weighted)
    }

    /// Skip the per-kind latency; the decision itself is unchanged.
    pub fn without_latency(mut self) -> Self {
        self.simulate_latency = false;
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Pure decision for one call, driven by `rng`.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<FailureKind> {
        if self.rate <= 0.0 || rng.gen::<f64>() >= self.rate {
            return None;
        }

        match self.selection {
            ErrorSelection::Weighted => {
                let draw = rng.gen::<f64>();
                let mut cumulative = 0.0;
                for (kind, weight) in FailureKind::WEIGHTED {
                    cumulative += weight;
                    if draw < cumulative {
                        return Some(kind);
                    }
                }
                // Float rounding can leave the last sliver uncovered.
                Some(FailureKind::Timeout)
            }
            ErrorSelection::Cascade => FailureKind::WEIGHTED
                .iter()
                .find(|(_, weight)| rng.gen::<f64>() < *weight)
                .map(|(kind, _)| *kind),
        }
    }

    /// Rolls for one call and, on failure, waits out the kind's latency.
    pub async fn inject(&self) -> Option<FailureKind> {
        let failure = self.roll(&mut rand::thread_rng())?;

        debug!("Injecting {} failure", failure);
        if self.simulate_latency {
            pause(failure.latency()).await;
        }
        Some(failure)
    }
}
