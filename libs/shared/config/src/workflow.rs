use std::time::Duration;

/// Inclusive range a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const ZERO: Self = Self::fixed(Duration::ZERO);

    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub const fn fixed(delay: Duration) -> Self {
        Self { min: delay, max: delay }
    }

    pub const fn secs(min: u64, max: u64) -> Self {
        Self::new(Duration::from_secs(min), Duration::from_secs(max))
    }

    pub const fn millis(min: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    /// Bounds in ascending order, tolerating a range written backwards.
    pub fn bounds(&self) -> (Duration, Duration) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }
}

/// Human pacing inserted around each workflow step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkTimes {
    pub session_start: DelayRange,
    pub after_register: DelayRange,
    pub after_login: DelayRange,
    pub after_profile: DelayRange,
    pub after_list: DelayRange,
    pub after_create: DelayRange,
    pub after_update: DelayRange,
    pub after_delete: DelayRange,
    /// Idle time after a session ends, before its slot is released.
    pub session_cooldown: DelayRange,
}

impl Default for ThinkTimes {
    fn default() -> Self {
        Self {
            session_start: DelayRange::secs(1, 3),
            after_register: DelayRange::secs(1, 2),
            after_login: DelayRange::secs(2, 4),
            after_profile: DelayRange::secs(1, 3),
            after_list: DelayRange::secs(2, 5),
            after_create: DelayRange::secs(3, 6),
            after_update: DelayRange::secs(2, 4),
            after_delete: DelayRange::secs(1, 3),
            session_cooldown: DelayRange::secs(5, 15),
        }
    }
}

impl ThinkTimes {
    pub fn instant() -> Self {
        Self {
            session_start: DelayRange::ZERO,
            after_register: DelayRange::ZERO,
            after_login: DelayRange::ZERO,
            after_profile: DelayRange::ZERO,
            after_list: DelayRange::ZERO,
            after_create: DelayRange::ZERO,
            after_update: DelayRange::ZERO,
            after_delete: DelayRange::ZERO,
            session_cooldown: DelayRange::ZERO,
        }
    }
}

/// Bounded retries shared by every recoverable step of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_schedule: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_schedule: vec![
                Duration::from_secs(2),
                Duration::from_secs(5),
                Duration::from_secs(10),
            ],
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry `attempt` (1-based). Attempts past the end of the
    /// schedule reuse its last entry.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let Some(last) = self.backoff_schedule.len().checked_sub(1) else {
            return Duration::ZERO;
        };
        let index = (attempt.saturating_sub(1) as usize).min(last);
        self.backoff_schedule[index]
    }

    pub fn is_exhausted(&self, retries: u32) -> bool {
        retries >= self.max_retries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub think_times: ThinkTimes,
    pub retry: RetryPolicy,
    /// Chance a session registers before logging in.
    pub registration_probability: f64,
    /// Gap between two session launches within a batch.
    pub launch_stagger: DelayRange,
    /// Pause between the end of one batch and the start of the next.
    pub batch_pause: DelayRange,
    /// Pause after a batch fails unexpectedly.
    pub error_pause: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            think_times: ThinkTimes::default(),
            retry: RetryPolicy::default(),
            registration_probability: 0.3,
            launch_stagger: DelayRange::millis(500, 2000),
            batch_pause: DelayRange::secs(10, 20),
            error_pause: Duration::from_secs(10),
        }
    }
}

impl WorkflowConfig {
    /// Same retry policy with every delay set to zero, for driving the
    /// workflow without wall-clock waits.
    pub fn instant() -> Self {
        Self {
            think_times: ThinkTimes::instant(),
            retry: RetryPolicy {
                max_retries: 3,
                backoff_schedule: vec![Duration::ZERO; 3],
            },
            registration_probability: 0.0,
            launch_stagger: DelayRange::ZERO,
            batch_pause: DelayRange::ZERO,
            error_pause: Duration::ZERO,
        }
    }
}
