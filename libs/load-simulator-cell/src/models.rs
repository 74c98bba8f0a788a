use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Steps of a simulated user session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Start,
    Register,
    Login,
    Profile,
    ListProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    Done,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done | SessionState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    /// Retries ran out before the workflow finished.
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub user_id: u32,
    pub outcome: SessionOutcome,
    pub retries: u32,
    /// States entered, in order, from `Start` to the terminal state.
    pub path: Vec<SessionState>,
    pub products_created: usize,
    pub products_held: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl SessionReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == SessionOutcome::Completed
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub batch: u64,
    pub target: usize,
    pub launched: usize,
    pub completed: usize,
    pub abandoned: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn new(batch: u64, target: usize) -> Self {
        Self {
            batch,
            target,
            ..Self::default()
        }
    }

    pub fn record(&mut self, report: &SessionReport) {
        match report.outcome {
            SessionOutcome::Completed => self.completed += 1,
            SessionOutcome::Abandoned => self.abandoned += 1,
        }
    }
}
