use std::sync::Arc;

use futures::future::join_all;
use rand::Rng;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};

use shared_client::{HttpServiceApi, ServiceApi};
use shared_config::SimulatorConfig;

use crate::error::SimulationError;
use crate::models::BatchReport;
use crate::services::catalog::SampleCatalog;
use crate::services::client::ClientAdapter;
use crate::services::injector::ErrorInjector;
use crate::services::pacing::{pause, sample_delay};
use crate::services::session::SessionWorkflow;

/// Receiving side of the stop request. Once triggered, no further sessions
/// or batches are started.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
    _held_sender: Option<Arc<watch::Sender<bool>>>,
}

impl ShutdownSignal {
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (sender, receiver) = watch::channel(false);
        (
            sender,
            Self {
                receiver,
                _held_sender: None,
            },
        )
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            receiver,
            _held_sender: Some(Arc::new(sender)),
        }
    }

    /// Dropping every sender counts as a stop request.
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }

    pub async fn triggered(&mut self) {
        let _ = self.receiver.wait_for(|stop| *stop).await;
    }
}

/// Launches batches of concurrent sessions until told to stop.
pub struct SimulationDriver {
    workflow: Arc<SessionWorkflow>,
    active_sessions: usize,
    user_pool_size: u32,
}

impl SimulationDriver {
    pub fn new(workflow: Arc<SessionWorkflow>, active_sessions: usize, user_pool_size: u32) -> Self {
        Self {
            workflow,
            active_sessions,
            user_pool_size: user_pool_size.max(1),
        }
    }

    /// Wires the driver to the real services described by `config`.
    pub fn from_config(config: &SimulatorConfig) -> Result<Self, SimulationError> {
        let api: Arc<dyn ServiceApi> = Arc::new(HttpServiceApi::new(config)?);
        Ok(Self::with_api(config, api))
    }

    /// Same wiring as `from_config` over any `ServiceApi`.
    pub fn with_api(config: &SimulatorConfig, api: Arc<dyn ServiceApi>) -> Self {
        let client = ClientAdapter::new(api, ErrorInjector::from_config(config));
        let workflow = SessionWorkflow::new(
            client,
            Arc::new(SampleCatalog::default()),
            Arc::new(config.workflow.clone()),
        );

        Self::new(
            Arc::new(workflow),
            config.active_sessions(),
            config.user_pool_size,
        )
    }

    pub fn active_sessions(&self) -> usize {
        self.active_sessions
    }

    /// Runs batches until `shutdown` fires and returns how many ran.
    pub async fn run(&self, mut shutdown: ShutdownSignal) -> u64 {
        info!(
            "Starting simulation with {} concurrent sessions per batch",
            self.active_sessions
        );

        let mut batches = 0;
        while !shutdown.is_triggered() {
            batches += 1;
            let delay = match self.run_batch(batches, &shutdown).await {
                Ok(report) => {
                    info!(
                        "Batch {} finished: {} launched, {} completed, {} abandoned in {:?}",
                        report.batch, report.launched, report.completed, report.abandoned, report.elapsed
                    );
                    sample_delay(&self.workflow.config().batch_pause)
                }
                Err(e) => {
                    error!("Error in simulation: {}", e);
                    self.workflow.config().error_pause
                }
            };

            tokio::select! {
                _ = pause(delay) => {}
                _ = shutdown.triggered() => {}
            }
        }

        info!("Simulation stopped after {} batches", batches);
        batches
    }

    /// Launches one batch, staggering each start, and waits for every
    /// session in it. A stop request ends launching early but still waits
    /// for the sessions already running.
    #[instrument(skip(self, shutdown))]
    pub async fn run_batch(&self, batch: u64, shutdown: &ShutdownSignal) -> Result<BatchReport, SimulationError> {
        let start = Instant::now();
        let mut report = BatchReport::new(batch, self.active_sessions);
        let mut handles = Vec::with_capacity(self.active_sessions);

        for _ in 0..self.active_sessions {
            if shutdown.is_triggered() {
                warn!("Stop requested, not launching remaining sessions");
                break;
            }

            let user_id = self.pick_user_id();
            let workflow = Arc::clone(&self.workflow);
            handles.push(tokio::spawn(async move { workflow.run(user_id).await }));

            let mut stop = shutdown.clone();
            tokio::select! {
                _ = pause(sample_delay(&self.workflow.config().launch_stagger)) => {}
                _ = stop.triggered() => {}
            }
        }
        report.launched = handles.len();

        let mut failed = 0;
        for result in join_all(handles).await {
            match result {
                Ok(session) => report.record(&session),
                Err(e) => {
                    error!("Session task ended abnormally: {}", e);
                    failed += 1;
                }
            }
        }
        report.elapsed = start.elapsed();

        if failed > 0 {
            return Err(SimulationError::BatchIncomplete {
                batch,
                launched: report.launched,
                failed,
            });
        }
        Ok(report)
    }

    fn pick_user_id(&self) -> u32 {
        rand::thread_rng().gen_range(1..=self.user_pool_size)
    }
}
