use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use shared_config::WorkflowConfig;
use shared_models::{AuthToken, Product, SimulatedUser};

use crate::models::{SessionOutcome, SessionReport, SessionState};
use crate::services::catalog::{product_update, SampleCatalog};
use crate::services::client::ClientAdapter;
use crate::services::pacing::{chance, pause, think};

/// Per-run state of one simulated user. Never shared between tasks.
struct UserSession {
    user: SimulatedUser,
    token: Option<AuthToken>,
    products: Vec<Product>,
    products_created: usize,
    retry_count: u32,
    path: Vec<SessionState>,
}

impl UserSession {
    fn new(user: SimulatedUser) -> Self {
        Self {
            user,
            token: None,
            products: Vec::new(),
            products_created: 0,
            retry_count: 0,
            path: Vec::new(),
        }
    }
}

/// Walks one user through register, login, profile, listing and a
/// create/update/delete cycle, retrying the critical steps with backoff.
pub struct SessionWorkflow {
    client: ClientAdapter,
    catalog: Arc<SampleCatalog>,
    config: Arc<WorkflowConfig>,
}

impl SessionWorkflow {
    pub fn new(client: ClientAdapter, catalog: Arc<SampleCatalog>, config: Arc<WorkflowConfig>) -> Self {
        Self {
            client,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Runs a full session for `user_id`, including the cool-down that
    /// follows it.
    pub async fn run(&self, user_id: u32) -> SessionReport {
        self.run_session(Uuid::new_v4(), SimulatedUser::new(user_id))
            .await
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn run_session(&self, session_id: Uuid, user: SimulatedUser) -> SessionReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut session = UserSession::new(user);

        let mut state = SessionState::Start;
        while !state.is_terminal() {
            session.path.push(state);
            state = self.step(&mut session, state).await;
        }
        session.path.push(state);
        session.token = None;

        let outcome = if state == SessionState::Done {
            info!("{}: Session completed successfully", user);
            SessionOutcome::Completed
        } else {
            error!(
                "{}: Session failed after {} retries",
                user, self.config.retry.max_retries
            );
            SessionOutcome::Abandoned
        };

        let report = SessionReport {
            session_id,
            user_id: user.id,
            outcome,
            retries: session.retry_count,
            path: session.path,
            products_created: session.products_created,
            products_held: session.products.len(),
            started_at,
            elapsed: start.elapsed(),
        };

        think(&self.config.think_times.session_cooldown).await;
        report
    }

    async fn step(&self, session: &mut UserSession, state: SessionState) -> SessionState {
        let user = session.user;
        let think_times = &self.config.think_times;

        match state {
            SessionState::Start => {
                think(&think_times.session_start).await;
                if chance(self.config.registration_probability) {
                    SessionState::Register
                } else {
                    SessionState::Login
                }
            }
            SessionState::Register => {
                if self.client.register(&user).await.is_none() {
                    warn!("{}: Registration failed, will try login", user);
                }
                think(&think_times.after_register).await;
                SessionState::Login
            }
            SessionState::Login => match self.client.login(&user).await {
                Some(token) => {
                    session.token = Some(token);
                    think(&think_times.after_login).await;
                    SessionState::Profile
                }
                None => {
                    warn!("{}: Login failed, retrying...", user);
                    self.retry(session).await
                }
            },
            SessionState::Profile => {
                let Some(token) = session.token.clone() else {
                    return SessionState::Login;
                };
                if self.client.fetch_profile(&user, &token).await.is_none() {
                    warn!("{}: Profile retrieval failed, continuing with other operations", user);
                }
                think(&think_times.after_profile).await;
                SessionState::ListProducts
            }
            SessionState::ListProducts => {
                let token = session.token.clone();
                match self.client.list_products(&user, token.as_ref()).await {
                    Some(products) => {
                        debug!("{}: {} products listed", user, products.len());
                        think(&think_times.after_list).await;
                        SessionState::CreateProduct
                    }
                    None => {
                        warn!("{}: Product listing failed, retrying...", user);
                        self.retry(session).await
                    }
                }
            }
            SessionState::CreateProduct => {
                let Some(token) = session.token.clone() else {
                    return SessionState::Login;
                };
                let product = self.catalog.pick();
                match self.client.create_product(&user, &token, &product).await {
                    Some(created) => {
                        session.products.push(created);
                        session.products_created += 1;
                        think(&think_times.after_create).await;
                        SessionState::UpdateProduct
                    }
                    None => {
                        warn!("{}: Product creation failed, retrying...", user);
                        self.retry(session).await
                    }
                }
            }
            SessionState::UpdateProduct => {
                match (session.token.clone(), session.products.last()) {
                    (Some(token), Some(product)) => {
                        let update = product_update(product);
                        let product_id = product.id;
                        if self
                            .client
                            .update_product(&user, &token, product_id, &update)
                            .await
                            .is_none()
                        {
                            warn!("{}: Product update failed for ID {}", user, product_id);
                        }
                        think(&think_times.after_update).await;
                    }
                    _ => warn!("{}: No product to update, skipping", user),
                }
                SessionState::DeleteProduct
            }
            SessionState::DeleteProduct => {
                match (session.token.clone(), session.products.last().map(|p| p.id)) {
                    (Some(token), Some(product_id)) => {
                        if self.client.delete_product(&user, &token, product_id).await {
                            session.products.retain(|p| p.id != product_id);
                        } else {
                            warn!("{}: Product deletion failed for ID {}", user, product_id);
                        }
                        think(&think_times.after_delete).await;
                    }
                    _ => warn!("{}: No product to delete, skipping", user),
                }
                SessionState::Done
            }
            SessionState::Done | SessionState::Failed => state,
        }
    }

    /// Counts a retry, waits out its backoff and sends the session back to
    /// login, or fails it once the retry budget is spent.
    async fn retry(&self, session: &mut UserSession) -> SessionState {
        session.retry_count += 1;
        let retry = &self.config.retry;

        pause(retry.backoff_for(session.retry_count)).await;

        if retry.is_exhausted(session.retry_count) {
            SessionState::Failed
        } else {
            debug!(
                "{}: Retry {}/{} from login",
                session.user, session.retry_count, retry.max_retries
            );
            SessionState::Login
        }
    }
}
