use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

mod workflow;

pub use workflow::{DelayRange, RetryPolicy, ThinkTimes, WorkflowConfig};

pub const DEFAULT_USER_SERVICE_URL: &str = "http://user-service:5001/api/users";
pub const DEFAULT_PRODUCT_SERVICE_URL: &str = "http://product-service:5002/api/products";

/// How an injected error roll is mapped to a failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSelection {
    /// One cumulative draw over the weights; an error roll always yields a kind.
    #[default]
    Weighted,
    /// Independent draw per kind in order; may fall through without failing.
    Cascade,
}

impl FromStr for ErrorSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" => Ok(Self::Weighted),
            "cascade" => Ok(Self::Cascade),
            other => Err(format!("unknown error selection mode: {}", other)),
        }
    }
}

impl fmt::Display for ErrorSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weighted => write!(f, "weighted"),
            Self::Cascade => write!(f, "cascade"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub user_service_url: String,
    pub product_service_url: String,
    pub load_percentage: u8,
    pub error_percentage: u8,
    pub max_users: u32,
    pub user_pool_size: u32,
    pub error_selection: ErrorSelection,
    pub request_timeout: Duration,
    pub workflow: WorkflowConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            user_service_url: DEFAULT_USER_SERVICE_URL.to_string(),
            product_service_url: DEFAULT_PRODUCT_SERVICE_URL.to_string(),
            load_percentage: 50,
            error_percentage: 2,
            max_users: 100,
            user_pool_size: 1000,
            error_selection: ErrorSelection::Weighted,
            request_timeout: Duration::from_secs(30),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            user_service_url: env::var("USER_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("USER_SERVICE_URL not set, using default");
                    defaults.user_service_url.clone()
                }),
            product_service_url: env::var("PRODUCT_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("PRODUCT_SERVICE_URL not set, using default");
                    defaults.product_service_url.clone()
                }),
            load_percentage: percentage_var("LOAD_PERCENTAGE", defaults.load_percentage),
            error_percentage: percentage_var("ERROR_PERCENTAGE", defaults.error_percentage),
            max_users: parsed_var("MAX_USERS", defaults.max_users),
            user_pool_size: parsed_var("USER_POOL_SIZE", defaults.user_pool_size).max(1),
            error_selection: parsed_var("ERROR_SELECTION", defaults.error_selection),
            request_timeout: timeout_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            workflow: defaults.workflow,
        };

        if !config.is_configured() {
            warn!("Simulator not fully configured - service URLs are empty");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.user_service_url.is_empty() && !self.product_service_url.is_empty()
    }

    /// Sessions launched per batch: the load share of the maximum population.
    pub fn active_sessions(&self) -> usize {
        (self.max_users as u64 * self.load_percentage as u64 / 100) as usize
    }

    /// Error rate as a probability in `[0, 1]`.
    pub fn error_rate(&self) -> f64 {
        f64::from(self.error_percentage) / 100.0
    }
}

fn parsed_var<T>(name: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn percentage_var(name: &str, default: u8) -> u8 {
    let value: u32 = parsed_var(name, u32::from(default));
    if value > 100 {
        warn!("{} is {}, clamping to 100", name, value);
        return 100;
    }
    value as u8
}

fn timeout_var(name: &str, default: Duration) -> Duration {
    match parsed_var(name, default.as_secs()) {
        0 => {
            warn!("{} must be at least 1 second, using default {}", name, default.as_secs());
            default
        }
        secs => Duration::from_secs(secs),
    }
}
