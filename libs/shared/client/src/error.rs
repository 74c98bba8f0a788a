use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status} (expected {expected}): {body}")]
    UnexpectedStatus {
        expected: u16,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl ServiceError {
    /// Status code of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::UnexpectedStatus { status, .. } => Some(*status),
            ServiceError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
