use thiserror::Error;

use shared_client::ServiceError;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("{failed} of {launched} session tasks in batch {batch} did not finish cleanly")]
    BatchIncomplete {
        batch: u64,
        launched: usize,
        failed: usize,
    },

    #[error("Service client error: {0}")]
    Client(#[from] ServiceError),
}
