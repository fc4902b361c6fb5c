//! Scheduler error types.

use thiserror::Error;

/// Errors that can occur during scheduling operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("reject-leader label property is empty")]
    EmptyLabelProperty,

    #[error("cluster state error: {0}")]
    Cluster(#[from] anyhow::Error),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
