//! Domain errors raised by the queue and scheduler before any mutation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("capacity must be non-negative, got {0}")]
    NegativeCapacity(i64),

    #[error("capacity {0} cannot be allocated")]
    CapacityTooLarge(i64),

    #[error("quantum must be positive, got {0}")]
    NonPositiveQuantum(i64),
}

impl SchedulerError {
    /// Reason code used when the dispatcher reports this error as a log line.
    pub fn reason(&self) -> &'static str {
        match self {
            SchedulerError::NegativeCapacity(_) | SchedulerError::CapacityTooLarge(_) => {
                "invalid_capacity"
            }
            SchedulerError::NonPositiveQuantum(_) => "invalid_quantum",
        }
    }
}
