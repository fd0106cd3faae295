//! Submission errors.

use thiserror::Error;

use super::DeliveryError;
use crate::channel::DeliveryOutcome;

/// Failure of one submission attempt.
///
/// Only `Transport` and `Timeout` are shown to the user. `Validation` never reaches
/// the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Form failed validation")]
    Validation,

    #[error("Delivery failed: {0}")]
    Transport(#[from] DeliveryError),

    #[error("Submission timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },
}

impl SubmissionError {
    /// The delivery outcome this error represents, if it came from the delivery stage.
    pub fn outcome(&self) -> Option<DeliveryOutcome> {
        match self {
            Self::Validation => None,
            Self::Transport(_) => Some(DeliveryOutcome::TransportError),
            Self::Timeout { .. } => Some(DeliveryOutcome::TimedOut),
        }
    }
}
