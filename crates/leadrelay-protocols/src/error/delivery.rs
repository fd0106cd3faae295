//! Delivery channel errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Endpoint rejected submission: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Channel misconfigured: {0}")]
    Misconfigured(String),
}

impl DeliveryError {
    /// HTTP status attached to a rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error() {
        let err = DeliveryError::Network("dns failure".to_string());
        let display = err.to_string();
        assert!(display.contains("Network error"));
        assert!(display.contains("dns failure"));
    }

    #[test]
    fn test_rejected_error_carries_diagnostics() {
        let err = DeliveryError::Rejected {
            status: 422,
            body: "missing email".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("422"));
        assert!(display.contains("missing email"));
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_status_absent_for_other_variants() {
        assert_eq!(DeliveryError::Network("x".to_string()).status(), None);
        assert_eq!(DeliveryError::MalformedResponse("x".to_string()).status(), None);
    }

    #[test]
    fn test_all_error_variants() {
        let errors: Vec<DeliveryError> = vec![
            DeliveryError::Network("a".to_string()),
            DeliveryError::Rejected {
                status: 500,
                body: "b".to_string(),
            },
            DeliveryError::MalformedResponse("c".to_string()),
            DeliveryError::Encoding("d".to_string()),
            DeliveryError::Misconfigured("e".to_string()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
