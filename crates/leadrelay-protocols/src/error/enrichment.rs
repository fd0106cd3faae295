//! Enrichment errors.
//!
//! These never leave an [`EnrichmentProvider`](crate::EnrichmentProvider): providers log
//! them and fall back to placeholder values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Lookup request failed: {0}")]
    Network(String),

    #[error("Malformed lookup response: {0}")]
    Malformed(String),

    #[error("Lookup timed out after {0} ms")]
    Timeout(u64),
}
