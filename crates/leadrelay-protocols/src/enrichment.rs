//! Enrichment provider protocol.
//!
//! Enrichment is strictly best-effort. A provider enforces its own timeout and
//! turns every failure into placeholder values, so callers never see an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Value used when a lookup field could not be determined.
pub const PLACEHOLDER: &str = "unknown";

/// Contextual data looked up for the submitting visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub ip: String,
    pub country: String,
}

impl EnrichmentResult {
    pub fn new(ip: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            country: country.into(),
        }
    }

    /// Result standing in for a failed or timed-out lookup.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER, PLACEHOLDER)
    }

    pub fn is_placeholder(&self) -> bool {
        self.ip == PLACEHOLDER && self.country == PLACEHOLDER
    }
}

impl Default for EnrichmentResult {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Best-effort contextual lookup.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Look up enrichment data, finishing within `timeout`.
    ///
    /// Returns `None` when the provider does not enrich at all, and a placeholder
    /// result when a lookup was attempted and failed. Never blocks past `timeout`.
    async fn lookup(&self, timeout: Duration) -> Option<EnrichmentResult>;
}
