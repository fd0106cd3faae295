//! # leadrelay Enrichment - GeoIP
//!
//! Enrichment providers:
//!
//! - [`GeoIpProvider`] - looks up the visitor's IP and country from a JSON
//!   geolocation service, bounded by its own timeout.
//! - [`NoEnrichment`] - used when enrichment is disabled.

use std::sync::Arc;

use async_trait::async_trait;

use leadrelay_config::Config;
use leadrelay_protocols::{EnrichmentError, EnrichmentProvider, EnrichmentResult};

mod geoip;

pub use geoip::GeoIpProvider;

/// Provider that never enriches.
#[derive(Debug, Default)]
pub struct NoEnrichment;

#[async_trait]
impl EnrichmentProvider for NoEnrichment {
    fn id(&self) -> &str {
        "none"
    }

    async fn lookup(&self, _timeout: std::time::Duration) -> Option<EnrichmentResult> {
        None
    }
}

/// Build the provider selected by `submission.enable_enrichment`.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn EnrichmentProvider>, EnrichmentError> {
    if !config.submission.enable_enrichment {
        return Ok(Arc::new(NoEnrichment));
    }
    let provider = GeoIpProvider::new("geoip", &config.enrichment.provider_url)?;
    Ok(Arc::new(provider))
}
