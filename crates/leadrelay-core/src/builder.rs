//! Payload assembly.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use leadrelay_protocols::payload::keys;
use leadrelay_protocols::{EnrichmentProvider, EnrichmentResult, FormFields, LeadPayload, SubmitEvent};

use crate::metadata::{Metadata, MetadataCollector};

/// Builds the [`LeadPayload`] for a submission attempt.
///
/// Layers are applied in a fixed order: form fields, then metadata, then
/// enrichment. A later layer overwrites an earlier one on a key collision.
pub struct PayloadBuilder {
    enrichment: Arc<dyn EnrichmentProvider>,
    enrichment_timeout: Duration,
    enable_enrichment: bool,
}

impl PayloadBuilder {
    pub fn new(
        enrichment: Arc<dyn EnrichmentProvider>,
        enrichment_timeout: Duration,
        enable_enrichment: bool,
    ) -> Self {
        Self {
            enrichment,
            enrichment_timeout,
            enable_enrichment,
        }
    }

    /// Collect metadata, await enrichment once (if enabled) and merge everything.
    pub async fn build_for(&self, event: &SubmitEvent) -> LeadPayload {
        let metadata = MetadataCollector::collect(&event.context, &event.form_id);

        let enrichment = if self.enable_enrichment {
            let result = self.enrichment.lookup(self.enrichment_timeout).await;
            debug!(
                provider = %self.enrichment.id(),
                placeholder = result.as_ref().map(EnrichmentResult::is_placeholder),
                "Enrichment finished"
            );
            result
        } else {
            None
        };

        Self::build(&event.fields, &metadata, enrichment.as_ref())
    }

    /// Merge the three layers into a payload. Pure.
    pub fn build(
        fields: &FormFields,
        metadata: &Metadata,
        enrichment: Option<&EnrichmentResult>,
    ) -> LeadPayload {
        let mut payload = LeadPayload::new();

        for (name, value) in fields.iter() {
            if keys::is_reserved(name) {
                warn!(field = %name, "Form field uses a reserved key");
            }
            payload.insert(name.clone(), value.clone());
        }

        for (key, value) in metadata {
            if payload.insert(*key, value.as_str()).is_some() {
                debug!(key = %key, "Form field overwritten by metadata");
            }
        }

        if let Some(result) = enrichment {
            for (key, value) in [(keys::IP, &result.ip), (keys::COUNTRY, &result.country)] {
                if payload.insert(key, value.as_str()).is_some() {
                    debug!(key = %key, "Field overwritten by enrichment");
                }
            }
        }

        payload
    }
}
