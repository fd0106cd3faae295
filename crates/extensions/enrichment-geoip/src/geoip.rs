//! HTTP geolocation lookup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use leadrelay_protocols::enrichment::PLACEHOLDER;
use leadrelay_protocols::{EnrichmentError, EnrichmentProvider, EnrichmentResult};

#[cfg(test)]
#[path = "geoip_tests.rs"]
mod tests;

/// Field names tried, in order, for the visitor IP.
const IP_FIELDS: &[&str] = &["ip", "query"];

/// Field names tried, in order, for the country.
const COUNTRY_FIELDS: &[&str] = &["country_code", "countryCode", "country"];

/// Geolocation provider backed by a JSON endpoint such as `https://ipapi.co/json/`.
pub struct GeoIpProvider {
    id: String,
    url: Url,
    client: Client,
}

impl GeoIpProvider {
    pub fn new(id: impl Into<String>, url: &str) -> Result<Self, EnrichmentError> {
        let url = Url::parse(url)
            .map_err(|e| EnrichmentError::Network(format!("invalid provider URL: {}", e)))?;
        let client = Client::builder()
            .user_agent(concat!("leadrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;
        Ok(Self {
            id: id.into(),
            url,
            client,
        })
    }

    async fn fetch(&self, timeout: Duration) -> Result<EnrichmentResult, EnrichmentError> {
        let response = self
            .client
            .get(self.url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Network(format!("HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Malformed(e.to_string()))?;
        parse_lookup(&body)
    }
}

#[async_trait]
impl EnrichmentProvider for GeoIpProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn lookup(&self, timeout: Duration) -> Option<EnrichmentResult> {
        // Dropping the fetch future on expiry cancels the in-flight request.
        let outcome = match tokio::time::timeout(timeout, self.fetch(timeout)).await {
            Ok(result) => result,
            Err(_) => Err(EnrichmentError::Timeout(timeout.as_millis() as u64)),
        };

        match outcome {
            Ok(result) => {
                debug!(provider = %self.id, country = %result.country, "Enrichment lookup succeeded");
                Some(result)
            }
            Err(e) => {
                warn!(provider = %self.id, error = %e, "Enrichment lookup failed, using placeholders");
                Some(EnrichmentResult::placeholder())
            }
        }
    }
}

/// Extract IP and country from a lookup response.
fn parse_lookup(body: &Value) -> Result<EnrichmentResult, EnrichmentError> {
    let obj = body
        .as_object()
        .ok_or_else(|| EnrichmentError::Malformed("expected a JSON object".to_string()))?;

    if obj.get("error").and_then(Value::as_bool) == Some(true) {
        let reason = obj
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("unspecified");
        return Err(EnrichmentError::Malformed(format!("provider error: {}", reason)));
    }

    let first = |fields: &[&str]| {
        fields
            .iter()
            .filter_map(|f| obj.get(*f).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    };

    let ip = first(IP_FIELDS);
    let country = first(COUNTRY_FIELDS);
    if ip.is_none() && country.is_none() {
        return Err(EnrichmentError::Malformed(
            "response has neither ip nor country".to_string(),
        ));
    }

    Ok(EnrichmentResult::new(
        ip.unwrap_or_else(|| PLACEHOLDER.to_string()),
        country.unwrap_or_else(|| PLACEHOLDER.to_string()),
    ))
}
