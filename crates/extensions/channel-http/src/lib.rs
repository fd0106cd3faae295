//! # leadrelay Channel - HTTP
//!
//! HTTP delivery channels for lead payloads.
//!
//! - [`InspectableChannel`] reads the response and rejects non-success statuses and
//!   error bodies.
//! - [`OpaqueChannel`] treats any response as delivered; only a request that never
//!   completes (DNS, refused connection, filtered network) is an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use leadrelay_config::{Config, PayloadEncoding};
use leadrelay_protocols::{DeliveryChannel, DeliveryError, LeadPayload};

mod encoding;
mod inspectable;
mod opaque;

pub use encoding::{EncodedBody, encode_payload};
pub use inspectable::InspectableChannel;
pub use opaque::OpaqueChannel;

/// Where and how a channel posts payloads.
#[derive(Debug, Clone)]
pub struct HttpTarget {
    pub endpoint: Url,
    pub encoding: PayloadEncoding,
    pub headers: HashMap<String, String>,
    pub form_name: Option<String>,
    pub timeout: Duration,
}

impl HttpTarget {
    pub fn new(endpoint: &str, encoding: PayloadEncoding) -> Result<Self, DeliveryError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| DeliveryError::Misconfigured(format!("invalid endpoint: {}", e)))?;
        Ok(Self {
            endpoint,
            encoding,
            headers: HashMap::new(),
            form_name: None,
            timeout: Duration::from_secs(30),
        })
    }

    /// Target described by the `[submission]` and `[channel]` sections.
    pub fn from_config(config: &Config) -> Result<Self, DeliveryError> {
        let mode = config.submission.channel_mode;
        let mut target = Self::new(
            &config.submission.endpoint,
            config.channel.effective_encoding(mode),
        )?;
        target.headers = config.channel.headers.clone();
        target.form_name = config.channel.form_name.clone();
        target.timeout = Duration::from_secs(config.channel.timeout_seconds);
        Ok(target)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_form_name(mut self, name: impl Into<String>) -> Self {
        self.form_name = Some(name.into());
        self
    }

    /// Parse the configured headers. Invalid names or values are a configuration
    /// problem, reported before anything is sent.
    fn header_map(&self) -> Result<HeaderMap, DeliveryError> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                DeliveryError::Misconfigured(format!("header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                DeliveryError::Misconfigured(format!("header '{}' value: {}", name, e))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    fn client(&self) -> Result<Client, DeliveryError> {
        Client::builder()
            .timeout(self.timeout)
            .default_headers(self.header_map()?)
            .build()
            .map_err(|e| DeliveryError::Misconfigured(format!("HTTP client: {}", e)))
    }

    /// Encode the payload and build the POST request. Custom headers come from the
    /// client defaults.
    fn request(
        &self,
        client: &Client,
        payload: &LeadPayload,
    ) -> Result<reqwest::RequestBuilder, DeliveryError> {
        let body = encode_payload(payload, self.encoding, self.form_name.as_deref())?;

        Ok(client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, body.content_type)
            .body(body.body))
    }
}

/// Build the channel matching the configured mode.
///
/// `best_effort` shares the opaque transport; the mode only changes how the
/// orchestrator treats the result.
pub fn channel_from_config(config: &Config) -> Result<Arc<dyn DeliveryChannel>, DeliveryError> {
    let target = HttpTarget::from_config(config)?;
    let channel: Arc<dyn DeliveryChannel> = if config.submission.channel_mode.is_observable() {
        Arc::new(InspectableChannel::new("inspectable-http", target)?)
    } else {
        Arc::new(OpaqueChannel::new("opaque-http", target)?)
    };
    Ok(channel)
}
