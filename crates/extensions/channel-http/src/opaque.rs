//! Fire-and-forget channel for collectors whose response cannot be read.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use leadrelay_protocols::{DeliveryChannel, DeliveryError, DeliveryReceipt, LeadPayload};

use crate::HttpTarget;

/// HTTP channel for cross-origin collectors (e.g. spreadsheet scripts) that do not
/// let the page read their response.
///
/// Any response, whatever its status, means the network path was open and counts
/// as delivered. The response is never read. Server-side acceptance cannot be
/// verified through this channel.
pub struct OpaqueChannel {
    id: String,
    target: HttpTarget,
    client: Client,
}

impl OpaqueChannel {
    pub fn new(id: impl Into<String>, target: HttpTarget) -> Result<Self, DeliveryError> {
        let client = target.client()?;
        Ok(Self {
            id: id.into(),
            target,
            client,
        })
    }
}

#[async_trait]
impl DeliveryChannel for OpaqueChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_observable(&self) -> bool {
        false
    }

    async fn send(&self, payload: &LeadPayload) -> Result<DeliveryReceipt, DeliveryError> {
        self.target
            .request(&self.client, payload)?
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        debug!(channel = %self.id, endpoint = %self.target.endpoint, "Lead sent (opaque)");
        Ok(DeliveryReceipt::new(&self.id, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadrelay_config::PayloadEncoding;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    fn lead() -> LeadPayload {
        let mut payload = LeadPayload::new();
        payload.insert("name", "Bob");
        payload
    }

    fn channel_for(uri: &str) -> OpaqueChannel {
        let target = HttpTarget::new(uri, PayloadEncoding::TextPlain).unwrap();
        OpaqueChannel::new("opaque-test", target).unwrap()
    }

    #[test]
    fn test_not_observable() {
        let channel = channel_for("https://script.example.com/exec");
        assert!(!channel.is_observable());
        assert_eq!(channel.id(), "opaque-test");
    }

    #[tokio::test]
    async fn test_send_as_text_plain_json() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::header("content-type", "text/plain;charset=utf-8"))
            .and(matchers::body_json(serde_json::json!({"name": "Bob"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let receipt = channel_for(&mock_server.uri()).send(&lead()).await.unwrap();
        assert_eq!(receipt.status, None);
    }

    #[tokio::test]
    async fn test_any_response_counts_as_delivered() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("script error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = channel_for(&mock_server.uri()).send(&lead()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        drop(mock_server);

        let err = channel_for(&uri).send(&lead()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Network(_)));
    }
}
