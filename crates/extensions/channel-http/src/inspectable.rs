//! Channel that inspects the collector's response.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use leadrelay_protocols::{DeliveryChannel, DeliveryError, DeliveryReceipt, LeadPayload};

use crate::HttpTarget;

#[cfg(test)]
#[path = "inspectable_tests.rs"]
mod tests;

/// HTTP channel for collectors that allow reading their response.
///
/// A send succeeds only on a 2xx status whose body, when it is JSON, does not
/// report an error (`{"result": "error"}`, `{"status": "error"}`, `{"ok": false}`,
/// `{"success": false}`).
pub struct InspectableChannel {
    id: String,
    target: HttpTarget,
    client: Client,
}

impl InspectableChannel {
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
impl DeliveryChannel for InspectableChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_observable(&self) -> bool {
        true
    }

    async fn send(&self, payload: &LeadPayload) -> Result<DeliveryReceipt, DeliveryError> {
        let response = self
            .target
            .request(&self.client, payload)?
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(channel = %self.id, status = status.as_u16(), "Collector rejected lead");
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DeliveryError::MalformedResponse(e.to_string()))?;
        inspect_body(status.as_u16(), content_type.as_deref(), &body)?;

        debug!(channel = %self.id, endpoint = %self.target.endpoint, "Lead delivered");
        Ok(DeliveryReceipt::new(&self.id, Some(status.as_u16())))
    }
}

/// Check a 2xx response body for an application-level error.
fn inspect_body(status: u16, content_type: Option<&str>, body: &str) -> Result<(), DeliveryError> {
    if body.trim().is_empty() {
        return Ok(());
    }
    let is_json = content_type.is_some_and(|ct| ct.contains("json"));
    if !is_json {
        return Ok(());
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| DeliveryError::MalformedResponse(format!("invalid JSON body: {}", e)))?;

    if reports_error(&value) {
        return Err(DeliveryError::Rejected {
            status,
            body: body.to_string(),
        });
    }
    Ok(())
}

fn reports_error(value: &serde_json::Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let failed_word = |key: &str| {
        obj.get(key)
            .and_then(|v| v.as_str())
            .is_some_and(|s| matches!(s.to_ascii_lowercase().as_str(), "error" | "fail" | "failed"))
    };
    let false_flag = |key: &str| obj.get(key).and_then(|v| v.as_bool()) == Some(false);

    failed_word("result") || failed_word("status") || false_flag("ok") || false_flag("success")
}
