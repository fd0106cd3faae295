//! Delivery channel protocol definitions.
//!
//! A channel performs the network transmission of one [`LeadPayload`]. Two kinds
//! exist:
//!
//! - **Observable** channels read the response and reject non-success statuses or
//!   malformed bodies.
//! - **Opaque** channels cannot read the response. Any response at all counts as
//!   delivered; only a failure of the request itself is an error.
//!
//! Channels never retry. A blind retry through an opaque channel can create
//! duplicate leads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;
use crate::payload::LeadPayload;

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;

/// How a delivery attempt ended, as seen by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The transmission completed. For opaque channels the remote's processing
    /// result is unknown.
    Delivered,
    /// The global timeout fired first.
    TimedOut,
    /// The channel reported a failure.
    TransportError,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Delivered => "delivered",
            Self::TimedOut => "timed_out",
            Self::TransportError => "transport_error",
        };
        f.write_str(s)
    }
}

/// Proof of a completed transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub channel_id: String,
    /// Response status; `None` when the channel does not inspect responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub delivered_at: DateTime<Utc>,
}

impl DeliveryReceipt {
    pub fn new(channel_id: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            channel_id: channel_id.into(),
            status,
            delivered_at: Utc::now(),
        }
    }
}

/// Transport sending a payload to a remote collection endpoint.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Unique channel identifier, used in logs.
    fn id(&self) -> &str;

    /// Whether a successful `send` means the remote accepted the lead (`true`) or
    /// only that the request reached the network path (`false`).
    fn is_observable(&self) -> bool;

    /// Perform exactly one transmission attempt.
    async fn send(&self, payload: &LeadPayload) -> Result<DeliveryReceipt, DeliveryError>;
}
