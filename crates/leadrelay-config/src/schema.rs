//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub submission: SubmissionConfig,

    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How the delivery channel is used and how its result drives navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    /// Read the response; redirect only on confirmed acceptance.
    Inspectable,
    /// Cross-origin, unreadable response; redirect when the request went out.
    #[default]
    Opaque,
    /// Redirect after a short delay whatever the delivery result.
    BestEffort,
}

impl ChannelMode {
    pub fn is_observable(&self) -> bool {
        matches!(self, Self::Inspectable)
    }
}

/// Wire encoding of the payload body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// JSON with `application/json`.
    Json,
    /// JSON sent as `text/plain`, which cross-origin collectors accept without a
    /// preflight.
    TextPlain,
    /// `application/x-www-form-urlencoded`, repeating keys for multi-valued fields.
    FormUrlencoded,
}

impl PayloadEncoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::TextPlain => "text/plain;charset=utf-8",
            Self::FormUrlencoded => "application/x-www-form-urlencoded",
        }
    }
}

/// Submission engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Collection endpoint URL.
    #[serde(default)]
    pub endpoint: String,

    /// Where the user goes after a successful submission.
    #[serde(default = "default_success_url")]
    pub success_url: String,

    #[serde(default)]
    pub channel_mode: ChannelMode,

    /// Budget for the whole attempt (enrichment + delivery).
    #[serde(default = "default_global_timeout_ms")]
    pub global_timeout_ms: u64,

    /// Budget for the enrichment lookup; must be below the global timeout.
    #[serde(default = "default_enrichment_timeout_ms")]
    pub enrichment_timeout_ms: u64,

    #[serde(default)]
    pub enable_enrichment: bool,

    /// Wait before redirecting in `best_effort` mode.
    #[serde(default = "default_best_effort_delay_ms")]
    pub best_effort_delay_ms: u64,

    #[serde(default = "default_error_message")]
    pub error_message: String,

    /// Manual contact channel offered when delivery fails.
    #[serde(default)]
    pub fallback_contact: Option<String>,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            success_url: default_success_url(),
            channel_mode: ChannelMode::default(),
            global_timeout_ms: default_global_timeout_ms(),
            enrichment_timeout_ms: default_enrichment_timeout_ms(),
            enable_enrichment: false,
            best_effort_delay_ms: default_best_effort_delay_ms(),
            error_message: default_error_message(),
            fallback_contact: None,
        }
    }
}

impl SubmissionConfig {
    pub fn global_timeout(&self) -> Duration {
        Duration::from_millis(self.global_timeout_ms)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_millis(self.enrichment_timeout_ms)
    }

    pub fn best_effort_delay(&self) -> Duration {
        Duration::from_millis(self.best_effort_delay_ms)
    }

    /// Message shown on a recoverable failure, with the fallback contact appended.
    pub fn user_error_message(&self) -> String {
        match self.fallback_contact.as_deref() {
            Some(contact) if !contact.trim().is_empty() => {
                format!("{} Or contact us via {}", self.error_message.trim_end(), contact)
            }
            _ => self.error_message.clone(),
        }
    }
}

fn default_success_url() -> String {
    "/thanks/".to_string()
}

fn default_global_timeout_ms() -> u64 {
    10_000
}

fn default_enrichment_timeout_ms() -> u64 {
    2_000
}

fn default_best_effort_delay_ms() -> u64 {
    1_500
}

fn default_error_message() -> String {
    "Failed to submit. Please try again.".to_string()
}

/// Delivery channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Body encoding; defaults per channel mode.
    #[serde(default)]
    pub encoding: Option<PayloadEncoding>,

    /// Extra request headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Hosted-forms name, sent as a leading `form-name` field with form encoding.
    #[serde(default)]
    pub form_name: Option<String>,

    /// Hard cap on one HTTP request, so an abandoned delivery does not linger.
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            encoding: None,
            headers: HashMap::new(),
            form_name: None,
            timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

impl ChannelConfig {
    /// The configured encoding, or the mode's default.
    pub fn effective_encoding(&self, mode: ChannelMode) -> PayloadEncoding {
        self.encoding.unwrap_or(if mode.is_observable() {
            PayloadEncoding::Json
        } else {
            PayloadEncoding::TextPlain
        })
    }
}

/// Enrichment provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_provider_url")]
    pub provider_url: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            provider_url: default_provider_url(),
        }
    }
}

fn default_provider_url() -> String {
    "https://ipapi.co/json/".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file directory; `~` is expanded.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Write a rotating log file in addition to the console.
    #[serde(default = "default_true")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file: default_true(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
