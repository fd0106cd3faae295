//! Lead payload definitions.
//!
//! A [`LeadPayload`] is the flat record handed to a
//! [`DeliveryChannel`](crate::DeliveryChannel): form fields plus the reserved metadata
//! and enrichment keys listed in [`keys`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;

/// Reserved payload keys.
pub mod keys {
    pub const PAGE_URL: &str = "page_url";
    pub const REFERRER: &str = "referrer";
    pub const UTM_SOURCE: &str = "utm_source";
    pub const UTM_MEDIUM: &str = "utm_medium";
    pub const UTM_CAMPAIGN: &str = "utm_campaign";
    pub const UTM_CONTENT: &str = "utm_content";
    pub const UTM_TERM: &str = "utm_term";
    pub const GCLID: &str = "gclid";
    pub const FBCLID: &str = "fbclid";
    pub const USER_AGENT: &str = "user_agent";
    pub const LANG: &str = "lang";
    pub const TIMESTAMP: &str = "timestamp";
    pub const FORM_ID: &str = "form_id";
    pub const IP: &str = "ip";
    pub const COUNTRY: &str = "country";

    /// Campaign parameters read from the page URL query string, in payload order.
    pub const CAMPAIGN_PARAMS: &[&str] = &[
        UTM_SOURCE,
        UTM_MEDIUM,
        UTM_CAMPAIGN,
        UTM_CONTENT,
        UTM_TERM,
        GCLID,
        FBCLID,
    ];

    /// Keys always written by the metadata collector.
    pub const METADATA: &[&str] = &[
        PAGE_URL,
        REFERRER,
        UTM_SOURCE,
        UTM_MEDIUM,
        UTM_CAMPAIGN,
        UTM_CONTENT,
        UTM_TERM,
        GCLID,
        FBCLID,
        USER_AGENT,
        LANG,
        TIMESTAMP,
        FORM_ID,
    ];

    /// Keys written by enrichment, when it ran.
    pub const ENRICHMENT: &[&str] = &[IP, COUNTRY];

    /// Whether a form must not define a field under this name.
    pub fn is_reserved(key: &str) -> bool {
        METADATA.contains(&key) || ENRICHMENT.contains(&key)
    }
}

/// A single field value: one string, or an ordered list for repeated names
/// (e.g. checkboxes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// Append another value under the same name, promoting to a list.
    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Multiple(vec![first, value]);
            }
            Self::Multiple(values) => values.push(value),
        }
    }

    /// All values in submission order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// The value if this is a single string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(v) => Some(v),
            Self::Multiple(_) => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// The record sent for one submission attempt.
///
/// Built fresh per attempt and never mutated after it is handed to a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadPayload {
    fields: BTreeMap<String, FieldValue>,
}

impl LeadPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Shorthand for single-valued fields.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(FieldValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// JSON object form of the payload.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    FieldValue::Single(s) => serde_json::Value::String(s.clone()),
                    FieldValue::Multiple(vs) => serde_json::Value::Array(
                        vs.iter().cloned().map(serde_json::Value::String).collect(),
                    ),
                };
                (k.clone(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }

    /// Flattened `(name, value)` pairs for URL encoding. Multi-valued fields repeat
    /// their name once per value.
    pub fn to_form_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .flat_map(|(k, v)| v.values().into_iter().map(move |s| (k.clone(), s.to_string())))
            .collect()
    }
}
