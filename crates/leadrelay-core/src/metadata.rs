//! Contextual metadata attached to every lead.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

use leadrelay_protocols::payload::keys;
use leadrelay_protocols::{FormId, NavigationContext};

/// Reserved metadata keys mapped to their values.
pub type Metadata = BTreeMap<&'static str, String>;

/// Collects the fixed metadata record for a submission.
///
/// Pure and total: no I/O, never fails, and every key in [`keys::METADATA`] is
/// always present (empty string when unknown).
pub struct MetadataCollector;

impl MetadataCollector {
    /// Collect metadata stamped with the current time.
    pub fn collect(context: &NavigationContext, form: &FormId) -> Metadata {
        Self::collect_at(context, form, Utc::now())
    }

    /// Collect metadata stamped with `now`.
    pub fn collect_at(context: &NavigationContext, form: &FormId, now: DateTime<Utc>) -> Metadata {
        let mut metadata = Metadata::new();

        metadata.insert(keys::PAGE_URL, context.page_url.clone());
        metadata.insert(keys::REFERRER, context.referrer.clone().unwrap_or_default());

        let query = campaign_params(&context.page_url);
        for &param in keys::CAMPAIGN_PARAMS {
            let value = query.get(param).cloned().unwrap_or_default();
            metadata.insert(param, value);
        }

        metadata.insert(keys::USER_AGENT, context.user_agent.clone());
        metadata.insert(keys::LANG, context.lang.clone());
        metadata.insert(
            keys::TIMESTAMP,
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        metadata.insert(keys::FORM_ID, form.to_string());

        metadata
    }
}

/// First value of each campaign parameter in the page URL's query string.
fn campaign_params(page_url: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    let Ok(url) = Url::parse(page_url) else {
        return params;
    };
    for (key, value) in url.query_pairs() {
        if keys::CAMPAIGN_PARAMS.contains(&key.as_ref()) {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    params
}
