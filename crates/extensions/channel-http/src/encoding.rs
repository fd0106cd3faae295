//! Payload body encodings.

use url::form_urlencoded;

use leadrelay_config::PayloadEncoding;
use leadrelay_protocols::{DeliveryError, LeadPayload};

/// Field carrying the hosted-forms name in form-encoded bodies.
const FORM_NAME_FIELD: &str = "form-name";

/// A request body with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: &'static str,
    pub body: String,
}

/// Encode a payload for the wire.
///
/// `form_name` is only used by [`PayloadEncoding::FormUrlencoded`], where it is sent
/// as the first pair.
pub fn encode_payload(
    payload: &LeadPayload,
    encoding: PayloadEncoding,
    form_name: Option<&str>,
) -> Result<EncodedBody, DeliveryError> {
    let body = match encoding {
        PayloadEncoding::Json | PayloadEncoding::TextPlain => serde_json::to_string(payload)
            .map_err(|e| DeliveryError::Encoding(e.to_string()))?,
        PayloadEncoding::FormUrlencoded => {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            if let Some(name) = form_name {
                serializer.append_pair(FORM_NAME_FIELD, name);
            }
            for (key, value) in payload.to_form_pairs() {
                serializer.append_pair(&key, &value);
            }
            serializer.finish()
        }
    };

    Ok(EncodedBody {
        content_type: encoding.content_type(),
        body,
    })
}
