//! Best-effort reply extraction from responses of unknown shape.
//!
//! The supported backends do not agree on content-type headers or payload
//! shape, so decoding is an ordered chain of total steps. Nothing here fails;
//! the worst case is the raw body text or [`NO_REPLY`].

use serde_json::Value;
use tracing::{debug, warn};

/// Shown instead of an empty reply.
pub const NO_REPLY: &str = "(no reply)";

/// Fields that may carry the reply text, in priority order.
const REPLY_FIELDS: &[&str] = &["reply", "message", "text"];

/// A response body classified by whether it parses as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    Json(Value),
    Text(String),
}

impl DecodedBody {
    pub fn classify(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => DecodedBody::Json(value),
            Err(_) => DecodedBody::Text(body.to_string()),
        }
    }

    /// Reply text carried by a JSON body, if any.
    ///
    /// Objects yield their first present, non-null priority field; a bare
    /// JSON string literal yields its contents.
    pub fn reply_text(&self) -> Option<String> {
        match self {
            DecodedBody::Json(Value::Object(map)) => REPLY_FIELDS
                .iter()
                .filter_map(|field| map.get(*field))
                .find(|v| !v.is_null())
                .map(coerce_to_string),
            DecodedBody::Json(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Decode a reply from a declared content type and the raw body text.
pub fn decode(content_type: &str, body: &str) -> String {
    let reply = extract(content_type, body);
    if reply.trim().is_empty() {
        NO_REPLY.to_string()
    } else {
        reply
    }
}

fn extract(content_type: &str, body: &str) -> String {
    // Declared JSON and mislabelled JSON both go through the same extraction;
    // the header only decides whether a non-JSON body is worth a warning.
    let parsed = DecodedBody::classify(body);
    if is_json_content_type(content_type) {
        if let DecodedBody::Text(_) = parsed {
            debug!(content_type, "declared JSON body did not parse, using raw text");
        }
    }

    parsed.reply_text().unwrap_or_else(|| body.to_string())
}

/// Read and decode a response body.
///
/// A body that cannot be read is treated as empty.
pub async fn read_reply(response: reqwest::Response) -> String {
    let content_type = content_type_of(&response);
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "failed to read response body");
            String::new()
        }
    };
    decode(&content_type, &body)
}

/// Declared content type, or an empty string when absent or not valid text.
pub fn content_type_of(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}
