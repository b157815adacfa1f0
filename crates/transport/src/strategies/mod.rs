pub mod chat_trigger;
pub mod webhook;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use chatwire_core::{ChatConfig, ChatError, RequestMetadata, TransportMode};

use crate::transport::ChatTransport;

/// Create the delivery strategy selected by config.
///
/// Selection happens here, once; the returned transport never changes mode.
pub fn create_transport(
    config: &ChatConfig,
    client: reqwest::Client,
    session_id: String,
    metadata: RequestMetadata,
) -> Box<dyn ChatTransport> {
    match config.transport_mode() {
        TransportMode::ChatTrigger => Box::new(chat_trigger::ChatTriggerTransport::new(
            client, config, session_id, metadata,
        )),
        TransportMode::Webhook => Box::new(webhook::WebhookTransport::new(
            client, config, session_id, metadata,
        )),
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Resolve a configured endpoint, treating blank values as unset.
fn require_endpoint<'a>(endpoint: Option<&'a str>, env_key: &str) -> Result<&'a str, ChatError> {
    endpoint
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ChatError::Config(format!("{} is not set", env_key)))
}

/// Turn a non-success response into [`ChatError::Transport`], keeping its body.
async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ChatError::Transport {
        status: status.as_u16(),
        body,
    })
}
