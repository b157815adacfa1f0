use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use tracing::debug;

use chatwire_core::{
    ChatConfig, ChatError, RequestMetadata, SanitizedHistoryEntry, TransportMode, Turn,
};

use super::{error_for_status, json_headers, require_endpoint};
use crate::decode::read_reply;
use crate::history::sanitize;
use crate::transport::ChatTransport;

/// Wall-clock bound on a webhook request, up to response headers.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookEnvelope<'a> {
    session_id: &'a str,
    message: &'a str,
    metadata: &'a RequestMetadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    history: Vec<SanitizedHistoryEntry>,
}

/// Plain webhook delivery: one POST, one JSON-ish reply, hard timeout.
pub struct WebhookTransport {
    client: reqwest::Client,
    endpoint: Option<String>,
    secret_header: Option<(String, String)>,
    session_id: String,
    metadata: RequestMetadata,
    timeout: Duration,
}

impl WebhookTransport {
    pub fn new(
        client: reqwest::Client,
        config: &ChatConfig,
        session_id: String,
        metadata: RequestMetadata,
    ) -> Self {
        Self {
            client,
            endpoint: config.webhook_url.clone(),
            secret_header: config
                .webhook_secret_header()
                .map(|(n, v)| (n.to_string(), v.to_string())),
            session_id,
            metadata,
            timeout: WEBHOOK_TIMEOUT,
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn headers(&self) -> Result<reqwest::header::HeaderMap, ChatError> {
        let mut headers = json_headers();
        if let Some((name, value)) = &self.secret_header {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ChatError::Config(format!("invalid webhook header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ChatError::Config(format!("invalid webhook header value: {}", e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl ChatTransport for WebhookTransport {
    async fn send(&self, message: &str, turns: &[Turn]) -> Result<String, ChatError> {
        let endpoint = require_endpoint(self.endpoint.as_deref(), "CHAT_WEBHOOK_URL")?;
        let headers = self.headers()?;

        let envelope = WebhookEnvelope {
            session_id: &self.session_id,
            message,
            metadata: &self.metadata,
            history: sanitize(turns),
        };

        debug!(url = %endpoint, history = envelope.history.len(), "webhook request");

        let request = self.client.post(endpoint).headers(headers).json(&envelope).send();

        // Dropping the future on expiry aborts the in-flight request.
        let response = match tokio::time::timeout(self.timeout, request).await {
            Err(_) => return Err(ChatError::Timeout(self.timeout)),
            Ok(Err(e)) if e.is_timeout() => return Err(ChatError::Timeout(self.timeout)),
            Ok(result) => result?,
        };

        let response = error_for_status(response).await?;
        Ok(read_reply(response).await)
    }

    fn mode(&self) -> TransportMode {
        TransportMode::Webhook
    }
}
