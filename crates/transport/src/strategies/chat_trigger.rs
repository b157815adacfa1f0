use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use chatwire_core::{ChatConfig, ChatError, RequestMetadata, TransportMode, Turn};

use super::{error_for_status, json_headers, require_endpoint};
use crate::decode::{content_type_of, read_reply};
use crate::history::sanitize;
use crate::stream::{accumulate, StreamOutcome};
use crate::transport::ChatTransport;

const SEND_MESSAGE_ACTION: &str = "sendMessage";

/// How the streaming attempt ended.
#[derive(Debug, PartialEq)]
enum StreamAttempt {
    /// A reply was obtained, streamed or not.
    Reply(String),
    /// Unusable; the caller issues one non-streaming request instead.
    Fallback(String),
}

/// Chat-trigger delivery with configurable envelope field names and an
/// optional streaming attempt.
///
/// No timeout is applied here; the HTTP client's own limits govern.
pub struct ChatTriggerTransport {
    client: reqwest::Client,
    endpoint: Option<String>,
    input_key: String,
    session_key: String,
    streaming: bool,
    session_id: String,
    metadata: RequestMetadata,
}

impl ChatTriggerTransport {
    pub fn new(
        client: reqwest::Client,
        config: &ChatConfig,
        session_id: String,
        metadata: RequestMetadata,
    ) -> Self {
        Self {
            client,
            endpoint: config.chat_trigger_url.clone(),
            input_key: config.chat_input_key.clone(),
            session_key: config.chat_session_key.clone(),
            streaming: config.streaming,
            session_id,
            metadata,
        }
    }

    fn envelope(&self, message: &str, turns: &[Turn]) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("action".into(), json!(SEND_MESSAGE_ACTION));
        body.insert(self.input_key.clone(), json!(message));
        body.insert(self.session_key.clone(), json!(self.session_id));
        body.insert("metadata".into(), json!(self.metadata));
        let history = sanitize(turns);
        if !history.is_empty() {
            body.insert("history".into(), json!(history));
        }
        body
    }

    async fn send_streaming(&self, endpoint: &str, mut body: Map<String, Value>) -> StreamAttempt {
        body.insert("stream".into(), json!(true));

        let response = match self
            .client
            .post(endpoint)
            .headers(json_headers())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return StreamAttempt::Fallback(e.to_string()),
        };

        if !response.status().is_success() {
            return StreamAttempt::Fallback(format!("HTTP {}", response.status().as_u16()));
        }

        let content_type = content_type_of(&response);
        if !content_type.contains("text/event-stream") && !content_type.contains("text/plain") {
            debug!(content_type = %content_type, "server did not stream, decoding as a single reply");
            return StreamAttempt::Reply(read_reply(response).await);
        }

        match accumulate(response.bytes_stream()).await {
            StreamOutcome::Usable(text) => StreamAttempt::Reply(text),
            StreamOutcome::Empty => StreamAttempt::Fallback("stream ended without text".into()),
            StreamOutcome::Errored(e) => StreamAttempt::Fallback(e),
        }
    }

    async fn send_plain(&self, endpoint: &str, body: &Map<String, Value>) -> Result<String, ChatError> {
        let response = self
            .client
            .post(endpoint)
            .headers(json_headers())
            .json(body)
            .send()
            .await?;
        let response = error_for_status(response).await?;
        Ok(read_reply(response).await)
    }
}

#[async_trait]
impl ChatTransport for ChatTriggerTransport {
    async fn send(&self, message: &str, turns: &[Turn]) -> Result<String, ChatError> {
        let endpoint = require_endpoint(self.endpoint.as_deref(), "CHAT_TRIGGER_URL")?;
        let body = self.envelope(message, turns);

        debug!(url = %endpoint, streaming = self.streaming, "chat trigger request");

        if self.streaming {
            match self.send_streaming(endpoint, body.clone()).await {
                StreamAttempt::Reply(reply) => return Ok(reply),
                StreamAttempt::Fallback(reason) => {
                    warn!(reason = %reason, "streaming reply unusable, retrying without streaming");
                }
            }
        }

        self.send_plain(endpoint, &body).await
    }

    fn mode(&self) -> TransportMode {
        TransportMode::ChatTrigger
    }
}
