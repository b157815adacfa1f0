use async_trait::async_trait;
use tracing::info;

use chatwire_core::{ChatConfig, ChatError, RequestMetadata, TransportMode, Turn};

use crate::strategies::create_transport;

/// A concrete protocol for delivering one message and receiving one reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `message` with `turns` as prior context and return the reply text.
    ///
    /// `turns` is the transcript before `message`; it is sanitized here.
    async fn send(&self, message: &str, turns: &[Turn]) -> Result<String, ChatError>;

    fn mode(&self) -> TransportMode;
}

/// Front door of the transport layer.
///
/// The delivery strategy is chosen once from config at construction and kept
/// for the lifetime of the client. Callers must not issue overlapping sends.
pub struct ChatClient {
    session_id: String,
    transport: Box<dyn ChatTransport>,
}

impl ChatClient {
    pub fn new(config: &ChatConfig, session_id: String, metadata: RequestMetadata) -> Self {
        let transport = create_transport(
            config,
            reqwest::Client::new(),
            session_id.clone(),
            metadata,
        );
        info!(mode = %transport.mode(), "chat transport selected");
        Self {
            session_id,
            transport,
        }
    }

    /// Wrap an already-built transport.
    pub fn with_transport(session_id: String, transport: Box<dyn ChatTransport>) -> Self {
        Self {
            session_id,
            transport,
        }
    }

    pub fn mode(&self) -> TransportMode {
        self.transport.mode()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn send(&self, message: &str, turns: &[Turn]) -> Result<String, ChatError> {
        self.transport.send(message, turns).await
    }
}
