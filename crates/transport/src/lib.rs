//! Conversation transport and history normalization.
//!
//! [`ChatClient`] picks one delivery strategy from [`ChatConfig`] and keeps
//! it. Each send sanitizes the transcript into replayable history, posts an
//! envelope, and decodes whatever shape of reply comes back.

pub mod decode;
pub mod history;
pub mod session;
pub mod strategies;
pub mod stream;
pub mod transport;

pub use chatwire_core::{ChatConfig, ChatError, RequestMetadata, TransportMode, Turn};
pub use decode::{decode, DecodedBody, NO_REPLY};
pub use history::sanitize;
pub use session::{get_or_create_session_id, FileStore, KeyValueStore, MemoryStore};
pub use stream::{accumulate, StreamOutcome};
pub use transport::{ChatClient, ChatTransport};
