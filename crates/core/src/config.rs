use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::turn::TransportMode;

pub const DEFAULT_CHAT_INPUT_KEY: &str = "chatInput";
pub const DEFAULT_CHAT_SESSION_KEY: &str = "sessionId";
pub const DEFAULT_SESSION_STORAGE_KEY: &str = "chat.sid";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Read a profiled key: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_opt<F>(lookup: &F, profile: &str, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = non_empty(lookup(&prefixed)) {
            return Some(v);
        }
    }
    non_empty(lookup(key))
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn default_chat_input_key() -> String {
    DEFAULT_CHAT_INPUT_KEY.to_string()
}

fn default_chat_session_key() -> String {
    DEFAULT_CHAT_SESSION_KEY.to_string()
}

fn default_session_storage_key() -> String {
    DEFAULT_SESSION_STORAGE_KEY.to_string()
}

/// Static configuration of the transport layer.
///
/// Built once (from the environment, a TOML file, or both) and handed to the
/// client at construction. Core logic never reads the environment itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Plain webhook endpoint (`CHAT_WEBHOOK_URL`).
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Chat-trigger endpoint (`CHAT_TRIGGER_URL`). When set, selects chat-trigger mode.
    #[serde(default)]
    pub chat_trigger_url: Option<String>,

    /// Optional secret header sent with webhook requests.
    #[serde(default)]
    pub webhook_header_name: Option<String>,

    #[serde(default)]
    pub webhook_header_value: Option<String>,

    /// Envelope field carrying the message in chat-trigger mode.
    #[serde(default = "default_chat_input_key")]
    pub chat_input_key: String,

    /// Envelope field carrying the session id in chat-trigger mode.
    #[serde(default = "default_chat_session_key")]
    pub chat_session_key: String,

    /// Ask the chat trigger to stream its reply.
    #[serde(default)]
    pub streaming: bool,

    /// Key the session id is persisted under.
    #[serde(default = "default_session_storage_key")]
    pub session_storage_key: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            chat_trigger_url: None,
            webhook_header_name: None,
            webhook_header_value: None,
            chat_input_key: default_chat_input_key(),
            chat_session_key: default_chat_session_key(),
            streaming: false,
            session_storage_key: default_session_storage_key(),
        }
    }
}

impl ChatConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CHATWIRE_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env::var("CHATWIRE_PROFILE")
            .unwrap_or_default()
            .to_uppercase();
        Self::default().overlay(&profile, |k| env::var(k).ok())
    }

    /// Parse a TOML config file body. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ChatError> {
        toml::from_str(content).map_err(|e| ChatError::Config(format!("invalid config file: {}", e)))
    }

    /// Overlay environment values on top of this config. Unset or empty
    /// variables leave the existing value in place.
    pub fn merge_env(self) -> Self {
        let profile = env::var("CHATWIRE_PROFILE")
            .unwrap_or_default()
            .to_uppercase();
        self.overlay(&profile, |k| env::var(k).ok())
    }

    /// Overlay values from an arbitrary key lookup.
    pub fn overlay<F>(mut self, profile: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let p = profile;
        if let Some(v) = profiled_opt(&lookup, p, "CHAT_WEBHOOK_URL") {
            self.webhook_url = Some(v);
        }
        if let Some(v) = profiled_opt(&lookup, p, "CHAT_TRIGGER_URL") {
            self.chat_trigger_url = Some(v);
        }
        if let Some(v) = profiled_opt(&lookup, p, "CHAT_WEBHOOK_HEADER_NAME") {
            self.webhook_header_name = Some(v);
        }
        if let Some(v) = profiled_opt(&lookup, p, "CHAT_WEBHOOK_HEADER_VALUE") {
            self.webhook_header_value = Some(v);
        }
        if let Some(v) = profiled_opt(&lookup, p, "CHAT_INPUT_KEY") {
            self.chat_input_key = v;
        }
        if let Some(v) = profiled_opt(&lookup, p, "CHAT_SESSION_KEY") {
            self.chat_session_key = v;
        }
        if let Some(v) = profiled_opt(&lookup, p, "CHAT_STREAMING") {
            self.streaming = parse_flag(&v);
        }
        if let Some(v) = profiled_opt(&lookup, p, "CHAT_SESSION_STORAGE_KEY") {
            self.session_storage_key = v;
        }
        self
    }

    /// Chat-trigger endpoint configured ⇒ chat-trigger, else webhook.
    pub fn transport_mode(&self) -> TransportMode {
        if non_empty(self.chat_trigger_url.clone()).is_some() {
            TransportMode::ChatTrigger
        } else {
            TransportMode::Webhook
        }
    }

    /// Secret header pair, only when both name and value are non-blank.
    pub fn webhook_secret_header(&self) -> Option<(&str, &str)> {
        match (
            self.webhook_header_name.as_deref(),
            self.webhook_header_value.as_deref(),
        ) {
            (Some(name), Some(value))
                if !name.trim().is_empty() && !value.trim().is_empty() =>
            {
                Some((name, value))
            }
            _ => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.transport_mode() {
            TransportMode::ChatTrigger => true,
            TransportMode::Webhook => non_empty(self.webhook_url.clone()).is_some(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  mode:        {}", self.transport_mode());
        tracing::info!("  webhook:     {}", self.webhook_url.as_deref().unwrap_or("(none)"));
        tracing::info!("  trigger:     {}", self.chat_trigger_url.as_deref().unwrap_or("(none)"));
        tracing::info!("  streaming:   {}", self.streaming);
    }

    /// Return a redacted view (no secret header value).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "mode": self.transport_mode().to_string(),
            "webhook_url": self.webhook_url,
            "chat_trigger_url": self.chat_trigger_url,
            "webhook_header_name": self.webhook_header_name,
            "webhook_header_set": self.webhook_secret_header().is_some(),
            "chat_input_key": self.chat_input_key,
            "chat_session_key": self.chat_session_key,
            "streaming": self.streaming,
            "configured": self.is_configured(),
        })
    }
}
