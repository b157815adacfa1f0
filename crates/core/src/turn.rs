use serde::{Deserialize, Serialize};

/// Author of a visible conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the visible conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Role names understood by the remote chat API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Model,
}

impl From<Role> for HistoryRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => HistoryRole::User,
            Role::Assistant => HistoryRole::Model,
        }
    }
}

impl From<HistoryRole> for Role {
    fn from(role: HistoryRole) -> Self {
        match role {
            HistoryRole::User => Role::User,
            HistoryRole::Model => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// A prior turn in the wire shape of the remote chat API.
///
/// Derived from the transcript on every send; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedHistoryEntry {
    pub role: HistoryRole,
    pub parts: Vec<Part>,
}

impl SanitizedHistoryEntry {
    pub fn new(role: HistoryRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Text of all parts joined, which for entries built by the sanitizer is
    /// the single original content string.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn to_turn(&self) -> Turn {
        Turn {
            role: self.role.into(),
            content: self.text(),
        }
    }
}

/// Which delivery strategy a client uses. Decided once, never switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    Webhook,
    ChatTrigger,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Webhook => write!(f, "webhook"),
            TransportMode::ChatTrigger => write!(f, "chat-trigger"),
        }
    }
}

/// Client context attached to every outgoing envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub path: String,
    pub user_agent: String,
}

impl RequestMetadata {
    pub fn new(path: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            user_agent: user_agent.into(),
        }
    }
}
