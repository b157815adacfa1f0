//! Repair a stored transcript into history the remote chat API will accept.
//!
//! The remote API requires prior turns to start with a user turn, and the new
//! message is appended as a user turn, so the history must not end on one
//! either. Offending entries at either end are dropped, never rewritten.

use chatwire_core::{HistoryRole, SanitizedHistoryEntry, Turn};

/// Build the prior-turns payload for a new request from the transcript.
///
/// `turns` must not include the message currently being sent.
pub fn sanitize(turns: &[Turn]) -> Vec<SanitizedHistoryEntry> {
    let mut history: Vec<SanitizedHistoryEntry> = turns
        .iter()
        .filter(|t| !t.content.trim().is_empty())
        .map(|t| SanitizedHistoryEntry::new(HistoryRole::from(t.role), t.content.clone()))
        .collect();

    // Leading greeting(s) authored by the assistant.
    let leading = history
        .iter()
        .take_while(|e| e.role == HistoryRole::Model)
        .count();
    history.drain(..leading);

    // User turns recorded before a failed send; replaying them would put two
    // user turns back to back once the new message is appended.
    while history.last().is_some_and(|e| e.role == HistoryRole::User) {
        history.pop();
    }

    history
}

/// Re-express sanitized history as transcript turns.
pub fn to_turns(history: &[SanitizedHistoryEntry]) -> Vec<Turn> {
    history.iter().map(SanitizedHistoryEntry::to_turn).collect()
}

/// True when the history satisfies the remote API's precondition.
pub fn is_well_formed(history: &[SanitizedHistoryEntry]) -> bool {
    match (history.first(), history.last()) {
        (None, None) => true,
        (Some(first), Some(last)) => {
            first.role == HistoryRole::User && last.role != HistoryRole::User
        }
        _ => false,
    }
}
