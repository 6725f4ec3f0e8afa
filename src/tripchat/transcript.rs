//! The append-only conversation transcript.
//!
//! The transcript is the single shared record of a run: seeded with the user
//! task, grown by one entry per participant turn, and never rewritten. It
//! lives only in process memory.

use chrono::{DateTime, Utc};

use crate::tripchat::client_wrapper::Role;

/// One message in the transcript.
#[derive(Clone, Debug)]
pub struct TranscriptEntry {
    /// UTC timestamp recorded when the entry was created.
    pub timestamp: DateTime<Utc>,
    /// Name of the participant that produced this entry, or `None` for the
    /// external user's seed task.
    pub sender: Option<String>,
    /// Conversation role: [`Role::User`] for the seed, [`Role::Assistant`]
    /// for participant output.
    pub role: Role,
    /// The message body.
    pub content: String,
}

impl TranscriptEntry {
    /// Create the external user's entry (the seed task).
    pub fn from_user(content: impl Into<String>) -> Self {
        TranscriptEntry {
            timestamp: Utc::now(),
            sender: None,
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an entry produced by a named participant.
    pub fn from_participant(name: impl Into<String>, content: impl Into<String>) -> Self {
        TranscriptEntry {
            timestamp: Utc::now(),
            sender: Some(name.into()),
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Display name of whoever produced the entry.
    pub fn sender_name(&self) -> &str {
        self.sender.as_deref().unwrap_or("user")
    }
}

/// Ordered, append-only log of conversation messages.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Transcript {
            entries: Vec::new(),
        }
    }

    /// Append an entry. Insertion order defines conversational causality.
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// The most recently appended entry, if any.
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
