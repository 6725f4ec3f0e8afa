//! Participants: the named, prompt-configured members of a conversation.
//!
//! A [`Participant`] pairs an identity (name, description) and a fixed system
//! instruction with a shared [`ClientWrapper`]. It exposes one capability:
//! given the conversation so far, produce the next message. Participants hold
//! no state between invocations (the transcript plus the instruction fully
//! determine the request), so the same value can be invoked on arbitrarily
//! interleaved turns without cross-talk.

use std::sync::Arc;

use crate::tripchat::client_wrapper::{
    ClientWrapper, Message, MessageChunkStream, Role, TokenUsage,
};
use crate::tripchat::error::ChatError;
use crate::tripchat::transcript::{Transcript, TranscriptEntry};

pub struct Participant {
    /// Unique identifier within a chat; also the transcript sender name.
    pub name: String,
    /// Human-readable description for logging and UI surfaces.
    pub description: String,
    /// Fixed instruction prepended to every generation call.
    system_instruction: String,
    /// Shared client used to generate messages.
    client: Arc<dyn ClientWrapper>,
}

impl Participant {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_instruction: impl Into<String>,
        client: Arc<dyn ClientWrapper>,
    ) -> Self {
        Participant {
            name: name.into(),
            description: description.into(),
            system_instruction: system_instruction.into(),
            client,
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn supports_streaming(&self) -> bool {
        self.client.supports_streaming()
    }

    /// Token usage of this participant's most recent completed call.
    pub fn last_usage(&self) -> Option<TokenUsage> {
        self.client.get_last_usage()
    }

    /// Shape the transcript into the request for this participant:
    /// the fixed system instruction first, then every entry in order: the
    /// participant's own prior messages as `Assistant`, the user seed as
    /// plain `User` text, and other participants' messages as `User` text
    /// prefixed with `[name]: ` so the model can tell the voices apart.
    fn request_messages(&self, transcript: &Transcript) -> Vec<Message> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(Message {
            role: Role::System,
            content: self.system_instruction.clone(),
        });

        for entry in transcript.entries() {
            match &entry.sender {
                Some(sender) if *sender == self.name => messages.push(Message {
                    role: Role::Assistant,
                    content: entry.content.clone(),
                }),
                Some(sender) => messages.push(Message {
                    role: Role::User,
                    content: format!("[{}]: {}", sender, entry.content),
                }),
                None => messages.push(Message {
                    role: Role::User,
                    content: entry.content.clone(),
                }),
            }
        }

        messages
    }

    /// Produce this participant's next message as a finished transcript entry.
    pub async fn produce_next(&self, transcript: &Transcript) -> Result<TranscriptEntry, ChatError> {
        let request = self.request_messages(transcript);
        let reply = self.client.send_message(&request, None).await?;
        Ok(TranscriptEntry::from_participant(
            self.name.as_str(),
            reply.content,
        ))
    }

    /// Produce this participant's next message as a chunk stream. The caller
    /// assembles the chunks and appends the finished entry itself.
    pub async fn stream_next(&self, transcript: &Transcript) -> Result<MessageChunkStream, ChatError> {
        let request = self.request_messages(transcript);
        self.client.send_message_stream(&request, None).await
    }
}
