use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Mutex;

use crate::tripchat::error::ChatError;

/// A ClientWrapper is a wrapper around a specific chat-completion backend.
/// It provides a common interface to interact with remote models.
/// It does not keep track of the conversation; that is the job of the
/// round-robin loop, which owns the transcript and uses a ClientWrapper to
/// produce each next message.

/// Represents the possible roles for a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    System,
    // set by the developer to steer the model's responses
    User,
    // a message sent by a human user (or another participant, routed as text)
    Assistant, // lets the model know the content was generated as a response to a user message
}

/// How many tokens were spent on prompt vs. completion.
#[derive(Clone, Debug)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

/// Represents a generic message to be sent to an LLM.
#[derive(Clone, Debug)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: String,
}

/// Represents a chunk of a streaming message response.
#[derive(Clone, Debug)]
pub struct MessageChunk {
    /// The incremental content in this chunk.
    pub content: String,
    /// Whether this is the final chunk in the stream.
    pub is_final: bool,
}

/// Type alias for a Send-able error box carried by stream items.
pub type SendError = Box<dyn std::error::Error + Send>;

/// Type alias for a boxed stream of message chunks.
pub type MessageChunkStream = Pin<Box<dyn Stream<Item = Result<MessageChunk, SendError>> + Send>>;

/// Rough family tag for a model identifier, used when a prompt format or
/// behavior differs between model lineages on the same wire protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelFamily {
    /// DeepSeek R1 style reasoning models.
    R1,
    /// OpenAI GPT lineage.
    Gpt,
    /// Anthropic Claude lineage.
    Claude,
    /// Google Gemini lineage.
    Gemini,
    /// Anything we have no special handling for.
    Unknown,
}

/// What a client is configured to request from its backend.
///
/// Each flag gates whether a request is *permitted* to ask the backend for
/// that behavior, not whether the backend actually supports it. A mismatch is
/// reported by the client at call time as [`ChatError::Provider`], never at
/// construction time.
#[derive(Clone, Debug)]
pub struct ModelInfo {
    pub vision: bool,
    pub function_calling: bool,
    pub json_output: bool,
    pub structured_output: bool,
    pub family: ModelFamily,
}

impl Default for ModelInfo {
    /// Text-only, no structured behaviors, unknown family.
    fn default() -> Self {
        ModelInfo {
            vision: false,
            function_calling: false,
            json_output: false,
            structured_output: false,
            family: ModelFamily::Unknown,
        }
    }
}

impl ModelInfo {
    /// Check a per-call capability request against this configuration.
    ///
    /// Returns [`ChatError::Provider`] naming the first capability the model
    /// was not configured for.
    pub fn permits(&self, requested: &RequestCapabilities) -> Result<(), ChatError> {
        let denied = if requested.vision && !self.vision {
            Some("vision")
        } else if requested.function_calling && !self.function_calling {
            Some("function_calling")
        } else if requested.json_output && !self.json_output {
            Some("json_output")
        } else if requested.structured_output && !self.structured_output {
            Some("structured_output")
        } else {
            None
        };

        match denied {
            Some(capability) => Err(ChatError::Provider(format!(
                "model was not configured for {}",
                capability
            ))),
            None => Ok(()),
        }
    }
}

/// Backend behaviors a single request relies on.
///
/// Callers that need none of them pass `None` to the send methods.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestCapabilities {
    pub vision: bool,
    pub function_calling: bool,
    pub json_output: bool,
    pub structured_output: bool,
}

/// Trait defining the interface to interact with various LLM services.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// The model identifier requests are issued against.
    fn model_name(&self) -> &str;

    /// The capability configuration for this client's model.
    fn model_info(&self) -> ModelInfo {
        ModelInfo::default()
    }

    /// Send a message sequence to the LLM and get a response.
    /// - `messages`: The messages to send in the request.
    /// - `options`: Backend behaviors this request relies on; checked against
    ///   [`ClientWrapper::model_info`] before anything goes on the wire.
    async fn send_message(
        &self,
        messages: &[Message],
        options: Option<RequestCapabilities>,
    ) -> Result<Message, ChatError>;

    /// Whether [`ClientWrapper::send_message_stream`] is expected to work.
    fn supports_streaming(&self) -> bool {
        false
    }

    /// Send a message sequence to the LLM and get a streaming response.
    /// Returns a stream of [`MessageChunk`] items so tokens can be rendered
    /// as they arrive. The default implementation reports the capability as
    /// missing so non-streaming clients don't have to implement it.
    async fn send_message_stream(
        &self,
        _messages: &[Message],
        _options: Option<RequestCapabilities>,
    ) -> Result<MessageChunkStream, ChatError> {
        Err(ChatError::Provider(
            "streaming not supported by this client".to_string(),
        ))
    }

    /// Hook to retrieve usage from the *last* send_message() call.
    /// Default impl returns None so wrappers without accounting don't break.
    fn get_last_usage(&self) -> Option<TokenUsage> {
        self.usage_slot()
            .and_then(|slot| slot.lock().ok().and_then(|u| u.clone()))
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        // Implementations supporting TokenUsage tracking override this.
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_info_denies_everything() {
        let info = ModelInfo::default();
        let request = RequestCapabilities {
            json_output: true,
            ..RequestCapabilities::default()
        };
        let err = info.permits(&request).unwrap_err();
        assert_eq!(
            err,
            ChatError::Provider("model was not configured for json_output".to_string())
        );
    }

    #[test]
    fn configured_capability_is_permitted() {
        let info = ModelInfo {
            json_output: true,
            ..ModelInfo::default()
        };
        let request = RequestCapabilities {
            json_output: true,
            ..RequestCapabilities::default()
        };
        assert!(info.permits(&request).is_ok());
    }

    #[test]
    fn empty_request_is_always_permitted() {
        let info = ModelInfo::default();
        assert!(info.permits(&RequestCapabilities::default()).is_ok());
    }
}
