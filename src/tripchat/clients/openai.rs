//! The `OpenAIClient` struct implements `ClientWrapper` for OpenAI-compatible
//! Chat Completions endpoints, capturing both the assistant response and token
//! usage (input vs output) for cost tracking.
//!
//! # Key Features
//!
//! - **send_message(...)**: blocking completion returning one `Message`.
//! - **send_message_stream(...)**: incremental `MessageChunk` stream.
//! - **Automatic usage capture**: stores the latest `TokenUsage` internally;
//!   call `get_last_usage()` after `send_message()` to retrieve it.
//! - **Custom base URLs**: point the same client at any OpenAI-compatible
//!   deployment via [`OpenAIClient::new_with_base_url`].
//!
//! # Example
//!
//! ```rust,no_run
//! use tripchat::clients::openai::OpenAIClient;
//! use tripchat::client_wrapper::{ClientWrapper, Message, Role};
//!
//! #[tokio::main]
//! async fn main() {
//!     let secret_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
//!     let client = OpenAIClient::new_with_model_string(&secret_key, "gpt-4o-mini");
//!
//!     let resp = client.send_message(&[
//!         Message { role: Role::System, content: "You are an assistant.".into() },
//!         Message { role: Role::User, content: "Hello!".into() },
//!     ], None).await.unwrap();
//!     println!("Assistant: {}", resp.content);
//!
//!     if let Some(usage) = client.get_last_usage() {
//!         println!(
//!             "Tokens — input: {}, output: {}, total: {}",
//!             usage.input_tokens, usage.output_tokens, usage.total_tokens
//!         );
//!     }
//! }
//! ```

use std::sync::Mutex;

use async_trait::async_trait;
use openai_rust2 as openai_rust;

use crate::tripchat::client_wrapper::{
    ClientWrapper, Message, MessageChunkStream, ModelInfo, RequestCapabilities, Role, TokenUsage,
};
use crate::tripchat::clients::common;
use crate::tripchat::clients::http_pool::get_http_client;
use crate::tripchat::error::ChatError;

/// Default REST endpoint for the official OpenAI deployment.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat Completions path appended to the base URL for every request.
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Client wrapper for OpenAI-compatible Chat Completions APIs.
///
/// The wrapper maintains the selected model identifier, the configured
/// [`ModelInfo`] capability flags, plus an internal [`TokenUsage`] slot so
/// callers can inspect how many tokens each request consumed. It reuses the
/// pooled HTTP client configured in [`crate::tripchat::clients::http_pool`].
pub struct OpenAIClient {
    /// Underlying SDK client pointing at the REST endpoint.
    client: openai_rust::Client,
    /// Model name that will be injected into each request.
    model: String,
    /// Capability flags requests are validated against at call time.
    model_info: ModelInfo,
    /// Storage for the token usage returned by the most recent request.
    token_usage: Mutex<Option<TokenUsage>>,
}

impl OpenAIClient {
    /// Construct a new client against the official OpenAI endpoint.
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        OpenAIClient {
            client: openai_rust::Client::new_with_client(
                secret_key,
                get_http_client(OPENAI_BASE_URL),
            ),
            model: model_name.to_string(),
            model_info: ModelInfo::default(),
            token_usage: Mutex::new(None),
        }
    }

    /// Construct a client targeting a custom OpenAI-compatible base URL.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        Self::new_with_base_url_and_http_client(
            secret_key,
            model_name,
            base_url,
            get_http_client(base_url),
        )
    }

    /// Construct a client with an explicit reqwest client, for wrappers that
    /// need endpoint-specific default headers.
    pub(crate) fn new_with_base_url_and_http_client(
        secret_key: &str,
        model_name: &str,
        base_url: &str,
        http_client: reqwest::Client,
    ) -> Self {
        OpenAIClient {
            client: openai_rust::Client::new_with_client_and_base_url(
                secret_key,
                http_client,
                base_url,
            ),
            model: model_name.to_string(),
            model_info: ModelInfo::default(),
            token_usage: Mutex::new(None),
        }
    }

    /// Replace the capability flags requests are validated against.
    pub fn with_model_info(mut self, model_info: ModelInfo) -> Self {
        self.model_info = model_info;
        self
    }
}

#[async_trait]
impl ClientWrapper for OpenAIClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn model_info(&self) -> ModelInfo {
        self.model_info.clone()
    }

    async fn send_message(
        &self,
        messages: &[Message],
        options: Option<RequestCapabilities>,
    ) -> Result<Message, ChatError> {
        if let Some(requested) = &options {
            self.model_info.permits(requested)?;
        }

        let formatted_messages = common::format_messages(messages);

        let content = common::send_and_track(
            &self.client,
            &self.model,
            formatted_messages,
            Some(CHAT_COMPLETIONS_PATH.to_string()),
            &self.token_usage,
        )
        .await?;

        Ok(Message {
            role: Role::Assistant,
            content,
        })
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn send_message_stream(
        &self,
        messages: &[Message],
        options: Option<RequestCapabilities>,
    ) -> Result<MessageChunkStream, ChatError> {
        if let Some(requested) = &options {
            self.model_info.permits(requested)?;
        }

        let formatted_messages = common::format_messages(messages);

        common::send_stream(
            &self.client,
            &self.model,
            formatted_messages,
            Some(CHAT_COMPLETIONS_PATH.to_string()),
        )
        .await
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tripchat::client_wrapper::ModelFamily;

    #[test]
    fn capability_mismatch_is_a_call_time_provider_error() {
        // Construction succeeds regardless of flags; the mismatch only
        // surfaces when a request asks for the capability.
        let client = OpenAIClient::new_with_model_string("fake-key", "gpt-4o-mini");
        assert_eq!(client.model_name(), "gpt-4o-mini");

        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt
            .block_on(client.send_message(
                &[Message {
                    role: Role::User,
                    content: "hi".to_string(),
                }],
                Some(RequestCapabilities {
                    vision: true,
                    ..RequestCapabilities::default()
                }),
            ))
            .unwrap_err();

        assert_eq!(
            err,
            ChatError::Provider("model was not configured for vision".to_string())
        );
    }

    #[test]
    fn model_info_is_carried_through() {
        let client = OpenAIClient::new_with_model_string("fake-key", "gpt-4o-mini")
            .with_model_info(ModelInfo {
                json_output: true,
                family: ModelFamily::Gpt,
                ..ModelInfo::default()
            });
        assert!(client.model_info().json_output);
        assert_eq!(client.model_info().family, ModelFamily::Gpt);
    }
}
