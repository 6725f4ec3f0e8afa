//! OpenRouter client: the OpenAI-compatible wrapper pointed at
//! `https://openrouter.ai/api/v1`.
//!
//! OpenRouter fronts many vendors' models behind one OpenAI-shaped API, so
//! this client delegates everything to [`OpenAIClient`] and only pins the
//! base URL, attaches the attribution headers OpenRouter asks applications to
//! send, and carries the per-model [`ModelInfo`] needed when the model name
//! is not an OpenAI one.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::tripchat::client_wrapper::{
    ClientWrapper, Message, MessageChunkStream, ModelInfo, RequestCapabilities, TokenUsage,
};
use crate::tripchat::clients::http_pool::get_http_client_with_headers;
use crate::tripchat::clients::openai::OpenAIClient;
use crate::tripchat::error::ChatError;

/// REST endpoint for OpenRouter's OpenAI-compatible API.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Headers OpenRouter recommends for application attribution.
fn attribution_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("HTTP-Referer", HeaderValue::from_static("http://localhost"));
    headers.insert("X-Title", HeaderValue::from_static("tripchat"));
    headers
}

pub struct OpenRouterClient {
    client: OpenAIClient,
    model: String,
}

impl OpenRouterClient {
    /// Construct a client for the given OpenRouter model identifier,
    /// e.g. `"deepseek/deepseek-r1"`.
    pub fn new_with_model_str(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, OPENROUTER_BASE_URL)
    }

    /// Construct a client against a non-default endpoint, e.g. a proxy in
    /// front of OpenRouter. The attribution headers are attached either way.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        OpenRouterClient {
            client: OpenAIClient::new_with_base_url_and_http_client(
                secret_key,
                model_name,
                base_url,
                get_http_client_with_headers(base_url, attribution_headers()),
            ),
            model: model_name.to_string(),
        }
    }

    /// Attach capability flags for the selected model. Required when using a
    /// non-OpenAI model name, since nothing can be inferred from it.
    pub fn with_model_info(mut self, model_info: ModelInfo) -> Self {
        self.client = self.client.with_model_info(model_info);
        self
    }
}

#[async_trait]
impl ClientWrapper for OpenRouterClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn model_info(&self) -> ModelInfo {
        self.client.model_info()
    }

    async fn send_message(
        &self,
        messages: &[Message],
        options: Option<RequestCapabilities>,
    ) -> Result<Message, ChatError> {
        self.client.send_message(messages, options).await
    }

    fn supports_streaming(&self) -> bool {
        self.client.supports_streaming()
    }

    async fn send_message_stream(
        &self,
        messages: &[Message],
        options: Option<RequestCapabilities>,
    ) -> Result<MessageChunkStream, ChatError> {
        self.client.send_message_stream(messages, options).await
    }

    fn usage_slot(&self) -> Option<&std::sync::Mutex<Option<TokenUsage>>> {
        self.client.usage_slot()
    }
}
