use futures_util::StreamExt;
use openai_rust::chat;
use openai_rust2 as openai_rust;
use std::sync::Mutex;

use crate::tripchat::client_wrapper::{
    Message, MessageChunk, MessageChunkStream, Role, SendError, TokenUsage,
};
use crate::tripchat::error::ChatError;

/// Convert tripchat messages into the format expected by openai_rust.
pub(crate) fn format_messages(messages: &[Message]) -> Vec<chat::Message> {
    let mut formatted_messages = Vec::with_capacity(messages.len());
    for msg in messages {
        formatted_messages.push(chat::Message {
            role: match msg.role {
                Role::System => "system".to_owned(),
                Role::User => "user".to_owned(),
                Role::Assistant => "assistant".to_owned(),
            },
            content: msg.content.clone(),
        });
    }
    formatted_messages
}

/// Map an SDK failure onto the tripchat error taxonomy.
///
/// Network-level failures (connect, timeout, request/body transfer) become
/// [`ChatError::Transport`]; anything else is the backend rejecting the
/// request and becomes [`ChatError::Provider`].
pub(crate) fn classify_api_error(err: anyhow::Error) -> ChatError {
    if let Some(req_err) = err.downcast_ref::<reqwest::Error>() {
        if req_err.is_connect() || req_err.is_timeout() || req_err.is_request() || req_err.is_body()
        {
            return ChatError::Transport(req_err.to_string());
        }
    }
    ChatError::Provider(err.to_string())
}

/// Send a chat request, record its usage, and return the assistant's content.
pub(crate) async fn send_and_track(
    api: &openai_rust::Client,
    model: &str,
    formatted_msgs: Vec<chat::Message>,
    url_path: Option<String>,
    usage_slot: &Mutex<Option<TokenUsage>>,
) -> Result<String, ChatError> {
    let chat_arguments = chat::ChatArguments::new(model, formatted_msgs);

    let response = api.create_chat(chat_arguments, url_path).await;

    match response {
        Ok(response) => {
            let usage = TokenUsage {
                input_tokens: response.usage.prompt_tokens as usize,
                output_tokens: response.usage.completion_tokens as usize,
                total_tokens: response.usage.total_tokens as usize,
            };

            // Store it for get_last_usage()
            if let Ok(mut slot) = usage_slot.lock() {
                *slot = Some(usage);
            }

            response
                .choices
                .first()
                .map(|choice| choice.message.content.clone())
                .ok_or_else(|| ChatError::Provider("response contained no choices".to_owned()))
        }
        Err(err) => {
            log::error!(
                "tripchat::clients::common::send_and_track(...): chat API error: {}",
                err
            );
            Err(classify_api_error(err))
        }
    }
}

/// Send a streaming chat request and return a stream of message chunks.
/// Note: token usage tracking is not available for streaming responses.
pub(crate) async fn send_stream(
    api: &openai_rust::Client,
    model: &str,
    formatted_msgs: Vec<chat::Message>,
    url_path: Option<String>,
) -> Result<MessageChunkStream, ChatError> {
    let chat_arguments = chat::ChatArguments::new(model, formatted_msgs);

    let chunk_stream = api
        .create_chat_stream(chat_arguments, url_path)
        .await
        .map_err(|err| {
            log::error!(
                "tripchat::clients::common::send_stream(...): chat API error: {}",
                err
            );
            classify_api_error(err)
        })?;

    // Map the SDK chunks to our MessageChunk type lazily, so the caller sees
    // tokens as they arrive instead of after the response completes.
    let message_stream = chunk_stream.map(|chunk_result| match chunk_result {
        Ok(chunk) => {
            let content = chunk
                .choices
                .first()
                .and_then(|choice| choice.delta.content.clone())
                .unwrap_or_default();
            let is_final = chunk
                .choices
                .first()
                .and_then(|choice| choice.finish_reason.clone())
                .is_some();

            Ok(MessageChunk { content, is_final })
        }
        Err(err) => Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("stream error: {}", err),
        )) as SendError),
    });

    Ok(Box::pin(message_stream))
}
