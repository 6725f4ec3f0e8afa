//! Provider selection and credential resolution.
//!
//! Supported backends are a tagged enum: each variant carries its own
//! configuration struct, and new providers are added as new variants rather
//! than deeper branching. An unknown provider name is a configuration error
//! at startup; a missing credential is a credential error before any turn
//! runs.

use std::env;
use std::sync::Arc;

use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;

use crate::tripchat::client_wrapper::{ClientWrapper, ModelFamily, ModelInfo};
use crate::tripchat::clients::openrouter::{OpenRouterClient, OPENROUTER_BASE_URL};
use crate::tripchat::error::ChatError;

/// Configuration for the OpenRouter backend.
#[derive(Clone, Debug)]
pub struct OpenRouterConfig {
    /// OpenRouter model identifier, e.g. `"deepseek/deepseek-r1"`.
    pub model: String,
    /// Base endpoint URL requests are issued against.
    pub base_url: String,
    /// Environment variable the API key is read from.
    pub key_env: String,
    /// Capability flags for the selected model.
    pub model_info: ModelInfo,
}

impl Default for OpenRouterConfig {
    /// The free-tier R1 model with text-only capabilities.
    fn default() -> Self {
        OpenRouterConfig {
            model: "deepseek/deepseek-r1".to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            key_env: "OPENROUTER_API_KEY".to_string(),
            model_info: ModelInfo {
                family: ModelFamily::R1,
                ..ModelInfo::default()
            },
        }
    }
}

/// A supported model-hosting backend.
#[derive(Clone, Debug)]
pub enum Provider {
    OpenRouter(OpenRouterConfig),
}

impl Provider {
    /// Resolve a provider by name. Unknown names fail immediately.
    pub fn from_name(name: &str) -> Result<Self, ChatError> {
        match name {
            "openrouter" => Ok(Provider::OpenRouter(OpenRouterConfig::default())),
            other => Err(ChatError::Configuration(format!(
                "unknown provider: {}",
                other
            ))),
        }
    }

    /// Resolve credentials and build the shared client for this provider.
    ///
    /// The API key is read from the provider's environment variable first;
    /// when absent, it is requested through a masked interactive prompt.
    pub fn build_client(&self) -> Result<Arc<dyn ClientWrapper>, ChatError> {
        match self {
            Provider::OpenRouter(config) => {
                let api_key = resolve_api_key(&config.key_env, "Enter your OpenRouter API Key")?;
                Ok(Arc::new(
                    OpenRouterClient::new_with_base_url(&api_key, &config.model, &config.base_url)
                        .with_model_info(config.model_info.clone()),
                ))
            }
        }
    }
}

/// Environment variable first, interactive secret entry second.
fn resolve_api_key(key_env: &str, prompt: &str) -> Result<String, ChatError> {
    if let Ok(key) = env::var(key_env) {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    log::debug!("{} not set, requesting interactive entry", key_env);
    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()
        .map_err(|err| {
            ChatError::Credential(format!(
                "{} not set and interactive entry failed: {}",
                key_env, err
            ))
        })?;

    if key.trim().is_empty() {
        return Err(ChatError::Credential(format!(
            "{} not set and no key was entered",
            key_env
        )));
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openrouter_is_the_implemented_provider() {
        let provider = Provider::from_name("openrouter").unwrap();
        let Provider::OpenRouter(config) = provider;
        assert_eq!(config.model, "deepseek/deepseek-r1");
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.model_info.family, ModelFamily::R1);
        assert!(!config.model_info.vision);
    }

    #[test]
    fn unknown_provider_is_a_configuration_error() {
        let err = Provider::from_name("azure").unwrap_err();
        assert_eq!(
            err,
            ChatError::Configuration("unknown provider: azure".to_string())
        );
    }
}
