//! Backend selection: builds the configured model backend.

use std::sync::Arc;

use rustedreason_config::AppConfig;
use rustedreason_core::error::Error;
use rustedreason_core::model::Model;
use tracing::info;

use crate::openai_compat::OpenAiCompatModel;
use crate::retry::RetryModel;

/// Build the model backend named by `config.default_provider`.
///
/// Every backend goes through the OpenAI-compatible client; the provider
/// name only picks the default endpoint. Local backends (ollama, vllm,
/// llamacpp) run without an API key. The client is wrapped in a
/// [`RetryModel`] allowing `config.model_retries` extra attempts.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Model>, Error> {
    let provider = config.default_provider.as_str();

    let base_url = match (&config.base_url, default_base_url(provider)) {
        (Some(url), _) => url.clone(),
        (None, Some(url)) => url.to_string(),
        (None, None) => {
            return Err(Error::Config {
                message: format!("unknown provider '{provider}' needs base_url"),
            });
        }
    };

    let api_key = match &config.api_key {
        Some(key) => key.clone(),
        None if is_local(provider) => provider.to_string(),
        None => {
            return Err(Error::Config {
                message: format!(
                    "no API key for provider '{provider}'. Set RUSTEDREASON_API_KEY or api_key in config.toml"
                ),
            });
        }
    };

    let model = OpenAiCompatModel::new(provider, &base_url, api_key, &config.default_model)
        .map_err(|e| Error::Config {
            message: e.to_string(),
        })?
        .with_temperature(config.default_temperature);

    info!(
        provider,
        model = %config.default_model,
        base_url = %base_url,
        retries = config.model_retries,
        "Model backend ready"
    );
    Ok(Arc::new(RetryModel::new(Arc::new(model), config.model_retries)))
}

fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<&'static str> {
    let url = match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1",
        "openai" => "https://api.openai.com/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url)
}
