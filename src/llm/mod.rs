pub mod chat;
pub mod claude;
pub mod custom;
pub mod deepseek;
pub mod model_cache;
pub mod openai;
pub mod prompts;
pub mod template;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;

use crate::config::Config;
use crate::error::ProviderError;
pub use template::{CustomTemplate, Template, TemplateSelection};

use claude::ClaudeClient;
use custom::CustomClient;
use deepseek::DeepSeekClient;
use openai::OpenAiClient;

const HTTP_TIMEOUT: Duration = Duration::from_secs(90);

/// Trait for talking to an LLM backend.
///
/// Implementations return the provider's text as-is; cleaning it up is the
/// caller's job.
pub trait LlmClient: Send + Sync {
    /// One blocking completion for `template.generate_prompt(input)`.
    fn generate_message(&self, input: &str) -> Result<String, ProviderError>;

    fn set_template(&mut self, template: Template);

    fn template(&self) -> &Template;

    fn name(&self) -> &'static str;

    fn model(&self) -> &str;
}

/// The supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Claude,
    OpenAi,
    DeepSeek,
    Custom,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "claude",
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Custom => "custom",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Claude => claude::DEFAULT_MODEL,
            ProviderKind::OpenAi => openai::DEFAULT_MODEL,
            ProviderKind::DeepSeek => deepseek::DEFAULT_MODEL,
            ProviderKind::Custom => "",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" => Ok(ProviderKind::Claude),
            "openai" => Ok(ProviderKind::OpenAi),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "custom" => Ok(ProviderKind::Custom),
            _ => Err(ProviderError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Build the LLM client for the configured provider.
pub fn build_llm_client(
    cfg: &Config,
    template: Template,
) -> Result<Box<dyn LlmClient>, ProviderError> {
    let kind: ProviderKind = cfg.provider.parse()?;
    let model = cfg.model_for(kind);
    let api_key = cfg.api_key(kind);

    debug!("Using {kind} client with model {model:?} and template {template}");

    let client: Box<dyn LlmClient> = match kind {
        ProviderKind::Claude => Box::new(ClaudeClient::new(api_key, model, template)?),
        ProviderKind::OpenAi => Box::new(OpenAiClient::new(api_key, model, template)?),
        ProviderKind::DeepSeek => Box::new(DeepSeekClient::new(api_key, model, template)?),
        ProviderKind::Custom => Box::new(CustomClient::new(
            cfg.custom.url.clone(),
            api_key,
            model,
            template,
        )?),
    };

    Ok(client)
}

pub(crate) fn http_client(provider: &'static str) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| ProviderError::Transport { provider, source })
}

/// `Some(key)` only for a non-blank key.
pub(crate) fn require_key<'a>(
    key: Option<&'a str>,
    provider: &'static str,
) -> Result<&'a str, ProviderError> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ProviderError::MissingApiKey { provider })
}

/// Log an outgoing request at trace level with credentials masked.
pub(crate) fn log_request(method: &str, url: &str, headers: &[(&str, &str)], body: &str) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }

    let mut out = format!("Request {method} {url}\nHeaders:\n");
    for (name, value) in headers {
        let value = if is_secret_header(name) {
            mask_secret(value)
        } else {
            (*value).to_string()
        };
        out.push_str(&format!("  {name}: {value}\n"));
    }

    let pretty = serde_json::from_str::<serde_json::Value>(body)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| body.to_string());
    out.push_str(&format!("Body:\n{}", truncate(&pretty, 3000)));

    log::trace!("{out}");
}

fn is_secret_header(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "authorization" | "x-api-key" | "api-key"
    )
}

/// Show only the first few characters of a credential.
pub fn mask_secret(value: &str) -> String {
    if value.chars().count() > 10 {
        let head: String = value.chars().take(7).collect();
        format!("{head}...[MASKED]")
    } else {
        "[MASKED]".to_string()
    }
}

/// Truncate long strings for debug logging.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...\n[truncated {} chars]", &s[..idx], s.len() - idx),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_kinds() {
        assert_eq!("claude".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" deepseek ".parse::<ProviderKind>().unwrap(), ProviderKind::DeepSeek);
        assert_eq!("custom".parse::<ProviderKind>().unwrap(), ProviderKind::Custom);

        let err = "gemini".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported provider: gemini");
    }

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_secret("Bearer sk-abcdefghijkl"), "Bearer ...[MASKED]");
        assert_eq!(mask_secret("short"), "[MASKED]");
        assert!(is_secret_header("X-Api-Key"));
        assert!(!is_secret_header("anthropic-version"));
    }

    #[test]
    fn require_key_rejects_blank() {
        assert!(matches!(
            require_key(Some("  "), "openai"),
            Err(ProviderError::MissingApiKey { provider: "openai" })
        ));
        assert!(require_key(None, "claude").is_err());
        assert_eq!(require_key(Some("sk-1"), "openai").unwrap(), "sk-1");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc...\n[truncated 3 chars]");
    }
}
