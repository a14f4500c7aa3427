//! Request/response shapes shared by every OpenAI-compatible chat endpoint.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::log_request;
use crate::error::ProviderError;

/// Minimal request/response structs for the Chat Completions API.
#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    /// A system + user exchange, the shape every template produces.
    pub fn system_user(model: &'a str, system: &'a str, user: &'a str) -> Self {
        ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: None,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// The first choice of a decoded completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub finish_reason: Option<String>,
}

/// `{base}/v1/chat/completions`, tolerating a base that already ends in `/v1`.
pub fn chat_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}

/// POST one chat request and decode the first choice.
pub fn post_chat(
    http: &Client,
    provider: &'static str,
    url: &str,
    bearer: Option<&str>,
    req: &ChatRequest<'_>,
) -> Result<Completion, ProviderError> {
    let body = serde_json::to_string(req).map_err(|e| ProviderError::MalformedResponse {
        provider,
        detail: format!("failed to encode request: {e}"),
    })?;

    let auth = bearer.map(|key| format!("Bearer {key}"));
    let mut headers = vec![("Content-Type", "application/json")];
    if let Some(auth) = auth.as_deref() {
        headers.push(("Authorization", auth));
    }
    log_request("POST", url, &headers, &body);

    let mut builder = http
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body);
    if let Some(key) = bearer {
        builder = builder.bearer_auth(key);
    }

    let resp = builder
        .send()
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let status = resp.status();
    let text = resp
        .text()
        .map_err(|source| ProviderError::Transport { provider, source })?;

    if !status.is_success() {
        return Err(ProviderError::Upstream {
            provider,
            status: status.as_u16(),
            body: text,
        });
    }

    log::trace!("{provider} raw JSON response: {text}");

    let parsed: ChatResponse =
        serde_json::from_str(&text).map_err(|e| ProviderError::MalformedResponse {
            provider,
            detail: format!("{e}, body: {}", super::truncate(&text, 500)),
        })?;

    if let Some(usage) = &parsed.usage {
        log::debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse { provider })?;

    Ok(Completion {
        content: choice.message.content.unwrap_or_default(),
        finish_reason: choice.finish_reason,
    })
}
