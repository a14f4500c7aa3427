use musli::json;
use musli::{Decode, Encode};
use reqwest::blocking::Client;

use super::{LlmClient, Template, http_client, log_request, require_key, truncate};
use crate::error::ProviderError;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
const NAME: &str = "claude";

#[derive(Debug, Encode)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Encode)]
struct ClaudeRequest {
    model: String,
    system: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Decode)]
struct ClaudeContent {
    text: Option<String>,
}

#[derive(Debug, Decode)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

/// Synchronous Anthropic client using /v1/messages.
pub struct ClaudeClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    template: Template,
}

impl ClaudeClient {
    pub fn new(
        api_key: Option<&str>,
        model: impl Into<String>,
        template: Template,
    ) -> Result<Self, ProviderError> {
        let api_key = require_key(api_key, NAME)?.to_string();
        let mut model = model.into();
        if model.trim().is_empty() {
            model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            http: http_client(NAME)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model,
            template,
        })
    }

    /// Point the client at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl LlmClient for ClaudeClient {
    fn generate_message(&self, input: &str) -> Result<String, ProviderError> {
        let req_body = ClaudeRequest {
            model: self.model.clone(),
            system: self.template.system_prompt().to_string(),
            max_tokens: MAX_TOKENS,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: self.template.generate_prompt(input),
            }],
        };

        let body = json::to_string(&req_body).map_err(|e| ProviderError::MalformedResponse {
            provider: NAME,
            detail: format!("failed to encode request: {e}"),
        })?;

        let url = format!("{}/v1/messages", self.base_url);
        log_request(
            "POST",
            &url,
            &[
                ("Content-Type", "application/json"),
                ("x-api-key", &self.api_key),
                ("anthropic-version", ANTHROPIC_VERSION),
            ],
            &body,
        );

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .body(body)
            .send()
            .map_err(|source| ProviderError::Transport {
                provider: NAME,
                source,
            })?;

        let status = resp.status();
        let text = resp.text().map_err(|source| ProviderError::Transport {
            provider: NAME,
            source,
        })?;

        if !status.is_success() {
            return Err(ProviderError::Upstream {
                provider: NAME,
                status: status.as_u16(),
                body: text,
            });
        }

        log::trace!("claude raw JSON response: {text}");

        let parsed: ClaudeResponse =
            json::from_str(&text).map_err(|e| ProviderError::MalformedResponse {
                provider: NAME,
                detail: format!("{e}, body: {}", truncate(&text, 500)),
            })?;

        parsed
            .content
            .into_iter()
            .find_map(|c| c.text)
            .ok_or(ProviderError::EmptyResponse { provider: NAME })
    }

    fn set_template(&mut self, template: Template) {
        self.template = template;
    }

    fn template(&self) -> &Template {
        &self.template
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn requires_api_key() {
        let err = ClaudeClient::new(None, "", Template::Default).err().unwrap();
        assert_eq!(
            err.to_string(),
            "claude API key is required (set it in the config file or AICOMMIT_CLAUDE_API_KEY)"
        );
    }

    #[test]
    fn blank_model_falls_back_to_default() {
        let client = ClaudeClient::new(Some("sk-ant"), " ", Template::Default).unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.name(), "claude");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sends_messages_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-test",
                "max_tokens": 1024,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "content": [{"type": "text", "text": "feat: add x"}],
                "stop_reason": "end_turn",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let out = tokio::task::spawn_blocking(move || {
            ClaudeClient::new(Some("sk-ant-test"), "claude-test", Template::Minimal)
                .unwrap()
                .with_base_url(uri)
                .generate_message("diff")
        })
        .await
        .unwrap();

        assert_eq!(out.unwrap(), "feat: add x");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn maps_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let uri = server.uri();
        let out = tokio::task::spawn_blocking(move || {
            ClaudeClient::new(Some("sk-ant-test"), "", Template::Default)
                .unwrap()
                .with_base_url(uri)
                .generate_message("diff")
        })
        .await
        .unwrap();

        match out {
            Err(ProviderError::Upstream { status, body, .. }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "content": [] })),
            )
            .mount(&server)
            .await;

        let uri = server.uri();
        let out = tokio::task::spawn_blocking(move || {
            ClaudeClient::new(Some("sk-ant-test"), "", Template::Default)
                .unwrap()
                .with_base_url(uri)
                .generate_message("diff")
        })
        .await
        .unwrap();

        assert!(matches!(out, Err(ProviderError::EmptyResponse { .. })));
    }
}
