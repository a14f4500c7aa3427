use reqwest::blocking::Client;

use super::chat::{ChatRequest, post_chat};
use super::{LlmClient, Template, http_client};
use crate::error::ProviderError;

const NAME: &str = "custom";

/// Any OpenAI-compatible endpoint, addressed by its full URL.
pub struct CustomClient {
    http: Client,
    url: String,
    api_key: Option<String>,
    model: String,
    template: Template,
}

impl CustomClient {
    pub fn new(
        url: Option<String>,
        api_key: Option<&str>,
        model: impl Into<String>,
        template: Template,
    ) -> Result<Self, ProviderError> {
        let url = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or(ProviderError::MissingUrl)?;

        Ok(Self {
            http: http_client(NAME)?,
            url,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            model: model.into(),
            template,
        })
    }
}

impl LlmClient for CustomClient {
    fn generate_message(&self, input: &str) -> Result<String, ProviderError> {
        let prompt = self.template.generate_prompt(input);
        let req = ChatRequest::system_user(&self.model, self.template.system_prompt(), &prompt);

        let completion = post_chat(&self.http, NAME, &self.url, self.api_key.as_deref(), &req)?;

        if completion.content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse { provider: NAME });
        }
        Ok(completion.content)
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
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
    }

    #[test]
    fn requires_url() {
        assert!(matches!(
            CustomClient::new(None, None, "m", Template::Default),
            Err(ProviderError::MissingUrl)
        ));
        assert!(matches!(
            CustomClient::new(Some("  ".into()), None, "m", Template::Default),
            Err(ProviderError::MissingUrl)
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn omits_auth_without_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(reply("feat: local model"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/api/chat", server.uri());
        let out = tokio::task::spawn_blocking(move || {
            CustomClient::new(Some(url), None, "llama3", Template::Default)
                .unwrap()
                .generate_message("diff")
        })
        .await
        .unwrap();
        assert_eq!(out.unwrap(), "feat: local model");

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sends_bearer_with_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("fix: remote"))
            .mount(&server)
            .await;

        let url = server.uri();
        let out = tokio::task::spawn_blocking(move || {
            CustomClient::new(Some(url), Some("secret-key"), "m", Template::Default)
                .unwrap()
                .generate_message("diff")
        })
        .await
        .unwrap();
        assert_eq!(out.unwrap(), "fix: remote");

        let requests = server.received_requests().await.unwrap();
        let auth = requests[0].headers.get("authorization").unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer secret-key");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_content_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply(""))
            .mount(&server)
            .await;

        let url = server.uri();
        let out = tokio::task::spawn_blocking(move || {
            CustomClient::new(Some(url), None, "m", Template::Default)
                .unwrap()
                .generate_message("diff")
        })
        .await
        .unwrap();
        assert!(matches!(out, Err(ProviderError::EmptyResponse { .. })));
    }
}
