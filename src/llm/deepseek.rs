use reqwest::blocking::Client;

use super::chat::{ChatRequest, chat_url, post_chat};
use super::{LlmClient, Template, http_client, require_key};
use crate::error::ProviderError;

pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const MAX_TOKENS: u32 = 1024;
const NAME: &str = "deepseek";

/// DeepSeek speaks the OpenAI chat dialect.
pub struct DeepSeekClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    template: Template,
}

impl DeepSeekClient {
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

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl LlmClient for DeepSeekClient {
    fn generate_message(&self, input: &str) -> Result<String, ProviderError> {
        let prompt = self.template.generate_prompt(input);
        let mut req = ChatRequest::system_user(&self.model, self.template.system_prompt(), &prompt);
        req.max_tokens = Some(MAX_TOKENS);

        let completion = post_chat(
            &self.http,
            NAME,
            &chat_url(&self.base_url),
            Some(&self.api_key),
            &req,
        )?;

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
