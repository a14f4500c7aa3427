use std::sync::Mutex;

use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::chat::{ChatRequest, chat_url, post_chat};
use super::model_cache::ModelCache;
use super::{LlmClient, Template, http_client, log_request, require_key};
use crate::error::ProviderError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const NAME: &str = "openai";

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    id: String,
}

/// Reject model ids that can never be valid.
pub fn check_model_name(model: &str) -> Result<(), ProviderError> {
    if model.is_empty() {
        return Err(ProviderError::InvalidModel {
            model: model.to_string(),
            reason: "model name cannot be empty",
        });
    }
    if model.chars().any(char::is_whitespace) {
        return Err(ProviderError::InvalidModel {
            model: model.to_string(),
            reason: "model name cannot contain whitespace",
        });
    }
    Ok(())
}

/// Synchronous OpenAI client using /v1/chat/completions.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    template: Template,
    models: Mutex<ModelCache>,
}

impl OpenAiClient {
    pub fn new(
        api_key: Option<&str>,
        model: impl Into<String>,
        template: Template,
    ) -> Result<Self, ProviderError> {
        let api_key = require_key(api_key, NAME)?.to_string();
        let mut model = model.into();
        if model.is_empty() {
            model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            http: http_client(NAME)?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model,
            template,
            models: Mutex::new(ModelCache::default()),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model_cache(mut self, cache: ModelCache) -> Self {
        self.models = Mutex::new(cache);
        self
    }

    /// Shape check, then a best-effort lookup against the listing endpoint.
    ///
    /// Only the shape check can fail; the vendor decides about unknown ids.
    fn validate_model(&self) -> Result<(), ProviderError> {
        check_model_name(&self.model)?;

        let mut cache = match self.models.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if cache.lookup(&self.model).is_none() {
            match self.fetch_models() {
                Ok(ids) => {
                    debug!("Fetched {} models from {NAME}", ids.len());
                    cache.refresh(ids);
                }
                Err(e) => {
                    warn!("Could not list {NAME} models, skipping model check: {e}");
                    return Ok(());
                }
            }
        }

        if cache.lookup(&self.model) == Some(false) {
            warn!(
                "Model {:?} is not in the {NAME} model list; sending the request anyway",
                self.model
            );
        }
        Ok(())
    }

    fn fetch_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/v1/models", self.base_url);
        let auth = format!("Bearer {}", self.api_key);
        log_request("GET", &url, &[("Authorization", &auth)], "");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
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

        let list: ModelList =
            serde_json::from_str(&text).map_err(|e| ProviderError::MalformedResponse {
                provider: NAME,
                detail: e.to_string(),
            })?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

impl LlmClient for OpenAiClient {
    fn generate_message(&self, input: &str) -> Result<String, ProviderError> {
        self.validate_model()?;

        let prompt = self.template.generate_prompt(input);
        let req = ChatRequest::system_user(&self.model, self.template.system_prompt(), &prompt);
        let completion = post_chat(
            &self.http,
            NAME,
            &chat_url(&self.base_url),
            Some(&self.api_key),
            &req,
        )?;

        match completion.finish_reason.as_deref() {
            Some("content_filter") => Err(ProviderError::ContentFiltered {
                provider: NAME,
                model: self.model.clone(),
            }),
            reason => {
                if completion.content.trim().is_empty() {
                    debug!("Empty {NAME} completion, finish_reason={reason:?}");
                    return Err(ProviderError::EmptyResponse { provider: NAME });
                }
                if reason == Some("length") {
                    warn!("{NAME} stopped at the token limit; the message may be cut short");
                }
                Ok(completion.content)
            }
        }
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
