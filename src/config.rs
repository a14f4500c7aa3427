use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{ConfigError, TemplateError};
use crate::llm::{CustomTemplate, ProviderKind, Template, TemplateSelection};

pub const DEFAULT_PROVIDER: &str = "claude";
const ENV_PREFIX: &str = "AICOMMIT_";

/// Written by `aicommit config init`.
pub const DEFAULT_CONFIG: &str = r#"# aicommit configuration file

# claude, openai, deepseek or custom
provider = "claude"

# Leave unset to use the provider's default model.
# model = "claude-sonnet-4-20250514"

# Optional: vim, nano, "code -w", ... If unset, uses $EDITOR or $VISUAL.
# editor = "vim"

# Prompt template: default, chinese, detailed, minimal or custom
# template = "default"

# Also require a Conventional Commits subject.
strict = false

# API keys. Environment variables take precedence:
# AICOMMIT_CLAUDE_API_KEY, AICOMMIT_OPENAI_API_KEY, AICOMMIT_DEEPSEEK_API_KEY
[api_keys]
claude = ""
openai = ""
deepseek = ""

# Custom OpenAI-compatible provider, used with provider = "custom"
[custom]
url = ""      # Full URL to the completion endpoint, e.g. http://localhost:11434/v1/chat/completions
api_key = ""  # Sent as a bearer token when set (or AICOMMIT_CUSTOM_API_KEY)
model = ""

# Used with template = "custom". The user prompt needs exactly one %s.
# [custom_template]
# system = "You write terse commit messages."
# user = "Summarize this diff as a commit message:\n%s"
"#;

/// Final resolved configuration for aicommit.
#[derive(Debug, Clone)]
pub struct Config {
    pub path: PathBuf,
    pub provider: String,
    pub model: Option<String>,
    pub editor: Option<String>,
    pub template: Option<String>,
    pub strict: bool,
    pub api_keys: HashMap<String, String>,
    pub custom: CustomConfig,
    pub custom_template: Option<CustomTemplateConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomTemplateConfig {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    provider: Option<String>,
    model: Option<String>,
    editor: Option<String>,
    template: Option<String>,
    strict: Option<bool>,
    api_keys: HashMap<String, String>,
    custom: CustomConfig,
    custom_template: Option<CustomTemplateConfig>,
}

/// Return `~/.config/aicommit/aicommit.toml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".config").join("aicommit").join("aicommit.toml"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Build the final config from the TOML file, environment, and defaults.
    ///
    /// Precedence:
    ///   1. `AICOMMIT_*` environment variables
    ///   2. The TOML file (`--config` or `~/.config/aicommit/aicommit.toml`)
    ///   3. Hardcoded defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        Self::load_from(path, explicit.is_some(), |key| env::var(key).ok())
    }

    /// Like [`Config::load`] with an explicit path and environment.
    ///
    /// A missing file is only an error when `required` is set.
    pub fn load_from<F>(path: PathBuf, required: bool, env_lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_cfg = if path.exists() || required {
            let data = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str::<FileConfig>(&data).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            FileConfig::default()
        };

        let env_var = |name: &str| non_empty(env_lookup(&format!("{ENV_PREFIX}{name}")));

        let provider = env_var("PROVIDER")
            .or(non_empty(file_cfg.provider))
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

        let mut api_keys: HashMap<String, String> = file_cfg
            .api_keys
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        for name in ["claude", "openai", "deepseek"] {
            if let Some(key) = env_var(&format!("{}_API_KEY", name.to_ascii_uppercase())) {
                api_keys.insert(name.to_string(), key);
            }
        }

        let mut custom = CustomConfig {
            url: non_empty(file_cfg.custom.url),
            api_key: non_empty(file_cfg.custom.api_key),
            model: non_empty(file_cfg.custom.model),
        };
        if let Some(key) = env_var("CUSTOM_API_KEY") {
            custom.api_key = Some(key);
        }

        let cfg = Config {
            path,
            provider,
            model: env_var("MODEL").or(non_empty(file_cfg.model)),
            editor: env_var("EDITOR").or(non_empty(file_cfg.editor)),
            template: env_var("TEMPLATE").or(non_empty(file_cfg.template)),
            strict: file_cfg.strict.unwrap_or(false),
            api_keys,
            custom,
            custom_template: file_cfg.custom_template,
        };

        debug!(
            "Loaded config: provider={}, model={:?}, template={:?}",
            cfg.provider, cfg.model, cfg.template
        );
        Ok(cfg)
    }

    /// Credential for `kind`, if any.
    pub fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::Custom => self.custom.api_key.as_deref(),
            _ => self.api_keys.get(kind.as_str()).map(String::as_str),
        }
    }

    /// Model to request from `kind`.
    pub fn model_for(&self, kind: ProviderKind) -> String {
        match kind {
            ProviderKind::Custom => self
                .custom
                .model
                .clone()
                .or_else(|| self.model.clone())
                .unwrap_or_default(),
            _ => self
                .model
                .clone()
                .unwrap_or_else(|| kind.default_model().to_string()),
        }
    }

    /// The template selected by `template` (and `[custom_template]`).
    pub fn template_selection(&self) -> Result<TemplateSelection, TemplateError> {
        let template = match self.template.as_deref() {
            None => Template::default(),
            Some(name) if name.trim().eq_ignore_ascii_case("custom") => {
                let custom = self
                    .custom_template
                    .as_ref()
                    .ok_or(TemplateError::MissingCustom)?;
                Template::Custom(CustomTemplate::new(&custom.system, &custom.user)?)
            }
            Some(name) => match name.parse::<Template>()? {
                // Tag messages have their own flow; never a commit template.
                Template::Tag => {
                    return Err(TemplateError::Unknown(name.trim().to_string()));
                }
                template => template,
            },
        };
        Ok(TemplateSelection::new(template))
    }
}

/// Write [`DEFAULT_CONFIG`] to `path`, refusing to overwrite.
pub fn init_config_file(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    write_private(path, DEFAULT_CONFIG).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(path, contents)
}

/// Set `template = "<name>"` in the config file, keeping everything else as is.
pub fn persist_template(path: &Path, name: &str) -> Result<(), ConfigError> {
    let exists = path.exists();
    let content = if exists {
        fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|source| ConfigError::Edit {
            path: path.to_path_buf(),
            source,
        })?;
    doc["template"] = toml_edit::value(name);

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let written = if exists {
        fs::write(path, doc.to_string())
    } else {
        write_private(path, &doc.to_string())
    };
    written.map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
