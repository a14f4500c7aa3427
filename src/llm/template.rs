use std::fmt;
use std::str::FromStr;

use super::prompts;
use crate::error::TemplateError;

/// The substitution site inside a user prompt format.
pub const PLACEHOLDER: &str = "%s";

/// A caller-supplied template. The user format is checked once, on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTemplate {
    system: String,
    user: String,
}

impl CustomTemplate {
    /// Fails unless `user` contains exactly one `%s`.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Result<Self, TemplateError> {
        let user = user.into();
        let count = user.matches(PLACEHOLDER).count();
        if count != 1 {
            return Err(TemplateError::Placeholder(count));
        }
        Ok(Self {
            system: system.into(),
            user,
        })
    }
}

/// Prompt strategy: which system prompt and user format go to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Template {
    #[default]
    Default,
    Chinese,
    Detailed,
    Minimal,
    Tag,
    Custom(CustomTemplate),
}

impl Template {
    pub fn name(&self) -> &'static str {
        match self {
            Template::Default => "default",
            Template::Chinese => "chinese",
            Template::Detailed => "detailed",
            Template::Minimal => "minimal",
            Template::Tag => "tag",
            Template::Custom(_) => "custom",
        }
    }

    pub fn system_prompt(&self) -> &str {
        match self {
            Template::Default => prompts::DEFAULT_SYSTEM,
            Template::Chinese => prompts::CHINESE_SYSTEM,
            Template::Detailed => prompts::DETAILED_SYSTEM,
            Template::Minimal => prompts::MINIMAL_SYSTEM,
            Template::Tag => prompts::TAG_SYSTEM,
            Template::Custom(c) => &c.system,
        }
    }

    pub fn user_format(&self) -> &str {
        match self {
            Template::Default => prompts::DEFAULT_USER,
            Template::Chinese => prompts::CHINESE_USER,
            Template::Detailed => prompts::DETAILED_USER,
            Template::Minimal => prompts::MINIMAL_USER,
            Template::Tag => prompts::TAG_USER,
            Template::Custom(c) => &c.user,
        }
    }

    /// Insert `input` at the single `%s`. The input itself is never re-expanded.
    pub fn generate_prompt(&self, input: &str) -> String {
        let format = self.user_format();
        match format.split_once(PLACEHOLDER) {
            Some((head, tail)) => {
                let mut out = String::with_capacity(head.len() + input.len() + tail.len());
                out.push_str(head);
                out.push_str(input);
                out.push_str(tail);
                out
            }
            None => format.to_string(),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in templates selectable by name. `custom` needs its texts from config.
impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Template::Default),
            "chinese" => Ok(Template::Chinese),
            "detailed" => Ok(Template::Detailed),
            "minimal" => Ok(Template::Minimal),
            "tag" => Ok(Template::Tag),
            "custom" => Err(TemplateError::MissingCustom),
            other => Err(TemplateError::Unknown(other.to_string())),
        }
    }
}

/// The template in effect for one invocation.
///
/// Owned by whoever runs the flow; nothing here is process-wide.
#[derive(Debug, Clone, Default)]
pub struct TemplateSelection {
    current: Template,
}

impl TemplateSelection {
    pub fn new(template: Template) -> Self {
        Self { current: template }
    }

    pub fn current(&self) -> &Template {
        &self.current
    }

    pub fn set(&mut self, template: Template) {
        self.current = template;
    }

    pub fn reset(&mut self) {
        self.current = Template::default();
    }

    pub fn into_template(self) -> Template {
        self.current
    }
}
