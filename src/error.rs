//! Error types shared across the crate.
//!
//! Command-level code wraps these in `anyhow::Error` with context, so callers
//! can still `downcast_ref` to the concrete kind.

use std::path::PathBuf;

use thiserror::Error;

/// Why a message was rejected before it could become part of history.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("commit message cannot be empty")]
    EmptyMessage,

    #[error("commit message too long: {len} characters (max {max})")]
    MessageTooLong { len: usize, max: usize },

    #[error("commit subject cannot be empty")]
    EmptySubject,

    #[error("commit subject too long: {len} characters (max {max})")]
    SubjectTooLong { len: usize, max: usize },

    #[error("invalid commit message format: separate subject and body with a blank line")]
    MissingBlankSeparator,

    #[error("commit body line too long at line {line}: {len} characters (max {max})")]
    BodyLineTooLong { line: usize, len: usize, max: usize },

    #[error(
        "commit subject must use Conventional Commits format: <type>(<scope>)?!?: <description>"
    )]
    InvalidConventionalFormat,
}

/// Failures talking to (or configuring) an LLM backend.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} API key is required (set it in the config file or AICOMMIT_{env}_API_KEY)", env = .provider.to_uppercase())]
    MissingApiKey { provider: &'static str },

    #[error("custom provider URL is required")]
    MissingUrl,

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("invalid model name {model:?}: {reason}")]
    InvalidModel { model: String, reason: &'static str },

    #[error("failed to send request to {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API returned status {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode {provider} response: {detail}")]
    MalformedResponse {
        provider: &'static str,
        detail: String,
    },

    #[error("no completion in {provider} response")]
    EmptyResponse { provider: &'static str },

    #[error("content was filtered by {provider} (model: {model})")]
    ContentFiltered {
        provider: &'static str,
        model: String,
    },
}

/// Errors from the git collaborator.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("no staged changes found")]
    NoStagedChanges,

    #[error("invalid tag name {name:?}: {reason}")]
    InvalidTagName { name: String, reason: &'static str },

    #[error("tag already exists: {0}")]
    TagAlreadyExists(String),

    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {args} exited with status {code:?}: {stderr}")]
    CommandFailed {
        args: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to write {what} to temp file: {source}")]
    Write {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the interactive editor step.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(
        "no editor found. Please set EDITOR environment variable or configure 'editor' in config file"
    )]
    NotFound,

    #[error("invalid editor command: {0:?}")]
    InvalidCommand(String),

    #[error("editor command {command:?} failed with status {code:?}")]
    Failed { command: String, code: Option<i32> },

    #[error("editor I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Orchestration failures that are not owned by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("generated {0} message is empty")]
    SanitizationResultEmpty(&'static str),

    #[error("tag version cannot be empty")]
    EmptyVersion,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("user prompt must contain exactly one %s placeholder (found {0})")]
    Placeholder(usize),

    #[error("unknown template: {0} (expected default, chinese, detailed, minimal or custom)")]
    Unknown(String),

    #[error("template 'custom' selected but [custom_template] is not configured")]
    MissingCustom,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to determine home directory")]
    NoHomeDir,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to edit config {path}: {source}")]
    Edit {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
