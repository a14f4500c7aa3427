//! Generate Git commit and annotated tag messages with an LLM.
//!
//! Provider output goes through [`message::sanitize`] and
//! [`message::validate_message`] before anyone is asked to review it.

pub mod cli_args;
pub mod config;
pub mod editor;
pub mod error;
pub mod flow;
pub mod git;
pub mod llm;
pub mod logging;
pub mod message;
pub mod tag_context;

pub use cli_args::Cli;
