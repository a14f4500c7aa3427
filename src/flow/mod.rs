//! End-to-end commit and tag flows.
//!
//! Each flow gets its git handle and a client constructor from the caller, so
//! nothing here reads process-wide state.

pub mod commit;
pub mod tag;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::ProviderError;
use crate::llm::LlmClient;

/// Per-invocation switches shared by both flows.
#[derive(Debug, Clone, Default)]
pub struct FlowOptions {
    /// Print the generated message and stop before the editor.
    pub dry_run: bool,
    /// Also require a Conventional Commits subject.
    pub strict: bool,
    /// Editor command from config; `None` falls back to the environment.
    pub editor: Option<String>,
}

/// Run one generation behind a spinner on stderr.
pub(crate) fn generate_with_spinner(
    client: &dyn LlmClient,
    input: &str,
) -> Result<String, ProviderError> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Waiting for {}...", client.name()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    log::trace!(
        "Prompt sent to {}:\n{}",
        client.name(),
        crate::llm::truncate(&client.template().generate_prompt(input), 2000)
    );
    let result = client.generate_message(input);

    spinner.finish_and_clear();
    result
}
