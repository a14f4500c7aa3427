use anyhow::{Context, Result};

use super::{FlowOptions, generate_with_spinner};
use crate::editor;
use crate::error::{FlowError, ProviderError};
use crate::git::Git;
use crate::llm::LlmClient;
use crate::message::{ValidationPolicy, sanitize};

/// How a commit run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// `--dry-run`: the validated message, nothing written.
    DryRun(String),
    /// The user emptied the message in the editor.
    Aborted,
    /// The message that was committed.
    Committed(String),
}

/// Generate a message for the staged changes, review it, and commit.
///
/// `connect` builds the provider client; it runs only once there is a staged
/// diff to describe.
pub fn run<F>(git: &Git, connect: F, opts: &FlowOptions) -> Result<CommitOutcome>
where
    F: FnOnce() -> Result<Box<dyn LlmClient>, ProviderError>,
{
    git.ensure_repository()?;

    let diff = git.staged_diff().context("failed to get diff")?;

    let client = connect().context("failed to create provider")?;

    println!(
        "Generating commit message using {} with model {}...",
        client.name(),
        client.model()
    );
    let raw = generate_with_spinner(client.as_ref(), &diff)
        .context("failed to generate commit message")?;
    log::debug!("Raw provider output:\n{raw}");

    let message = prepare_message(&raw, opts.strict)?;

    println!("\nGenerated commit message:\n{message}");

    if opts.dry_run {
        println!("\nDry run mode - no commit was made");
        return Ok(CommitOutcome::DryRun(message));
    }

    println!("\nOpening editor to review/edit commit message...");
    let edited =
        editor::open(&message, opts.editor.as_deref()).context("failed to open editor")?;
    let edited = edited.trim();
    if edited.is_empty() {
        println!("\nCommit message is empty, aborting commit.");
        return Ok(CommitOutcome::Aborted);
    }

    git.commit(edited).context("failed to commit")?;
    println!("\nCommit successful!");
    Ok(CommitOutcome::Committed(edited.to_string()))
}

/// Clean up provider output and hold it to the commit policy.
pub fn prepare_message(raw: &str, strict: bool) -> Result<String> {
    let message = sanitize(raw);
    if message.is_empty() {
        return Err(FlowError::SanitizationResultEmpty("commit").into());
    }

    let policy = if strict {
        ValidationPolicy::STRICT
    } else {
        ValidationPolicy::STANDARD
    };
    policy
        .validate(&message)
        .context("generated commit message is invalid")?;
    Ok(message)
}
