use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use super::{FlowOptions, generate_with_spinner};
use crate::editor;
use crate::error::{FlowError, GitError, ProviderError};
use crate::git::Git;
use crate::llm::{LlmClient, Template};
use crate::message::sanitize;
use crate::tag_context::{NO_PREVIOUS_TAG, TagContext, or_unavailable};

pub const COMMIT_SUBJECT_LIMIT: usize = 50;
pub const DIFF_STAT_MAX_CHARS: usize = 4000;
pub const NAME_STATUS_MAX_CHARS: usize = 4000;

/// How a tag run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    DryRun(String),
    Aborted,
    Created {
        name: String,
        message: String,
        had_previous_tag: bool,
    },
}

/// Version from the positional argument, then `--version`, then a prompt.
pub fn resolve_version<R, W>(
    positional: Option<&str>,
    flag: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    let given = positional
        .filter(|v| !v.trim().is_empty())
        .or(flag.filter(|v| !v.trim().is_empty()));

    let version = match given {
        Some(v) => v.trim().to_string(),
        None => {
            write!(output, "Tag version: ")?;
            output.flush()?;
            let mut line = String::new();
            input
                .read_line(&mut line)
                .context("failed to read tag version")?;
            line.trim().to_string()
        }
    };

    if version.is_empty() {
        return Err(FlowError::EmptyVersion.into());
    }
    Ok(version)
}

/// Gather what changed since the last tag.
pub fn collect_context(git: &Git, version: &str) -> Result<TagContext> {
    let previous = git.latest_tag();
    let range = previous.as_ref().map(|tag| format!("{tag}..HEAD"));

    let (commit_subjects, truncated) = git
        .commit_subjects(range.as_deref(), COMMIT_SUBJECT_LIMIT)
        .context("failed to get commit subjects")?;

    let (diff_stat, name_status) = match range.as_deref() {
        Some(range) => (
            or_unavailable(git.diff_stat(range), DIFF_STAT_MAX_CHARS),
            or_unavailable(git.diff_name_status(range), NAME_STATUS_MAX_CHARS),
        ),
        None => (NO_PREVIOUS_TAG.to_string(), NO_PREVIOUS_TAG.to_string()),
    };

    Ok(TagContext {
        version: version.to_string(),
        previous: previous.zip(range),
        commit_subjects,
        truncated,
        diff_stat,
        name_status,
    })
}

/// Generate release notes for `version`, review them, and create the tag.
///
/// The client always runs with [`Template::Tag`], whatever it was built with.
pub fn run<F>(git: &Git, version: &str, connect: F, opts: &FlowOptions) -> Result<TagOutcome>
where
    F: FnOnce() -> Result<Box<dyn LlmClient>, ProviderError>,
{
    git.ensure_repository()?;

    if git
        .tag_exists(version)
        .context("failed to check tag existence")?
    {
        return Err(GitError::TagAlreadyExists(version.to_string()).into());
    }

    let context = collect_context(git, version)?;
    let had_previous_tag = context.previous.is_some();
    let info_block = context.render();
    log::debug!("Tag context:\n{info_block}");

    let mut client = connect().context("failed to create provider")?;
    client.set_template(Template::Tag);

    println!(
        "Generating tag message using {} with model {}...",
        client.name(),
        client.model()
    );
    let raw = generate_with_spinner(client.as_ref(), &info_block)
        .context("failed to generate tag message")?;

    let message = sanitize(&raw);
    if message.is_empty() {
        return Err(FlowError::SanitizationResultEmpty("tag").into());
    }

    println!("\nGenerated tag message:\n{message}");

    if opts.dry_run {
        println!("\nDry run mode - no tag was created");
        return Ok(TagOutcome::DryRun(message));
    }

    println!("\nOpening editor to review/edit tag message...");
    let edited =
        editor::open(&message, opts.editor.as_deref()).context("failed to open editor")?;
    let edited = edited.trim();
    if edited.is_empty() {
        println!("\nTag message is empty, aborting tag creation.");
        return Ok(TagOutcome::Aborted);
    }

    git.create_annotated_tag(version, edited)
        .context("failed to create tag")?;

    println!("\nTag created: {version}");
    if !had_previous_tag {
        println!(
            "Note: no previous tag was found; consider creating an initial baseline tag for better release notes."
        );
    }

    Ok(TagOutcome::Created {
        name: version.to_string(),
        message: edited.to_string(),
        had_previous_tag,
    })
}
