//! The release context handed to the tag template.
//!
//! The rendered layout is what the model sees, so section order and headings
//! are fixed.

use std::fmt::Display;

pub const NO_PREVIOUS_TAG: &str = "unavailable (no previous tag found)";

const TRUNCATED_SUFFIX: &str = "\n... (truncated)";

/// Inputs for one release context block, already fetched from git.
#[derive(Debug, Clone, Default)]
pub struct TagContext {
    pub version: String,
    /// Previous tag and the `<tag>..HEAD` range, when one exists.
    pub previous: Option<(String, String)>,
    pub commit_subjects: Vec<String>,
    pub truncated: bool,
    pub diff_stat: String,
    pub name_status: String,
}

impl TagContext {
    pub fn render(&self) -> String {
        let (previous_tag, range) = match &self.previous {
            Some((tag, range)) => (Some(tag.as_str()), Some(range.as_str())),
            None => (None, None),
        };
        build_tag_context(
            &self.version,
            previous_tag,
            range,
            &self.commit_subjects,
            self.truncated,
            &self.diff_stat,
            &self.name_status,
        )
    }
}

/// Render the fixed-shape context block.
///
/// `previous_tag == None` means there is no earlier release; `range` is only
/// printed when a previous tag exists.
pub fn build_tag_context(
    version: &str,
    previous_tag: Option<&str>,
    range: Option<&str>,
    commit_subjects: &[String],
    truncated: bool,
    diff_stat: &str,
    name_status: &str,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Release version: {version}\n"));

    match previous_tag {
        Some(tag) => {
            out.push_str(&format!("Previous tag: {tag}\n"));
            out.push_str(&format!("Range: {}\n", range.unwrap_or_default()));
        }
        None => {
            out.push_str("Previous tag: (none)\n");
            out.push_str("Range: (no previous tag; summary is for repository history up to HEAD)\n");
        }
    }

    out.push_str("\nCommit subjects:\n");
    if commit_subjects.is_empty() {
        out.push_str("(none)\n");
    } else {
        for subject in commit_subjects {
            let subject = subject.trim();
            if subject.is_empty() {
                continue;
            }
            out.push_str("- ");
            out.push_str(subject);
            out.push('\n');
        }
        if truncated {
            out.push_str("(commit list truncated)\n");
        }
    }

    out.push_str("\nDiffstat:\n");
    out.push_str(diff_stat);
    out.push('\n');

    out.push_str("\nChanged files (name-status):\n");
    out.push_str(name_status);
    out.push('\n');

    out
}

/// Trim a collaborator result and cap it, or describe why it is missing.
pub fn or_unavailable<E: Display>(result: Result<String, E>, max_chars: usize) -> String {
    match result {
        Ok(text) => truncate_text(text.trim(), max_chars),
        Err(e) => format!("unavailable ({e})"),
    }
}

/// Cut `s` to at most `max_chars` characters, marking the cut. `0` disables the cap.
pub fn truncate_text(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) if max_chars > 0 => format!("{}{TRUNCATED_SUFFIX}", &s[..byte_idx]),
        _ => s.to_string(),
    }
}
