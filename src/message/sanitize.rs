//! Reduce raw LLM output to the plain-text message it was meant to contain.

const FENCE: &str = "```";

/// Wrapper characters peeled off in this order, at most one layer each.
const WRAPPERS: [char; 3] = ['`', '"', '\''];

/// Strip code fences, wrapping quotes and newline noise from AI output.
///
/// Never fails: the worst case is an empty or unchanged string.
pub fn sanitize(raw: &str) -> String {
    let normalized = normalize_newlines(raw);
    let mut text = normalized.trim();

    if let Some(inner) = first_fenced_block(text) {
        text = inner;
    }
    text = text.trim();

    for wrapper in WRAPPERS {
        text = strip_wrapper(text, wrapper);
    }

    text.trim().to_string()
}

/// Replace `\r\n` and lone `\r` with `\n`.
pub fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Content between the first opening fence's line break and the next fence.
///
/// An opening fence must start a line. The rest of that line (typically a
/// language tag) is dropped. Returns `None` when there is no such fence, it
/// has no line break after it, or no closing fence follows.
fn first_fenced_block(s: &str) -> Option<&str> {
    let start = if s.starts_with(FENCE) {
        0
    } else {
        s.find("\n```")? + 1
    };
    let after_fence = &s[start + FENCE.len()..];
    let newline = after_fence.find('\n')?;

    let content = &after_fence[newline + 1..];
    let end = content.find(FENCE)?;
    Some(&content[..end])
}

fn strip_wrapper(s: &str, wrapper: char) -> &str {
    if s.len() >= 2 && s.starts_with(wrapper) && s.ends_with(wrapper) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
