use std::env;
use std::fs;
use std::io::Write;
use std::process::Command;

use log::debug;

use crate::error::EditorError;

/// Tried in order when nothing is configured.
const FALLBACK_EDITORS: [&str; 4] = ["nvim", "vim", "nano", "vi"];

/// Open `content` in an editor and return what the user saved.
///
/// `override_cmd` comes from config; otherwise `$EDITOR`, then `$VISUAL`, then
/// the first fallback found on `PATH`.
pub fn open(content: &str, override_cmd: Option<&str>) -> Result<String, EditorError> {
    let command = resolve_editor(override_cmd, |key| env::var(key).ok())?;
    open_with(content, &command)
}

/// Pick the editor command line.
pub fn resolve_editor<F>(override_cmd: Option<&str>, env_lookup: F) -> Result<String, EditorError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |cmd: &String| !cmd.trim().is_empty();
    let configured = override_cmd
        .map(str::to_string)
        .filter(non_blank)
        .or_else(|| env_lookup("EDITOR").filter(non_blank))
        .or_else(|| env_lookup("VISUAL").filter(non_blank));

    if let Some(cmd) = configured {
        return Ok(cmd);
    }

    FALLBACK_EDITORS
        .iter()
        .find(|name| which::which(name).is_ok())
        .map(|name| name.to_string())
        .ok_or(EditorError::NotFound)
}

/// Run `command` (split on whitespace) with the temp file path appended.
pub fn open_with(content: &str, command: &str) -> Result<String, EditorError> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| EditorError::InvalidCommand(command.to_string()))?;

    let mut file = tempfile::Builder::new()
        .prefix("aicommit-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    debug!("Opening editor: {command} {}", file.path().display());

    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()?;

    if !status.success() {
        return Err(EditorError::Failed {
            command: command.to_string(),
            code: status.code(),
        });
    }

    Ok(fs::read_to_string(file.path())?)
}
