use std::io::Write;
use std::path::PathBuf;
use std::process::{Command as GitCommand, Output, Stdio};

use log::debug;
use tempfile::NamedTempFile;

use crate::error::GitError;

/// Staged diffs longer than this are cut before they reach a prompt.
pub const MAX_DIFF_CHARS: usize = 10_000;
const DIFF_TRUNCATED_SUFFIX: &str = "\n... (diff truncated due to length)";

/// Check a tag name against a conservative subset of git's refname rules.
///
/// Names reach `git` as arguments, so anything that could read as an option
/// or a revision expression is refused.
pub fn validate_tag_name(name: &str) -> Result<(), GitError> {
    let fail = |reason: &'static str| {
        Err(GitError::InvalidTagName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return fail("tag name cannot be empty");
    }
    if name.starts_with('-') {
        return fail("tag name cannot start with '-'");
    }
    if name.starts_with('/') {
        return fail("tag name cannot start with '/'");
    }
    if name.chars().any(char::is_whitespace) {
        return fail("tag name cannot contain whitespace");
    }
    if name.contains("..") {
        return fail("tag name cannot contain '..'");
    }
    if name.contains("@{") {
        return fail("tag name cannot contain '@{'");
    }
    if name.contains("//") {
        return fail("tag name cannot contain '//'");
    }
    if name.chars().any(|c| "~^:?*[\\".contains(c)) {
        return fail("tag name contains an invalid character");
    }
    if name.ends_with('/') || name.ends_with('.') {
        return fail("tag name cannot end with '/' or '.'");
    }
    if name.ends_with(".lock") {
        return fail("tag name cannot end with '.lock'");
    }
    Ok(())
}

/// Thin wrapper over the `git` executable, rooted at one working directory.
#[derive(Debug, Clone)]
pub struct Git {
    work_dir: PathBuf,
}

impl Git {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    fn command(&self, args: &[&str]) -> GitCommand {
        let mut cmd = GitCommand::new("git");
        cmd.args(args).current_dir(&self.work_dir);
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<Output, GitError> {
        debug!("Running git {}", args.join(" "));
        self.command(args).output().map_err(|source| GitError::Spawn {
            args: args.join(" "),
            source,
        })
    }

    /// Run a git command and capture stdout as String.
    fn output(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                args: args.join(" "),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run with the terminal attached, so hooks and git's own output show up.
    fn run_inherited(&self, args: &[&str]) -> Result<(), GitError> {
        debug!("Running git {}", args.join(" "));
        let status = self
            .command(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| GitError::Spawn {
                args: args.join(" "),
                source,
            })?;

        if !status.success() {
            return Err(GitError::CommandFailed {
                args: args.join(" "),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    pub fn is_repository(&self) -> bool {
        self.output(&["rev-parse", "--git-dir"])
            .map(|dir| !dir.trim().is_empty())
            .unwrap_or(false)
    }

    /// Fail with `NotARepository` unless the work dir is inside a repository.
    pub fn ensure_repository(&self) -> Result<(), GitError> {
        if self.is_repository() {
            Ok(())
        } else {
            Err(GitError::NotARepository(self.work_dir.clone()))
        }
    }

    /// The staged diff, cut to `MAX_DIFF_CHARS`.
    pub fn staged_diff(&self) -> Result<String, GitError> {
        let diff = self.output(&["diff", "--staged"])?;
        if diff.trim().is_empty() {
            return Err(GitError::NoStagedChanges);
        }

        match diff.char_indices().nth(MAX_DIFF_CHARS) {
            Some((idx, _)) => {
                debug!("Staged diff truncated at {MAX_DIFF_CHARS} characters");
                Ok(format!("{}{DIFF_TRUNCATED_SUFFIX}", &diff[..idx]))
            }
            None => Ok(diff),
        }
    }

    /// Commit with `message` via `git commit -F`.
    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        let file = message_file(message, "commit message")?;
        let path = file.path().to_string_lossy().to_string();
        self.run_inherited(&["commit", "-F", &path])
    }

    /// The most recent reachable tag, or `None` when there is none.
    pub fn latest_tag(&self) -> Option<String> {
        match self.output(&["describe", "--tags", "--abbrev=0"]) {
            Ok(tag) => Some(tag.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) => {
                debug!("No previous tag: {e}");
                None
            }
        }
    }

    pub fn tag_exists(&self, name: &str) -> Result<bool, GitError> {
        validate_tag_name(name)?;
        let refname = format!("refs/tags/{name}");
        let output = self.run(&["rev-parse", "--verify", "--quiet", &refname])?;
        Ok(output.status.success())
    }

    /// Up to `max` subjects, newest first, and whether more exist.
    pub fn commit_subjects(
        &self,
        range: Option<&str>,
        max: usize,
    ) -> Result<(Vec<String>, bool), GitError> {
        let limit = (max + 1).to_string();
        let mut args = vec!["log", "--pretty=tformat:%s", "-n", limit.as_str()];
        if let Some(range) = range {
            args.push(range);
        }

        let out = match self.output(&args) {
            Ok(out) => out,
            // A repository without commits has no log to read.
            Err(GitError::CommandFailed { stderr, .. })
                if stderr.contains("does not have any commits") =>
            {
                return Ok((Vec::new(), false));
            }
            Err(e) => return Err(e),
        };

        // One line per commit, including commits with an empty subject.
        let lines: Vec<&str> = out.split_terminator('\n').collect();
        let truncated = lines.len() > max;
        let subjects = lines
            .into_iter()
            .take(max)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Ok((subjects, truncated))
    }

    pub fn diff_stat(&self, range: &str) -> Result<String, GitError> {
        self.output(&["diff", "--stat", range])
    }

    pub fn diff_name_status(&self, range: &str) -> Result<String, GitError> {
        self.output(&["diff", "--name-status", range])
    }

    /// Create annotated tag `name` with `message` via `git tag -a -F`.
    pub fn create_annotated_tag(&self, name: &str, message: &str) -> Result<(), GitError> {
        validate_tag_name(name)?;
        let file = message_file(message, "tag message")?;
        let path = file.path().to_string_lossy().to_string();
        let out = self.output(&["tag", "-a", name, "-F", &path])?;
        if !out.trim().is_empty() {
            println!("{}", out.trim_end());
        }
        Ok(())
    }
}

/// Newline-terminated message in a temp file that lives as long as the handle.
fn message_file(message: &str, what: &'static str) -> Result<NamedTempFile, GitError> {
    let mut file = tempfile::Builder::new()
        .prefix("aicommit-")
        .suffix(".txt")
        .tempfile()
        .map_err(|source| GitError::Write { what, source })?;

    file.write_all(message.as_bytes())
        .map_err(|source| GitError::Write { what, source })?;
    if !message.ends_with('\n') {
        file.write_all(b"\n")
            .map_err(|source| GitError::Write { what, source })?;
    }
    file.flush()
        .map_err(|source| GitError::Write { what, source })?;
    Ok(file)
}


#[cfg(test)]
mod tests {
    use super::testing::{git_available, init_repo, run_git};
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn tag_name_rules() {
        for bad in [
            "", "-x", "/v1", "a b", "a\tb", "a..b", "a@{0}", "a//b", "v1~1", "v1^", "a:b", "a?",
            "a*", "a[b", "a\\b", "v1/", "v1.", "v1.lock",
        ] {
            assert!(validate_tag_name(bad).is_err(), "accepted {bad:?}");
        }
        for good in ["v1.2.3", "release/2024-01", "1.0.0-rc.1", "v1@2"] {
            assert!(validate_tag_name(good).is_ok(), "rejected {good:?}");
        }
    }

    #[test]
    fn invalid_tag_name_carries_reason() {
        let err = validate_tag_name("-x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid tag name \"-x\": tag name cannot start with '-'"
        );
    }

    #[test]
    fn message_file_is_newline_terminated() {
        let file = message_file("feat: x", "commit message").unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "feat: x\n");

        let file = message_file("feat: y\n", "commit message").unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "feat: y\n");
    }

    #[test]
    fn repository_detection() {
        if !git_available() {
            return;
        }
        let repo = init_repo();
        assert!(Git::new(repo.path()).is_repository());

        let plain = TempDir::new().unwrap();
        let git = Git::new(plain.path());
        // The temp dir might itself sit inside a checkout.
        if !git.is_repository() {
            assert!(matches!(
                git.ensure_repository(),
                Err(GitError::NotARepository(_))
            ));
        }
    }

    #[test]
    fn staged_diff_and_commit() {
        if !git_available() {
            return;
        }
        let repo = init_repo();
        let git = Git::new(repo.path());

        assert!(matches!(git.staged_diff(), Err(GitError::NoStagedChanges)));

        fs::write(repo.path().join("a.txt"), "hello\n").unwrap();
        run_git(repo.path(), &["add", "a.txt"]);
        let diff = git.staged_diff().unwrap();
        assert!(diff.contains("+hello"));

        git.commit("feat: add greeting\n\nFirst file.").unwrap();
        let log = run_git(repo.path(), &["log", "-1", "--pretty=format:%B"]);
        assert_eq!(log.trim_end(), "feat: add greeting\n\nFirst file.");
    }

    #[test]
    fn long_diff_is_truncated() {
        if !git_available() {
            return;
        }
        let repo = init_repo();
        let git = Git::new(repo.path());

        fs::write(repo.path().join("big.txt"), "x".repeat(20_000)).unwrap();
        run_git(repo.path(), &["add", "big.txt"]);

        let diff = git.staged_diff().unwrap();
        assert!(diff.ends_with(DIFF_TRUNCATED_SUFFIX));
        assert_eq!(
            diff.chars().count(),
            MAX_DIFF_CHARS + DIFF_TRUNCATED_SUFFIX.chars().count()
        );
    }

    #[test]
    fn tag_helpers() {
        if !git_available() {
            return;
        }
        let repo = init_repo();
        let dir = repo.path();
        let git = Git::new(dir);

        assert_eq!(git.commit_subjects(None, 50).unwrap(), (Vec::new(), false));

        fs::write(dir.join("a.txt"), "hello\n").unwrap();
        run_git(dir, &["add", "a.txt"]);
        run_git(dir, &["commit", "-q", "-m", "feat: init"]);
        assert_eq!(git.latest_tag(), None);

        run_git(dir, &["tag", "-a", "v0.1.0", "-m", "Release v0.1.0"]);

        fs::write(dir.join("a.txt"), "hello world\n").unwrap();
        run_git(dir, &["add", "a.txt"]);
        run_git(dir, &["commit", "-q", "-m", "fix: bug"]);

        assert_eq!(git.latest_tag().as_deref(), Some("v0.1.0"));
        assert!(git.tag_exists("v0.1.0").unwrap());
        assert!(!git.tag_exists("v9.9.9").unwrap());
        assert!(git.tag_exists("a..b").is_err());

        let range = "v0.1.0..HEAD";
        let (subjects, truncated) = git.commit_subjects(Some(range), 50).unwrap();
        assert_eq!(subjects, vec!["fix: bug".to_string()]);
        assert!(!truncated);

        let (subjects, truncated) = git.commit_subjects(None, 1).unwrap();
        assert_eq!(subjects, vec!["fix: bug".to_string()]);
        assert!(truncated);

        let (subjects, truncated) = git.commit_subjects(None, 2).unwrap();
        assert_eq!(subjects, vec!["fix: bug".to_string(), "feat: init".to_string()]);
        assert!(!truncated);

        assert!(git.diff_stat(range).unwrap().contains("a.txt"));
        assert!(git.diff_name_status(range).unwrap().contains("M\ta.txt"));

        git.create_annotated_tag("v0.2.0", "Release v0.2.0\n\nAdded\n- Something")
            .unwrap();
        assert!(git.tag_exists("v0.2.0").unwrap());

        let contents = run_git(
            dir,
            &["for-each-ref", "refs/tags/v0.2.0", "--format=%(contents)"],
        );
        assert!(contents.contains("Release v0.2.0"));
        assert!(contents.contains("Added"));

        assert!(matches!(
            git.create_annotated_tag("-f", "x"),
            Err(GitError::InvalidTagName { .. })
        ));
    }

    #[test]
    fn empty_subjects_count_toward_limit() {
        if !git_available() {
            return;
        }
        let repo = init_repo();
        let dir = repo.path();
        run_git(dir, &["commit", "-q", "--allow-empty", "-m", "feat: one"]);
        run_git(
            dir,
            &["commit", "-q", "--allow-empty", "--allow-empty-message", "-m", ""],
        );
        run_git(dir, &["commit", "-q", "--allow-empty", "-m", "fix: three"]);

        let git = Git::new(dir);
        let (subjects, truncated) = git.commit_subjects(None, 2).unwrap();
        assert_eq!(subjects, vec!["fix: three".to_string()]);
        assert!(truncated);

        let (subjects, truncated) = git.commit_subjects(None, 3).unwrap();
        assert_eq!(subjects, vec!["fix: three".to_string(), "feat: one".to_string()]);
        assert!(!truncated);
    }
}
