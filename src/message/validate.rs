//! Structural and Conventional Commits checks on already-sanitized messages.
//!
//! Lengths are counted in characters, not bytes, so localized messages get the
//! same allowance as ASCII ones.

use std::sync::LazyLock;

use regex::Regex;

use super::sanitize::normalize_newlines;
use crate::error::ValidationError;

pub const MAX_MESSAGE_LENGTH: usize = 5000;
pub const MAX_SUBJECT_LENGTH: usize = 100;
pub const MAX_BODY_LINE_LENGTH: usize = 120;
pub const MAX_TRAILER_LINE_LENGTH: usize = 200;

static TRAILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z-]+: ").expect("trailer pattern is valid"));

// Any word-like type is accepted; only the shape of the subject is enforced.
static CONVENTIONAL_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z-]*(\([^()\s]+\))?!?: .+$")
        .expect("conventional subject pattern is valid")
});

/// How the subject line is judged on top of the structural rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectRule {
    Freeform,
    Conventional,
}

/// A fixed bundle of limits, selected per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub max_message_length: usize,
    pub max_subject_length: usize,
    pub max_body_line_length: usize,
    pub max_trailer_line_length: usize,
    pub subject_rule: SubjectRule,
}

impl ValidationPolicy {
    /// Structure and length checks with a freeform subject.
    pub const STANDARD: Self = Self {
        max_message_length: MAX_MESSAGE_LENGTH,
        max_subject_length: MAX_SUBJECT_LENGTH,
        max_body_line_length: MAX_BODY_LINE_LENGTH,
        max_trailer_line_length: MAX_TRAILER_LINE_LENGTH,
        subject_rule: SubjectRule::Freeform,
    };

    /// Same limits, and the subject must also satisfy the Conventional Commits grammar.
    pub const STRICT: Self = Self {
        subject_rule: SubjectRule::Conventional,
        ..Self::STANDARD
    };

    pub fn validate(&self, message: &str) -> Result<(), ValidationError> {
        self.check_structure(message)?;
        if self.subject_rule == SubjectRule::Conventional {
            validate_conventional(message)?;
        }
        Ok(())
    }

    fn check_structure(&self, message: &str) -> Result<(), ValidationError> {
        let normalized = normalize_newlines(message);
        let message = normalized.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        let len = message.chars().count();
        if len > self.max_message_length {
            return Err(ValidationError::MessageTooLong {
                len,
                max: self.max_message_length,
            });
        }

        let lines: Vec<&str> = message.split('\n').collect();
        let subject = subject_of(lines[0]);
        if subject.is_empty() {
            return Err(ValidationError::EmptySubject);
        }

        let subject_len = subject.chars().count();
        if subject_len > self.max_subject_length {
            return Err(ValidationError::SubjectTooLong {
                len: subject_len,
                max: self.max_subject_length,
            });
        }

        if !has_body(&lines[1..]) {
            return Ok(());
        }

        if !lines[1].is_empty() {
            return Err(ValidationError::MissingBlankSeparator);
        }

        for (idx, line) in lines.iter().enumerate().skip(2) {
            if line.is_empty() {
                continue;
            }
            let max = if is_trailer_line(line) {
                self.max_trailer_line_length
            } else {
                self.max_body_line_length
            };
            let len = line.chars().count();
            if len > max {
                return Err(ValidationError::BodyLineTooLong {
                    line: idx + 1,
                    len,
                    max,
                });
            }
        }

        Ok(())
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Structural validation used by the commit flow.
pub fn validate_message(message: &str) -> Result<(), ValidationError> {
    ValidationPolicy::STANDARD.validate(message)
}

/// Subject-grammar gate: `<type>(<scope>)?!?: <description>`.
///
/// Body structure and lengths are not looked at.
pub fn validate_conventional(message: &str) -> Result<(), ValidationError> {
    let normalized = normalize_newlines(message);
    let message = normalized.trim();
    if message.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }

    let subject = subject_of(message.split('\n').next().unwrap_or_default());
    if subject.is_empty() {
        return Err(ValidationError::EmptySubject);
    }

    if !CONVENTIONAL_SUBJECT.is_match(subject) {
        return Err(ValidationError::InvalidConventionalFormat);
    }
    Ok(())
}

/// `Key: value` lines such as `Co-authored-by: ...` or `Signed-off-by: ...`.
pub fn is_trailer_line(line: &str) -> bool {
    TRAILER.is_match(line)
}

fn subject_of(first_line: &str) -> &str {
    first_line.trim_end_matches([' ', '\t'])
}

fn has_body(lines: &[&str]) -> bool {
    lines.iter().any(|l| !l.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_subject_only() {
        assert_eq!(validate_message("feat: add user authentication"), Ok(()));
        assert_eq!(validate_message("Add user authentication"), Ok(()));
    }

    #[test]
    fn accepts_subject_and_body() {
        let msg = "fix(git): avoid panic on empty diff\n\nThe staged diff may be empty after a reset.\n\nSigned-off-by: Dev <dev@example.com>";
        assert_eq!(validate_message(msg), Ok(()));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(validate_message(""), Err(ValidationError::EmptyMessage));
        assert_eq!(validate_message(" \r\n\t"), Err(ValidationError::EmptyMessage));
    }

    #[test]
    fn rejects_too_long_message() {
        let msg = format!("feat: x\n\n{}", "word\n".repeat(1200));
        assert!(matches!(
            validate_message(&msg),
            Err(ValidationError::MessageTooLong { max: 5000, .. })
        ));
    }

    #[test]
    fn subject_length_boundary() {
        let ok = "a".repeat(100);
        assert_eq!(validate_message(&ok), Ok(()));

        let too_long = "a".repeat(101);
        assert_eq!(
            validate_message(&too_long),
            Err(ValidationError::SubjectTooLong { len: 101, max: 100 })
        );
    }

    #[test]
    fn subject_is_right_trimmed_before_measuring() {
        let msg = format!("{}  \t\n\nbody", "a".repeat(100));
        assert_eq!(validate_message(&msg), Ok(()));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let subject = "修".repeat(100);
        assert_eq!(validate_message(&subject), Ok(()));
    }

    #[test]
    fn requires_blank_separator() {
        assert_eq!(
            validate_message("Subject\nBody no blank line"),
            Err(ValidationError::MissingBlankSeparator)
        );
    }

    #[test]
    fn whitespace_only_separator_is_rejected() {
        assert_eq!(
            validate_message("Subject\n  \nBody"),
            Err(ValidationError::MissingBlankSeparator)
        );
    }

    #[test]
    fn body_line_limit() {
        let ok = format!("Subject\n\n{}", "x".repeat(120));
        assert_eq!(validate_message(&ok), Ok(()));

        let too_long = format!("Subject\n\n{}", "x".repeat(121));
        assert_eq!(
            validate_message(&too_long),
            Err(ValidationError::BodyLineTooLong {
                line: 3,
                len: 121,
                max: 120
            })
        );
    }

    #[test]
    fn reports_one_based_line_number() {
        let msg = format!("Subject\n\nshort\n\n{}", "x".repeat(130));
        assert!(matches!(
            validate_message(&msg),
            Err(ValidationError::BodyLineTooLong { line: 5, .. })
        ));
    }

    #[test]
    fn trailers_get_larger_allowance() {
        let ok = format!("Subject\n\nCo-authored-by: {}", "y".repeat(180));
        assert_eq!(validate_message(&ok), Ok(()));

        let too_long = format!("Subject\n\nCo-authored-by: {}", "y".repeat(190));
        assert!(matches!(
            validate_message(&too_long),
            Err(ValidationError::BodyLineTooLong { max: 200, .. })
        ));
    }

    #[test]
    fn trailer_pattern() {
        assert!(is_trailer_line("Signed-off-by: A <a@b.c>"));
        assert!(is_trailer_line("Refs: #12"));
        assert!(!is_trailer_line("Refs:#12"));
        assert!(!is_trailer_line("Fixes #12: crash"));
        assert!(!is_trailer_line(" Refs: #12"));
    }

    #[test]
    fn conventional_accepts_shapes() {
        for subject in [
            "feat: add x",
            "fix(auth): handle missing token",
            "refactor(api)!: rename endpoint",
            "feat!: drop legacy flag",
            "Feat: capitalized type",
            "feature: add new thing",
            "pre-release(core): prepare",
        ] {
            assert_eq!(validate_conventional(subject), Ok(()), "{subject}");
        }
    }

    #[test]
    fn conventional_rejects_bad_shapes() {
        for subject in [
            "random text",
            "Add new thing",
            "feat(a b): x",
            "feat(): x",
            "feat:x",
            "feat:",
            "feat :x",
            "(scope): x",
        ] {
            assert_eq!(
                validate_conventional(subject),
                Err(ValidationError::InvalidConventionalFormat),
                "{subject}"
            );
        }
    }

    #[test]
    fn conventional_ignores_body() {
        let msg = format!("feat: x\nno separator\n{}", "z".repeat(500));
        assert_eq!(validate_conventional(&msg), Ok(()));
    }

    #[test]
    fn conventional_rejects_empty() {
        assert_eq!(validate_conventional("   "), Err(ValidationError::EmptyMessage));
    }

    #[test]
    fn strict_policy_applies_both_checks() {
        assert_eq!(ValidationPolicy::STRICT.validate("feat: x\n\nbody"), Ok(()));
        assert_eq!(
            ValidationPolicy::STRICT.validate("just words"),
            Err(ValidationError::InvalidConventionalFormat)
        );
        assert_eq!(
            ValidationPolicy::STRICT.validate("feat: x\nbody"),
            Err(ValidationError::MissingBlankSeparator)
        );
    }
}
