//! Text hygiene and policy checks for AI-generated messages.

pub mod sanitize;
pub mod validate;

pub use sanitize::sanitize;
pub use validate::{validate_conventional, validate_message, SubjectRule, ValidationPolicy};
