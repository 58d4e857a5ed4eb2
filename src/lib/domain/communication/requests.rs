//! Send requests: shape validation and normalization

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use super::{
    errors::SendEmailError,
    recipients::{normalize_recipients, sanitize_header},
};

/// Maximum length of the raw `to` field, in characters
pub const MAX_TO_CHARS: usize = 2048;

/// Maximum length of the subject, in characters
pub const MAX_SUBJECT_CHARS: usize = 512;

/// Maximum length of the body, in characters
pub const MAX_BODY_CHARS: usize = 20_000;

/// A single violated field constraint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    /// Path of the offending field
    pub field: &'static str,

    /// What is wrong with it
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The raw arguments did not have the expected shape
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid arguments: {}", join_violations(.0))]
pub struct ValidationError(pub Vec<FieldViolation>);

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A shape-checked send request, as supplied by the caller
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendEmailRequest {
    /// Comma-separated primary recipients
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Message body
    pub body: String,

    /// Whether `body` is HTML rather than plain text
    pub is_html: bool,

    /// Comma-separated carbon-copy recipients
    pub cc: Option<String>,

    /// Comma-separated blind carbon-copy recipients
    pub bcc: Option<String>,
}

impl SendEmailRequest {
    /// Checks raw tool arguments and builds a request from them.
    ///
    /// Every violated constraint is collected so the caller can fix them all in
    /// one round trip. Content rules (line breaks, blank recipient lists) are
    /// left to [`SendEmailRequest::normalize`].
    pub fn validate(arguments: Option<&Map<String, Value>>) -> Result<Self, ValidationError> {
        let empty = Map::new();
        let arguments = arguments.unwrap_or(&empty);
        let mut violations = Vec::new();

        let to = required_text(arguments, "to", MAX_TO_CHARS, &mut violations);
        let subject = required_text(arguments, "subject", MAX_SUBJECT_CHARS, &mut violations);
        let body = required_text(arguments, "body", MAX_BODY_CHARS, &mut violations);
        let is_html = optional_flag(arguments, "isHtml", &mut violations);
        let cc = optional_text(arguments, "cc", &mut violations);
        let bcc = optional_text(arguments, "bcc", &mut violations);

        match (to, subject, body) {
            (Some(to), Some(subject), Some(body)) if violations.is_empty() => Ok(Self {
                to,
                subject,
                body,
                is_html,
                cc,
                bcc,
            }),
            _ => Err(ValidationError(violations)),
        }
    }

    /// Splits recipient lists and sanitizes header-bound fields.
    pub fn normalize(self) -> Result<NormalizedEmailRequest, SendEmailError> {
        let to = normalize_recipients(Some(&self.to), "to")?;
        let cc = normalize_recipients(self.cc.as_deref(), "cc")?;
        let bcc = normalize_recipients(self.bcc.as_deref(), "bcc")?;

        if to.is_empty() {
            return Err(SendEmailError::EmptyRecipient);
        }

        let subject = sanitize_header(&self.subject, "subject")?;

        Ok(NormalizedEmailRequest {
            to,
            subject,
            body: self.body,
            is_html: self.is_html,
            cc,
            bcc,
        })
    }
}

/// A request whose recipients are split and whose headers are safe to emit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedEmailRequest {
    /// Primary recipients, never empty
    pub to: Vec<String>,

    /// Trimmed subject line
    pub subject: String,

    /// Message body, unmodified
    pub body: String,

    /// Whether `body` is HTML
    pub is_html: bool,

    /// Carbon-copy recipients
    pub cc: Vec<String>,

    /// Blind carbon-copy recipients
    pub bcc: Vec<String>,
}

impl NormalizedEmailRequest {
    /// Every recipient across `to`, `cc` and `bcc`, in that order
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }

    /// Total number of recipients
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

fn required_text(
    arguments: &Map<String, Value>,
    field: &'static str,
    max_chars: usize,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match arguments.get(field) {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(field, "is required"));
            None
        }
        Some(Value::String(value)) if value.is_empty() => {
            violations.push(FieldViolation::new(field, "must not be empty"));
            None
        }
        Some(Value::String(value)) if value.chars().count() > max_chars => {
            violations.push(FieldViolation::new(
                field,
                format!("must be at most {max_chars} characters"),
            ));
            None
        }
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            violations.push(FieldViolation::new(field, "must be a string"));
            None
        }
    }
}

fn optional_text(
    arguments: &Map<String, Value>,
    field: &'static str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match arguments.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            violations.push(FieldViolation::new(field, "must be a string"));
            None
        }
    }
}

fn optional_flag(
    arguments: &Map<String, Value>,
    field: &'static str,
    violations: &mut Vec<FieldViolation>,
) -> bool {
    match arguments.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => {
            violations.push(FieldViolation::new(field, "must be a boolean"));
            false
        }
    }
}
