use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::sanitize;

/// Name field length limits.
pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;

/// Email field: input bound surfaced to clients for their `maxlength`
/// attribute. The server validates the grammar only.
pub const EMAIL_MAX: usize = 254;

/// Subject field length limits (form field and configured subject
/// choices alike).
pub const SUBJECT_MIN: usize = 10;
pub const SUBJECT_MAX: usize = 50;

/// Message field length limits.
pub const MESSAGE_MIN: usize = 20;
pub const MESSAGE_MAX: usize = 1000;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .unwrap()
});

/// Sanitized contact fields extracted from a raw submission body.
#[derive(Debug, Clone)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactFields {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            name: sanitize::text(str_field(raw, "name")),
            email: sanitize::text(str_field(raw, "email")),
            subject: sanitize::text(str_field(raw, "subject")),
            message: sanitize::textarea(str_field(raw, "message")),
        }
    }
}

fn str_field<'a>(raw: &'a Value, key: &str) -> &'a str {
    raw.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Run every rule and collect every failure; the submitter gets the
/// full list, not just the first hit.
pub fn validate(contact: &ContactFields) -> Vec<String> {
    let mut errors = Vec::new();

    if !(NAME_MIN..=NAME_MAX).contains(&contact.name.len()) {
        errors.push(format!(
            "Please enter a Name between {NAME_MIN} and {NAME_MAX} characters in length."
        ));
    }
    if !is_email(&contact.email) {
        errors.push("Please enter a valid Email address.".to_string());
    }
    if !(SUBJECT_MIN..=SUBJECT_MAX).contains(&contact.subject.len()) {
        errors.push(format!(
            "Please enter a Subject between {SUBJECT_MIN} and {SUBJECT_MAX} characters in length."
        ));
    }
    if !(MESSAGE_MIN..=MESSAGE_MAX).contains(&contact.message.len()) {
        errors.push(format!(
            "Please enter a Message between {MESSAGE_MIN} and {MESSAGE_MAX} characters in length."
        ));
    }

    errors
}
