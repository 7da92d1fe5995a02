//! Validation error types
//!
//! Field errors are collected per field (never short-circuited) so a form can
//! render every violation at once. Intent mismatches are kept apart: they are
//! contract violations by the caller, not something a user can fix inline.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One reason a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldErrorKind {
    Required,
    TooShort { min: usize },
    InvalidFormat { expected: &'static str },
    NotANumber,
    NotInDomain { value: String, expected: Vec<String> },
    InvalidEmail,
    UnexpectedList,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::TooShort { min } => {
                write!(f, "String must contain at least {min} character(s)")
            }
            Self::InvalidFormat { expected } => write!(f, "Invalid {expected}"),
            Self::NotANumber => f.write_str("Expected number, received nan"),
            Self::NotInDomain { value, expected } => {
                let expected = expected
                    .iter()
                    .map(|option| format!("'{option}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                write!(
                    f,
                    "Invalid enum value. Expected {expected}, received '{value}'"
                )
            }
            Self::InvalidEmail => f.write_str("Invalid email"),
            Self::UnexpectedList => f.write_str("Expected a single value"),
        }
    }
}

/// Structured error set keyed by field name, plus form-level messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSet {
    fields: BTreeMap<String, Vec<FieldErrorKind>>,
    form: Vec<String>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, kind: FieldErrorKind) {
        self.fields.entry(field.to_string()).or_default().push(kind);
    }

    pub fn extend_field(&mut self, field: &str, kinds: impl IntoIterator<Item = FieldErrorKind>) {
        let mut kinds = kinds.into_iter().peekable();
        if kinds.peek().is_some() {
            self.fields.entry(field.to_string()).or_default().extend(kinds);
        }
    }

    pub fn push_form(&mut self, message: impl Into<String>) {
        self.form.push(message.into());
    }

    pub fn field(&self, name: &str) -> &[FieldErrorKind] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Vec<FieldErrorKind>)> {
        self.fields.iter()
    }

    pub fn form_errors(&self) -> &[String] {
        &self.form
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_empty()
    }

    /// Rendered messages per field, in the order they were found.
    pub fn field_messages(&self) -> BTreeMap<String, Vec<String>> {
        self.fields
            .iter()
            .map(|(name, kinds)| (name.clone(), kinds.iter().map(ToString::to_string).collect()))
            .collect()
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (name, kinds) in &self.fields {
            for kind in kinds {
                parts.push(format!("{name}: {kind}"));
            }
        }
        parts.extend(self.form.iter().cloned());
        f.write_str(&parts.join("; "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("intent mismatch: expected '{expected}', received {}", describe_found(.found))]
    IntentMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("validation failed: {0}")]
    Fields(ErrorSet),
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(found) => format!("'{found}'"),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_follow_kind_order() {
        let mut errors = ErrorSet::new();
        errors.push("email", FieldErrorKind::TooShort { min: 5 });
        errors.push("email", FieldErrorKind::InvalidEmail);

        assert_eq!(
            errors.field_messages().get("email").unwrap(),
            &vec![
                "String must contain at least 5 character(s)".to_string(),
                "Invalid email".to_string(),
            ]
        );
    }

    #[test]
    fn empty_extend_does_not_create_entry() {
        let mut errors = ErrorSet::new();
        errors.extend_field("name", Vec::new());
        assert!(errors.is_empty());
    }

    #[test]
    fn not_in_domain_lists_expected_values() {
        let kind = FieldErrorKind::NotInDomain {
            value: "open9".into(),
            expected: vec!["open6".into(), "open4".into()],
        };
        assert_eq!(
            kind.to_string(),
            "Invalid enum value. Expected 'open6' | 'open4', received 'open9'"
        );
    }
}
