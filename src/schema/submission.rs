use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::ErrorSet;
use crate::core::FormValue;

/// Name of the discriminator field present on every submission.
pub const INTENT_FIELD: &str = "intent";

/// Raw form fields as posted: every name maps to one or more string values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFields {
    values: BTreeMap<String, Vec<String>>,
}

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds fields from decoded `name=value` pairs, keeping repeated names.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = Self::new();
        for (name, value) in pairs {
            fields.append(name, value);
        }
        fields
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn intent(&self) -> Option<Intent> {
        self.get(INTENT_FIELD).and_then(Intent::parse)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parsed intent of the form `operation[:target]`.
///
/// The operation picks the field table; the target tells sibling rows that
/// share one action endpoint apart (`delete-member:42`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Intent {
    operation: String,
    target: Option<String>,
}

impl Intent {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            target: None,
        }
    }

    pub fn targeted(operation: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            target: Some(target.into()),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.split_once(':') {
            Some((operation, target)) if !target.is_empty() => {
                Some(Self::targeted(operation, target))
            }
            Some((operation, _)) => Some(Self::new(operation)),
            None => Some(Self::new(raw)),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{}:{}", self.operation, target),
            None => f.write_str(&self.operation),
        }
    }
}

/// Per-request record echoed back to the form when a submission is rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub intent: Option<String>,
    pub raw_fields: RawFields,
    pub parsed_value: Option<FormValue>,
    pub errors: BTreeMap<String, Vec<String>>,
    pub form_errors: Vec<String>,
}

impl Submission {
    pub fn new(raw_fields: RawFields) -> Self {
        Self {
            intent: raw_fields.get(INTENT_FIELD).map(ToString::to_string),
            raw_fields,
            parsed_value: None,
            errors: BTreeMap::new(),
            form_errors: Vec::new(),
        }
    }

    pub fn accepted(mut self, value: FormValue) -> Self {
        self.parsed_value = Some(value);
        self
    }

    pub fn rejected(mut self, errors: &ErrorSet) -> Self {
        for (name, messages) in errors.field_messages() {
            self.errors.entry(name).or_default().extend(messages);
        }
        self.form_errors.extend(errors.form_errors().iter().cloned());
        self
    }

    pub fn push_form_error(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.parsed_value.is_some() && self.errors.is_empty() && self.form_errors.is_empty()
    }
}
