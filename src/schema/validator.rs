//! Form Validator
//!
//! Coerces raw posted strings into typed values according to a [`FormSpec`].
//! The intent is checked first and aborts everything else on mismatch; after
//! that every field is validated independently and all of its violations are
//! collected.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use super::error::{ErrorSet, FieldErrorKind, ValidationError};
use super::field::{Constraint, FieldKind, FieldSpec, FormSpec};
use super::submission::RawFields;
use crate::core::{EntityId, FieldValue, FormValue};

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-']+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid");
}

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Validates `raw` against `spec`.
///
/// Returns the typed value object, or the intent mismatch / collected field
/// errors.
pub fn validate(raw: &RawFields, spec: &FormSpec) -> Result<FormValue, ValidationError> {
    check_intent(raw, spec)?;

    let mut value = FormValue::new();
    let mut errors = ErrorSet::new();

    for field in spec.fields() {
        match validate_field(field, raw.get_all(field.name())) {
            Ok(Some(coerced)) => value.insert(field.name(), coerced),
            Ok(None) => {}
            Err(kinds) => errors.extend_field(field.name(), kinds),
        }
    }

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(ValidationError::Fields(errors))
    }
}

fn check_intent(raw: &RawFields, spec: &FormSpec) -> Result<(), ValidationError> {
    match raw.intent() {
        Some(intent) if intent.operation() == spec.intent() => Ok(()),
        other => Err(ValidationError::IntentMismatch {
            expected: spec.intent().to_string(),
            found: other.map(|intent| intent.to_string()),
        }),
    }
}

/// Validates one field. `Ok(None)` means an absent optional field.
fn validate_field(
    field: &FieldSpec,
    raw_values: &[String],
) -> Result<Option<FieldValue>, Vec<FieldErrorKind>> {
    let present: Vec<&str> = raw_values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if field.is_multi_valued() {
        return validate_ids(field, &present).map(Some);
    }

    let raw = match present.as_slice() {
        [] if field.is_required() => return Err(vec![FieldErrorKind::Required]),
        [] => return Ok(None),
        [single] => *single,
        _ => return Err(vec![FieldErrorKind::UnexpectedList]),
    };

    let mut errors = Vec::new();
    let coerced = match coerce(field.kind(), raw) {
        Ok(value) => Some(value),
        Err(kind) => {
            errors.push(kind);
            None
        }
    };

    for constraint in field.constraints() {
        if let Some(kind) = check_constraint(constraint, raw) {
            errors.push(kind);
        }
    }

    match coerced {
        Some(value) if errors.is_empty() => Ok(Some(value)),
        _ => Err(errors),
    }
}

fn validate_ids(field: &FieldSpec, present: &[&str]) -> Result<FieldValue, Vec<FieldErrorKind>> {
    if present.is_empty() && field.is_required() {
        return Err(vec![FieldErrorKind::Required]);
    }

    let mut errors = Vec::new();
    for constraint in field.constraints() {
        // Report each offending id once even if it was posted twice.
        let distinct: BTreeSet<&str> = present.iter().copied().collect();
        for raw in distinct {
            if let Some(kind) = check_constraint(constraint, raw) {
                errors.push(kind);
            }
        }
    }

    if errors.is_empty() {
        Ok(FieldValue::Ids(
            present.iter().map(|raw| EntityId::new(*raw)).collect(),
        ))
    } else {
        Err(errors)
    }
}

fn coerce(kind: FieldKind, raw: &str) -> Result<FieldValue, FieldErrorKind> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Enum => Ok(FieldValue::Choice(raw.to_string())),
        FieldKind::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(FieldValue::Number)
            .ok_or(FieldErrorKind::NotANumber),
        FieldKind::Date => parse_date(raw)
            .map(FieldValue::Date)
            .ok_or(FieldErrorKind::InvalidFormat { expected: "date" }),
        FieldKind::DateTime => parse_date_time(raw)
            .map(FieldValue::DateTime)
            .ok_or(FieldErrorKind::InvalidFormat { expected: "date" }),
        FieldKind::IdArray => Ok(FieldValue::Ids(BTreeSet::from([EntityId::new(raw)]))),
    }
}

fn check_constraint(constraint: &Constraint, raw: &str) -> Option<FieldErrorKind> {
    match constraint {
        Constraint::MinLength(min) if raw.chars().count() < *min => {
            Some(FieldErrorKind::TooShort { min: *min })
        }
        Constraint::MinLength(_) => None,
        Constraint::Email if !EMAIL_PATTERN.is_match(raw) => Some(FieldErrorKind::InvalidEmail),
        Constraint::Email => None,
        Constraint::Domain(options) if !options.iter().any(|option| option.id == raw) => {
            Some(FieldErrorKind::NotInDomain {
                value: raw.to_string(),
                expected: options.iter().map(|option| option.id.clone()).collect(),
            })
        }
        Constraint::Domain(_) => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
