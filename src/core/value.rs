use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::EntityId;

/// A coerced field value, safe to hand to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Choice(String),
    Ids(BTreeSet<EntityId>),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Date(_) => "date",
            Self::DateTime(_) => "dateTime",
            Self::Choice(_) => "choice",
            Self::Ids(_) => "ids",
        }
    }

    /// Text and choice values share string access.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&BTreeSet<EntityId>> {
        match self {
            Self::Ids(ids) => Some(ids),
            _ => None,
        }
    }
}

/// Typed value object produced by a successful validation.
///
/// Optional fields that were not submitted are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValue {
    fields: BTreeMap<String, FieldValue>,
}

impl FormValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_f64)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(FieldValue::as_date)
    }

    pub fn ids(&self, name: &str) -> Option<&BTreeSet<EntityId>> {
        self.get(name).and_then(FieldValue::as_ids)
    }

    /// Inserts `value` only when the field was not submitted.
    pub fn set_default(&mut self, name: &str, value: FieldValue) {
        self.fields.entry(name.to_string()).or_insert(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_default_keeps_submitted_value() {
        let mut value = FormValue::new();
        value.insert("mobile", FieldValue::Text("0400".into()));
        value.set_default("mobile", FieldValue::Text(String::new()));
        value.set_default("description", FieldValue::Text(String::new()));

        assert_eq!(value.text("mobile"), Some("0400"));
        assert_eq!(value.text("description"), Some(""));
    }

    #[test]
    fn date_time_exposes_its_date() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap();
        let value = FieldValue::DateTime(dt);
        assert_eq!(value.as_date(), NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(value.type_name(), "dateTime");
    }
}
