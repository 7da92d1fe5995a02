//! Option normalization
//!
//! Select-style inputs historically arrived either as a list of plain strings
//! (`["open6", "mens4"]`) or as a list of `{id, name}` pairs built from loaded
//! records. Both shapes are collapsed into [`SelectOption`] here so nothing
//! downstream has to discriminate at runtime.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Canonical option shape consumed by `Domain` constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One option as it may arrive at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Plain(String),
    Pair { id: String, name: String },
}

impl From<&str> for RawOption {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<(&str, &str)> for RawOption {
    fn from((id, name): (&str, &str)) -> Self {
        Self::Pair {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Normalizes any mix of option shapes.
///
/// Blank ids are dropped and the first occurrence of an id wins.
pub fn normalize_options<I, T>(raw: I) -> Vec<SelectOption>
where
    I: IntoIterator<Item = T>,
    T: Into<RawOption>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(Into::into)
        .map(|option| match option {
            RawOption::Plain(value) => {
                let id = value.trim().to_string();
                SelectOption::new(id.clone(), id)
            }
            RawOption::Pair { id, name } => SelectOption::new(id.trim(), name),
        })
        .filter(|option| !option.id.is_empty())
        .filter(|option| seen.insert(option.id.clone()))
        .collect()
}
