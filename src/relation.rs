//! Relation reconciliation
//!
//! Computes the connect/disconnect pair that turns a persisted many-to-many
//! set into the desired one. Pure: no I/O, no ordering, duplicates collapse.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::core::EntityId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDiff {
    pub to_connect: BTreeSet<EntityId>,
    pub to_disconnect: BTreeSet<EntityId>,
}

impl RelationDiff {
    pub fn is_empty(&self) -> bool {
        self.to_connect.is_empty() && self.to_disconnect.is_empty()
    }

    /// Applies the diff to `previous`, yielding the reconciled set.
    pub fn apply(&self, previous: &BTreeSet<EntityId>) -> BTreeSet<EntityId> {
        previous
            .difference(&self.to_disconnect)
            .chain(self.to_connect.iter())
            .cloned()
            .collect()
    }
}

/// `to_connect = desired - previous`, `to_disconnect = previous - desired`.
pub fn reconcile(previous: &BTreeSet<EntityId>, desired: &BTreeSet<EntityId>) -> RelationDiff {
    RelationDiff {
        to_connect: desired.difference(previous).cloned().collect(),
        to_disconnect: previous.difference(desired).cloned().collect(),
    }
}

/// A reconciled diff bound to the relation it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationChange {
    pub relation: String,
    #[serde(flatten)]
    pub diff: RelationDiff,
}

impl RelationChange {
    pub fn new(relation: impl Into<String>, diff: RelationDiff) -> Self {
        Self {
            relation: relation.into(),
            diff,
        }
    }
}
