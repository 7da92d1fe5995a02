use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::{EntityId, EntityKind, FieldValue, FormValue, PrincipalId, Result};
use crate::relation::RelationChange;

/// Filter applied on top of the id when looking an entity up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// Only entities whose owner reference equals the principal.
    Owner(PrincipalId),
    /// Existence by id alone.
    Any,
}

impl AccessScope {
    pub fn admits(&self, owner: Option<&PrincipalId>) -> bool {
        match self {
            Self::Owner(principal) => owner == Some(principal),
            Self::Any => true,
        }
    }
}

/// Persisted entity as seen by the submission core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub kind: EntityKind,
    pub id: EntityId,
    pub owner: Option<PrincipalId>,
    pub fields: BTreeMap<String, FieldValue>,
    pub relations: BTreeMap<String, BTreeSet<EntityId>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityRecord {
    /// Ids currently attached through `relation`; empty when never set.
    pub fn relation(&self, relation: &str) -> BTreeSet<EntityId> {
        self.relations.get(relation).cloned().unwrap_or_default()
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(FieldValue::as_str)
    }
}

/// Write payload for `create` / `update`.
///
/// Scalar fields replace the stored ones; relation changes are applied in the
/// same call so a reader never sees half of a reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityData {
    pub owner: Option<PrincipalId>,
    pub fields: FormValue,
    pub relations: Vec<RelationChange>,
}

/// Journal entry recorded for every successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum StoreOperation {
    Create {
        kind: EntityKind,
        id: EntityId,
        relations: Vec<RelationChange>,
    },
    Update {
        kind: EntityKind,
        id: EntityId,
        relations: Vec<RelationChange>,
    },
    Delete {
        kind: EntityKind,
        id: EntityId,
    },
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: &EntityId,
        scope: &AccessScope,
    ) -> Result<Option<EntityRecord>>;

    async fn create(&self, kind: EntityKind, data: EntityData) -> Result<EntityId>;

    async fn update(&self, kind: EntityKind, id: &EntityId, data: EntityData) -> Result<EntityId>;

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<()>;
}
