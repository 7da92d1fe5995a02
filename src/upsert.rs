//! Authorization-scoped upsert and delete
//!
//! Create when no id is given; otherwise look the entity up through the
//! principal's access scope first and only then mutate it. The scoped lookup
//! runs on every call: the principal is resolved per request and nothing
//! here remembers a previous check.

use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{EntityId, EntityKind, FieldValue, FormValue, PrincipalId, StoreError};
use crate::persist::{AccessScope, EntityData, EntityStore};
use crate::relation::{RelationChange, reconcile};

/// Who may touch an existing entity of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// Entity carries an owner reference; only the owner may mutate it.
    Owner,
    /// Entity has no direct owner; existence by id is enough.
    Existence,
}

impl AccessRule {
    pub fn scope(&self, principal: &PrincipalId) -> AccessScope {
        match self {
            Self::Owner => AccessScope::Owner(principal.clone()),
            Self::Existence => AccessScope::Any,
        }
    }

    fn owner_for(&self, principal: &PrincipalId) -> Option<PrincipalId> {
        match self {
            Self::Owner => Some(principal.clone()),
            Self::Existence => None,
        }
    }
}

/// What an upsert or delete writes to: the kind, its access rule and the
/// names of its many-to-many relation fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertTarget {
    pub kind: EntityKind,
    pub rule: AccessRule,
    pub relations: &'static [&'static str],
}

impl UpsertTarget {
    pub const fn new(kind: EntityKind, rule: AccessRule) -> Self {
        Self {
            kind,
            rule,
            relations: &[],
        }
    }

    pub const fn with_relations(mut self, relations: &'static [&'static str]) -> Self {
        self.relations = relations;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpsertError {
    /// Absent, or not visible to the acting principal. Nothing was mutated.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub id: EntityId,
    pub created: bool,
}

/// Creates or updates one entity on behalf of `principal`.
pub async fn upsert(
    store: &dyn EntityStore,
    target: &UpsertTarget,
    principal: &PrincipalId,
    mut value: FormValue,
    entity_id: Option<&EntityId>,
) -> Result<Upserted, UpsertError> {
    let desired = take_relations(target, &mut value);

    let Some(id) = entity_id else {
        let relations = desired
            .into_iter()
            .map(|(relation, ids)| RelationChange::new(relation, reconcile(&BTreeSet::new(), &ids)))
            .collect();
        let data = EntityData {
            owner: target.rule.owner_for(principal),
            fields: value,
            relations,
        };
        let id = store.create(target.kind, data).await?;
        info!(entity = %target.kind, id = %id, principal = %principal, "entity created");
        return Ok(Upserted { id, created: true });
    };

    let scope = target.rule.scope(principal);
    let Some(existing) = store.find_by_id(target.kind, id, &scope).await? else {
        warn!(entity = %target.kind, id = %id, principal = %principal, "update target not found in principal scope");
        return Err(UpsertError::NotFound {
            kind: target.kind,
            id: id.clone(),
        });
    };

    let relations: Vec<RelationChange> = desired
        .into_iter()
        .map(|(relation, ids)| {
            let diff = reconcile(&existing.relation(relation), &ids);
            RelationChange::new(relation, diff)
        })
        .filter(|change| !change.diff.is_empty())
        .collect();
    debug!(
        entity = %target.kind,
        id = %id,
        relation_changes = relations.len(),
        "reconciled relations"
    );

    let data = EntityData {
        owner: existing.owner.clone(),
        fields: value,
        relations,
    };
    let id = store
        .update(target.kind, id, data)
        .await
        .map_err(|err| not_found_if_missing(err, target.kind, id))?;
    info!(entity = %target.kind, id = %id, principal = %principal, "entity updated");
    Ok(Upserted { id, created: false })
}

/// Deletes one entity after the same scoped lookup an update performs.
///
/// When the lookup misses, no delete call reaches the store.
pub async fn delete(
    store: &dyn EntityStore,
    target: &UpsertTarget,
    principal: &PrincipalId,
    id: &EntityId,
) -> Result<(), UpsertError> {
    let scope = target.rule.scope(principal);
    if store.find_by_id(target.kind, id, &scope).await?.is_none() {
        warn!(entity = %target.kind, id = %id, principal = %principal, "delete target not found in principal scope");
        return Err(UpsertError::NotFound {
            kind: target.kind,
            id: id.clone(),
        });
    }

    store
        .delete(target.kind, id)
        .await
        .map_err(|err| not_found_if_missing(err, target.kind, id))?;
    info!(entity = %target.kind, id = %id, principal = %principal, "entity deleted");
    Ok(())
}

/// The record can disappear between the scoped lookup and the write.
fn not_found_if_missing(err: StoreError, kind: EntityKind, id: &EntityId) -> UpsertError {
    match err {
        StoreError::Missing(..) => {
            warn!(entity = %kind, id = %id, "entity removed before the write landed");
            UpsertError::NotFound {
                kind,
                id: id.clone(),
            }
        }
        other => UpsertError::Persistence(other),
    }
}

/// Splits relation fields off the value. Relations that were not submitted
/// are left alone rather than emptied.
fn take_relations(
    target: &UpsertTarget,
    value: &mut FormValue,
) -> Vec<(&'static str, BTreeSet<EntityId>)> {
    target
        .relations
        .iter()
        .filter_map(|relation| match value.remove(relation) {
            Some(FieldValue::Ids(ids)) => Some((*relation, ids)),
            Some(other) => {
                warn!(relation = %relation, found = other.type_name(), "relation field is not an id set");
                None
            }
            None => None,
        })
        .collect()
}
