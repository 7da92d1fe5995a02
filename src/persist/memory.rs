use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::store::{AccessScope, EntityData, EntityRecord, EntityStore, StoreOperation};
use crate::core::{EntityId, EntityKind, Result, StoreError};
use crate::relation::RelationChange;

#[derive(Default)]
struct StoreState {
    records: HashMap<(EntityKind, EntityId), EntityRecord>,
    journal: Vec<StoreOperation>,
}

/// Process-local store used by the dev server and the test-suite.
///
/// All writes of one call happen under a single write lock, which is what
/// makes a relation connect/disconnect pair atomic for concurrent readers.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Successful writes, oldest first.
    pub async fn operations(&self) -> Vec<StoreOperation> {
        self.state.read().await.journal.clone()
    }

    /// Records of `kind` visible through `scope`, in creation order.
    pub async fn list(&self, kind: EntityKind, scope: &AccessScope) -> Result<Vec<EntityRecord>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut records: Vec<EntityRecord> = state
            .records
            .values()
            .filter(|record| record.kind == kind && scope.admits(record.owner.as_ref()))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store disabled".to_string()));
        }
        Ok(())
    }
}

fn apply_relations(record: &mut EntityRecord, changes: &[RelationChange]) -> Result<()> {
    for change in changes {
        let current = record.relations.entry(change.relation.clone()).or_default();

        if let Some(id) = change.diff.to_connect.iter().find(|id| current.contains(*id)) {
            return Err(StoreError::ConstraintViolation(format!(
                "'{}' is already connected through '{}'",
                id, change.relation
            )));
        }
        if let Some(id) = change
            .diff
            .to_disconnect
            .iter()
            .find(|id| !current.contains(*id))
        {
            return Err(StoreError::ConstraintViolation(format!(
                "'{}' is not connected through '{}'",
                id, change.relation
            )));
        }

        let reconciled = change.diff.apply(current);
        *current = reconciled;
    }
    Ok(())
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: &EntityId,
        scope: &AccessScope,
    ) -> Result<Option<EntityRecord>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .records
            .get(&(kind, id.clone()))
            .filter(|record| scope.admits(record.owner.as_ref()))
            .cloned())
    }

    async fn create(&self, kind: EntityKind, data: EntityData) -> Result<EntityId> {
        self.ensure_available()?;
        let now = Utc::now();
        let mut record = EntityRecord {
            kind,
            id: EntityId::generate(),
            owner: data.owner,
            fields: data.fields.into_inner(),
            relations: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        };
        apply_relations(&mut record, &data.relations)?;

        let id = record.id.clone();
        let mut state = self.state.write().await;
        state.records.insert((kind, id.clone()), record);
        state.journal.push(StoreOperation::Create {
            kind,
            id: id.clone(),
            relations: data.relations,
        });
        Ok(id)
    }

    async fn update(&self, kind: EntityKind, id: &EntityId, data: EntityData) -> Result<EntityId> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let Some(existing) = state.records.get(&(kind, id.clone())) else {
            return Err(StoreError::Missing(kind.to_string(), id.to_string()));
        };

        // Work on a copy so a rejected relation change leaves the record intact.
        let mut record = existing.clone();
        record.fields = data.fields.into_inner();
        if data.owner.is_some() {
            record.owner = data.owner;
        }
        apply_relations(&mut record, &data.relations)?;
        record.updated_at = Utc::now();

        state.records.insert((kind, id.clone()), record);
        state.journal.push(StoreOperation::Update {
            kind,
            id: id.clone(),
            relations: data.relations,
        });
        Ok(id.clone())
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<()> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        if state.records.remove(&(kind, id.clone())).is_none() {
            return Err(StoreError::Missing(kind.to_string(), id.to_string()));
        }
        state.journal.push(StoreOperation::Delete {
            kind,
            id: id.clone(),
        });
        Ok(())
    }
}
