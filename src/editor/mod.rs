//! Editor sessions
//!
//! One generic session handles every entity editor. What differs per entity
//! (forms, access rule, relations, defaults, cross-field checks, redirect
//! target and notification titles) lives behind [`EditorAdapter`].

mod entities;

pub use entities::{
    ClubEditor, MatchEditor, MemberEditor, MembershipTypeEditor, SeasonEditor, SportEditor,
    TEAM_TYPES, TeamEditor,
};

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

use crate::core::{EntityId, FieldValue, FormValue, PrincipalId, StoreError};
use crate::persist::EntityStore;
use crate::schema::{
    ErrorSet, FormSpec, INTENT_FIELD, RawFields, Submission, ValidationError, validate,
};
use crate::upsert::{self, UpsertError, UpsertTarget};

/// Field carrying the entity id on both upsert and delete forms.
pub const ID_FIELD: &str = "id";

/// Which mutation a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Removed,
}

/// Entity-specific half of an editor.
pub trait EditorAdapter: Send + Sync {
    /// Route segment the editor is mounted under, e.g. `team-editor`.
    fn editor_name(&self) -> &'static str;

    fn target(&self) -> UpsertTarget;

    fn upsert_form(&self) -> FormSpec;

    fn delete_form(&self) -> FormSpec;

    /// Fills optional fields that persist with a default.
    fn apply_defaults(&self, _value: &mut FormValue) {}

    /// Cross-field checks run after field validation succeeded.
    fn check(&self, _value: &FormValue, _errors: &mut ErrorSet) {}

    /// Where the client goes after a successful mutation.
    fn redirect_path(&self, value: &FormValue) -> String;

    fn title(&self, outcome: Outcome) -> String {
        let label = self.target().kind.label();
        match outcome {
            Outcome::Created => format!("{label} created"),
            Outcome::Updated => format!("{label} updated"),
            Outcome::Removed => format!("{label} removed"),
        }
    }
}

/// Forms and adapter of one editor, built once at startup.
#[derive(Clone)]
pub struct EditorConfig {
    pub name: &'static str,
    pub upsert: FormSpec,
    pub delete: FormSpec,
    pub adapter: Arc<dyn EditorAdapter>,
}

impl EditorConfig {
    pub fn from_adapter(adapter: Arc<dyn EditorAdapter>) -> Self {
        Self {
            name: adapter.editor_name(),
            upsert: adapter.upsert_form(),
            delete: adapter.delete_form(),
            adapter,
        }
    }
}

impl std::fmt::Debug for EditorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorConfig")
            .field("name", &self.name)
            .field("upsert", &self.upsert.intent())
            .field("delete", &self.delete.intent())
            .finish()
    }
}

/// All editors, keyed by route name.
#[derive(Debug, Clone, Default)]
pub struct Editors {
    configs: BTreeMap<&'static str, Arc<EditorConfig>>,
}

impl Editors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let adapters: [Arc<dyn EditorAdapter>; 7] = [
            Arc::new(ClubEditor),
            Arc::new(MemberEditor),
            Arc::new(SeasonEditor),
            Arc::new(TeamEditor),
            Arc::new(MatchEditor),
            Arc::new(MembershipTypeEditor),
            Arc::new(SportEditor),
        ];
        adapters
            .into_iter()
            .fold(Self::new(), |editors, adapter| editors.with(adapter))
    }

    pub fn with(mut self, adapter: Arc<dyn EditorAdapter>) -> Self {
        let config = EditorConfig::from_adapter(adapter);
        self.configs.insert(config.name, Arc::new(config));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<EditorConfig>> {
        self.configs.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.configs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Default,
    Destructive,
}

/// Flash message shown once after the redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub variant: ToastVariant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub notification: Notification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Field or form-level validation failed.
    Invalid,
    /// The entity is absent or not visible to the principal.
    NotFound,
    /// Intent missing or not handled by this editor.
    IntentMismatch,
}

impl RejectReason {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid | Self::IntentMismatch => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedSubmission {
    pub reason: RejectReason,
    pub submission: Submission,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionReply {
    Redirect(Redirect),
    Rejected(RejectedSubmission),
}

impl SubmissionReply {
    fn rejected(reason: RejectReason, submission: Submission) -> Self {
        Self::Rejected(RejectedSubmission { reason, submission })
    }
}

/// One submission against one editor. Cheap to build per request.
pub struct EditorSession<'a> {
    config: &'a EditorConfig,
    store: &'a dyn EntityStore,
}

impl<'a> EditorSession<'a> {
    pub fn new(config: &'a EditorConfig, store: &'a dyn EntityStore) -> Self {
        Self { config, store }
    }

    /// Validates and applies `raw` on behalf of `principal`.
    ///
    /// Validation and not-found outcomes come back as `Rejected`; only
    /// persistence faults are returned as `Err`.
    pub async fn submit(
        &self,
        principal: &PrincipalId,
        raw: RawFields,
    ) -> Result<SubmissionReply, StoreError> {
        let operation = raw.intent().map(|intent| intent.operation().to_string());
        match operation.as_deref() {
            Some(op) if op == self.config.upsert.intent() => self.upsert(principal, raw).await,
            Some(op) if op == self.config.delete.intent() => self.delete(principal, raw).await,
            _ => {
                let expected = format!(
                    "{} | {}",
                    self.config.upsert.intent(),
                    self.config.delete.intent()
                );
                Ok(self.intent_mismatch(raw, expected))
            }
        }
    }

    async fn upsert(
        &self,
        principal: &PrincipalId,
        raw: RawFields,
    ) -> Result<SubmissionReply, StoreError> {
        let adapter = &self.config.adapter;
        let mut value = match self.validated(&raw, &self.config.upsert) {
            Ok(value) => value,
            Err(reply) => return Ok(reply),
        };

        let mut form_errors = ErrorSet::new();
        adapter.check(&value, &mut form_errors);
        if !form_errors.is_empty() {
            debug!(editor = self.config.name, errors = %form_errors, "submission rejected");
            let submission = Submission::new(raw).rejected(&form_errors);
            return Ok(SubmissionReply::rejected(RejectReason::Invalid, submission));
        }

        let path = adapter.redirect_path(&value);
        let entity_id = match self.targeted_id(&raw, &mut value) {
            Ok(id) => id,
            Err(reply) => return Ok(reply),
        };
        adapter.apply_defaults(&mut value);

        let target = adapter.target();
        match upsert::upsert(self.store, &target, principal, value, entity_id.as_ref()).await {
            Ok(upserted) => {
                let outcome = if upserted.created {
                    Outcome::Created
                } else {
                    Outcome::Updated
                };
                Ok(self.redirect(path, outcome, ToastVariant::Default))
            }
            Err(err) => self.not_found_or_fault(err, raw),
        }
    }

    async fn delete(
        &self,
        principal: &PrincipalId,
        raw: RawFields,
    ) -> Result<SubmissionReply, StoreError> {
        let adapter = &self.config.adapter;
        let mut value = match self.validated(&raw, &self.config.delete) {
            Ok(value) => value,
            Err(reply) => return Ok(reply),
        };

        let path = adapter.redirect_path(&value);
        // Every delete form requires `id`.
        let entity_id = match self.targeted_id(&raw, &mut value) {
            Ok(Some(id)) => id,
            Ok(None) => {
                let expected = self.config.delete.intent().to_string();
                return Ok(self.intent_mismatch(raw, expected));
            }
            Err(reply) => return Ok(reply),
        };

        let target = adapter.target();
        match upsert::delete(self.store, &target, principal, &entity_id).await {
            Ok(()) => Ok(self.redirect(path, Outcome::Removed, ToastVariant::Destructive)),
            Err(err) => self.not_found_or_fault(err, raw),
        }
    }

    fn validated(&self, raw: &RawFields, spec: &FormSpec) -> Result<FormValue, SubmissionReply> {
        validate(raw, spec).map_err(|err| {
            debug!(editor = self.config.name, intent = spec.intent(), error = %err, "submission rejected");
            let mut submission = Submission::new(raw.clone());
            match err {
                ValidationError::Fields(errors) => {
                    SubmissionReply::rejected(RejectReason::Invalid, submission.rejected(&errors))
                }
                mismatch @ ValidationError::IntentMismatch { .. } => {
                    submission.push_form_error(mismatch.to_string());
                    SubmissionReply::rejected(RejectReason::IntentMismatch, submission)
                }
            }
        })
    }

    /// Takes the id off `value`. A targeted intent (`delete-member:42`) must
    /// name the same id the form carries.
    fn targeted_id(
        &self,
        raw: &RawFields,
        value: &mut FormValue,
    ) -> Result<Option<EntityId>, SubmissionReply> {
        let id = take_id(value);
        let Some(intent) = raw.intent() else {
            return Ok(id);
        };
        match intent.target() {
            Some(target) if id.as_ref().map(EntityId::as_str) != Some(target) => {
                let expected = match &id {
                    Some(id) => format!("{}:{id}", intent.operation()),
                    None => intent.operation().to_string(),
                };
                Err(self.intent_mismatch(raw.clone(), expected))
            }
            _ => Ok(id),
        }
    }

    fn intent_mismatch(&self, raw: RawFields, expected: String) -> SubmissionReply {
        let mismatch = ValidationError::IntentMismatch {
            expected,
            found: raw.get(INTENT_FIELD).map(ToString::to_string),
        };
        debug!(editor = self.config.name, error = %mismatch, "submission rejected");
        let mut submission = Submission::new(raw);
        submission.push_form_error(mismatch.to_string());
        SubmissionReply::rejected(RejectReason::IntentMismatch, submission)
    }

    fn redirect(&self, path: String, outcome: Outcome, variant: ToastVariant) -> SubmissionReply {
        SubmissionReply::Redirect(Redirect {
            path,
            notification: Notification {
                title: self.config.adapter.title(outcome),
                variant,
            },
        })
    }

    fn not_found_or_fault(
        &self,
        err: UpsertError,
        raw: RawFields,
    ) -> Result<SubmissionReply, StoreError> {
        match err {
            UpsertError::NotFound { kind, .. } => {
                let mut submission = Submission::new(raw);
                submission.push_form_error(format!("{} not found", kind.label()));
                Ok(SubmissionReply::rejected(RejectReason::NotFound, submission))
            }
            UpsertError::Persistence(err) => {
                error!(editor = self.config.name, error = %err, "persistence failure");
                Err(err)
            }
        }
    }
}

fn take_id(value: &mut FormValue) -> Option<EntityId> {
    match value.remove(ID_FIELD)? {
        FieldValue::Text(id) => Some(EntityId::new(id)),
        _ => None,
    }
}
