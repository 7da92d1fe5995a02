// ============================================================================
// clubroom: entity editor submissions
// ============================================================================

pub mod auth;
pub mod config;
pub mod core;
pub mod correlate;
pub mod editor;
pub mod persist;
pub mod relation;
pub mod schema;
pub mod upsert;
pub mod web;

pub use crate::auth::{AuthError, PrincipalResolver, SeedError, SessionRegistry};
pub use crate::config::AppConfig;
pub use crate::core::{EntityId, EntityKind, FieldValue, FormValue, PrincipalId, Result, StoreError};
pub use crate::correlate::{SubmissionChannel, SubmissionStatus, correlate};
pub use crate::editor::{EditorSession, Editors, SubmissionReply};
pub use crate::persist::{EntityStore, InMemoryStore};
pub use crate::relation::{RelationDiff, reconcile};
pub use crate::schema::{FormSpec, RawFields, Submission, validate};
pub use crate::upsert::{AccessRule, UpsertError, UpsertTarget};
pub use crate::web::{AppState, build_router};
