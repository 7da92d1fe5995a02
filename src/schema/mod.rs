//! Form Schema Module
//!
//! Declarative field tables and the validator that turns posted form data
//! into typed values.
//!
//! # Architecture
//!
//! - `field.rs` - `FieldSpec` / `FormSpec` builders
//! - `options.rs` - normalization of select options into `{id, name}`
//! - `submission.rs` - raw posted fields, intents and the echoed `Submission`
//! - `validator.rs` - coercion and constraint checks
//! - `error.rs` - field error kinds and the collected `ErrorSet`

mod error;
mod field;
mod options;
mod submission;
mod validator;

pub use error::{ErrorSet, FieldErrorKind, ValidationError};
pub use field::{Constraint, FieldKind, FieldSpec, FormSpec};
pub use options::{RawOption, SelectOption, normalize_options};
pub use submission::{INTENT_FIELD, Intent, RawFields, Submission};
pub use validator::validate;
