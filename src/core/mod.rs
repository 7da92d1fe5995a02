pub mod error;
pub mod types;
pub mod value;

pub use error::{Result, StoreError};
pub use types::{EntityId, EntityKind, PrincipalId};
pub use value::{FieldValue, FormValue};
