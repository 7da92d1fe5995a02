//! Persistence collaborator
//!
//! The submission core only needs find/create/update/delete by id with
//! same-call relation changes. `EntityStore` is that seam; `InMemoryStore`
//! backs the dev server and the tests.

mod memory;
mod store;

pub use memory::InMemoryStore;
pub use store::{AccessScope, EntityData, EntityRecord, EntityStore, StoreOperation};
