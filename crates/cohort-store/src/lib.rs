//! SQLite-backed store for the consolidated schema.
//!
//! The store owns schema initialisation, surrogate ids, and
//! `date_last_updated` stamps. Callers hand it insert payloads and
//! natural keys; they never write SQL. All writes a reconciler performs
//! go through [`Store::in_transaction`] so a multi-stage load commits
//! atomically or not at all.

mod error;
mod lookup;
mod schema;
mod store;

pub use error::{Result, StoreError};
pub use schema::SCHEMA;
pub use store::Store;
