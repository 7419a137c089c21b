//! # Store Module
//!
//! The data-access collaborator behind the dog endpoints.
//!
//! Controllers never talk to a database directly. They hold an
//! `Arc<dyn DogStore>` that is constructed at startup and injected, so the
//! same controllers run against SQLite in production and against
//! [`MemoryDogStore`] in tests.
//!
//! ## Contract
//!
//! | Operation    | Found                | Missing        |
//! |--------------|----------------------|----------------|
//! | `find_many`  | matching records     | empty vec      |
//! | `find_by_id` | `Some(dog)`          | `None`         |
//! | `create`     | the stored record    | n/a            |
//! | `update`     | `Some(updated)`      | `None`         |
//! | `delete`     | `Some(removed)`      | `None`         |
//!
//! Lists are ordered by ascending id. A missing id is never an error and never
//! touches another record.

mod memory;
mod sqlite;

pub use memory::MemoryDogStore;
pub use sqlite::SqliteDogStore;

use crate::model::{Dog, DogFilter, DogPatch, NewDog};
use std::fmt;

/// Persistence operations used by the controllers.
pub trait DogStore: Send + Sync {
    fn find_many(&self, filter: &DogFilter) -> Result<Vec<Dog>, StoreError>;
    fn find_by_id(&self, id: i64) -> Result<Option<Dog>, StoreError>;
    fn create(&self, dog: NewDog) -> Result<Dog, StoreError>;
    fn update(&self, id: i64, patch: DogPatch) -> Result<Option<Dog>, StoreError>;
    fn delete(&self, id: i64) -> Result<Option<Dog>, StoreError>;
}

/// Failure reported by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A schema constraint rejected the write (NOT NULL, CHECK, UNIQUE, ...).
    ConstraintViolated(String),
    /// Connection, I/O or any other backend failure.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ConstraintViolated(msg) => write!(f, "constraint violated: {msg}"),
            StoreError::Backend(msg) => write!(f, "store backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
