//! Persistence layer for the inventory system.
//!
//! - [`EntityStore`] is the storage collaborator, with in-memory and
//!   PostgreSQL implementations
//! - [`ChangeTracker`] records which entities a unit of work touched
//! - [`UnitOfWork::save_changes`] commits tracked entities and then publishes
//!   the domain events they queued

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod tracker;
pub mod unit_of_work;

pub use error::{PersistenceError, Result};
pub use memory::InMemoryEntityStore;
pub use postgres::PostgresEntityStore;
pub use store::{Change, ChangeSet, EntityStore, EntityStoreExt};
pub use tracker::{ChangeTracker, CollectedEvents, EntityKey, EntityState, TrackedEntity};
pub use unit_of_work::{SaveOutcome, UnitOfWork};
