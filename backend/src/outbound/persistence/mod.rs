//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Implements the [`UserStore`](crate::domain::ports::UserStore) port on
//! PostgreSQL via `diesel`, with async support from `diesel-async` and `bb8`
//! pooling.
//!
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//!   private to this module.
//! - Every driver failure is mapped to a `UserStoreError` variant.
//!
//! ```no_run
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! use registration::outbound::persistence::{DbPool, DieselUserStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/registration")).await?;
//! let store = DieselUserStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_user_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_store::DieselUserStore;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
