//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed user store using Diesel ORM
//! - **memory**: process-local user store for database-free runs and tests
//! - **deadline**: timeout decorator applied to whichever store is active
//!
//! Adapters translate between domain types and infrastructure-specific
//! representations. They contain no business logic.

pub mod deadline;
pub mod memory;
pub mod persistence;
