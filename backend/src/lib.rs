//! User registration service.
//!
//! - [`domain`]: user records, credentials, ports, and services.
//! - [`outbound`]: Postgres and in-memory stores plus the deadline decorator.
//! - [`inbound`]: actix-web handlers, sessions, and error mapping.
//! - [`server`]: settings, wiring, and the HTTP server.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
