//! Domain primitives, ports, and services.
//!
//! Purpose: define strongly typed user records and the use-cases that act
//! on them, independent of HTTP and persistence. Types document their
//! invariants and serialisation contracts (serde) in their own Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User, StoredUser, NewUser: public view, stored record, validated input.
//! - CredentialHasher / CredentialVerifier: Argon2id hashing and checks.
//! - UserService / CredentialLoginService: implementations of the driving
//!   ports in [`ports`].

pub mod auth;
pub mod credential_verifier;
pub mod credentials;
pub mod error;
pub mod login_service;
pub mod ports;
pub mod registration;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError, Password};
pub use self::credential_verifier::CredentialVerifier;
#[cfg(any(test, feature = "test-support"))]
pub use self::credentials::fast_test_hasher;
pub use self::credentials::{CredentialHashError, CredentialHasher};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::login_service::CredentialLoginService;
pub use self::registration::{NewUser, NewUserValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EMAIL_MAX, Email, NewUserRecord, PasswordHash, StoredUser, User,
    UserId, UserValidationError,
};
pub use self::user_service::{STORE_UNAVAILABLE_MESSAGE, UserService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use registration::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
