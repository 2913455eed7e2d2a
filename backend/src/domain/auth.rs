//! Authentication primitives: passwords and login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Plain-text secret supplied by a caller.
///
/// The buffer is zeroed on drop and `Debug` output is redacted. Whitespace is
/// preserved to avoid surprising credential comparisons.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a non-empty secret; returns `None` for an empty string.
    pub fn new(secret: &str) -> Option<Self> {
        (!secret.is_empty()).then(|| Self(Zeroizing::new(secret.to_owned())))
    }

    /// Raw secret bytes, for hashing only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Credentials presented at login.
///
/// ## Invariants
/// - `email` is trimmed and non-empty. Its shape is not checked here: an
///   address that could never have been registered simply fails to verify.
/// - `password` is non-empty.
///
/// # Examples
/// ```
/// use registration::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" a@x.com ", "p1").unwrap();
/// assert_eq!(creds.email(), "a@x.com");
/// assert_eq!(creds.password().expose(), "p1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        let password = Password::new(password).ok_or(LoginValidationError::EmptyPassword)?;

        Ok(Self {
            email: normalized.to_owned(),
            password,
        })
    }

    /// Claimed identity used for the store lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Secret provided by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}
