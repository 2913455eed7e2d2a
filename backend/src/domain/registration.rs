//! Validated input for creating a user record.
//!
//! Handlers build a [`NewUser`] from raw request fields before calling the
//! command port, so the store is never touched with invalid data.

use std::fmt;

use super::{DisplayName, Email, Password, UserValidationError};

/// Field-level failure raised while validating registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewUserValidationError {
    Name(UserValidationError),
    Email(UserValidationError),
    EmptyPassword,
}

impl NewUserValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Email(_) => "email",
            Self::EmptyPassword => "password",
        }
    }

    /// Stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Name(UserValidationError::DisplayNameTooLong { .. }) => "name_too_long",
            Self::Name(_) => "empty_name",
            Self::Email(UserValidationError::EmptyEmail) => "empty_email",
            Self::Email(UserValidationError::EmailTooLong { .. }) => "email_too_long",
            Self::Email(_) => "invalid_email",
            Self::EmptyPassword => "empty_password",
        }
    }
}

impl fmt::Display for NewUserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(err) | Self::Email(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for NewUserValidationError {}

/// Registration input with every field validated; the password is still
/// plain text and is hashed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    display_name: DisplayName,
    email: Email,
    password: Password,
}

impl NewUser {
    /// Validate raw request fields in order: name, email, password.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, NewUserValidationError> {
        let display_name = DisplayName::new(name).map_err(NewUserValidationError::Name)?;
        let email = Email::new(email).map_err(NewUserValidationError::Email)?;
        let password = Password::new(password).ok_or(NewUserValidationError::EmptyPassword)?;
        Ok(Self {
            display_name,
            email,
            password,
        })
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}
