//! Password hashing for stored credentials.
//!
//! Passwords are hashed with Argon2id using a random per-record salt and an
//! optional server-side pepper. The encoded PHC string is the only form that
//! reaches the store; verification parses it back and lets `argon2` perform
//! the constant-time comparison.

use argon2::password_hash::{
    self, PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, ParamsBuilder, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use super::{Password, PasswordHash};

/// Errors raised while hashing or parsing credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialHashError {
    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

impl From<password_hash::Error> for CredentialHashError {
    fn from(err: password_hash::Error) -> Self {
        Self::Hash(err.to_string())
    }
}

const DUMMY_SECRET: &str = "registration-dummy-secret";

/// Argon2id hasher shared by registration and login.
///
/// Cheap to clone: the Argon2 context holds parameters only.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    pepper: Zeroizing<Vec<u8>>,
    dummy_hash: String,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("peppered", &!self.pepper.is_empty())
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    // Roughly 19 MiB and two passes: the OWASP Argon2id baseline.
    const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
    const DEFAULT_ITERATIONS: u32 = 2;
    const DEFAULT_PARALLELISM: u32 = 1;
    const OUTPUT_LEN: usize = 32;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;

    /// Build a hasher with the default Argon2id parameters.
    pub fn new(pepper: Option<&[u8]>) -> Result<Self, CredentialHashError> {
        let params = ParamsBuilder::new()
            .m_cost(Self::DEFAULT_MEMORY_KIB)
            .t_cost(Self::DEFAULT_ITERATIONS)
            .p_cost(Self::DEFAULT_PARALLELISM)
            .output_len(Self::OUTPUT_LEN)
            .build()
            .map_err(|err| CredentialHashError::InvalidParams(err.to_string()))?;
        Self::with_params(params, pepper)
    }

    /// Build a hasher with caller-chosen parameters (tests, constrained hosts).
    pub fn with_params(params: Params, pepper: Option<&[u8]>) -> Result<Self, CredentialHashError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let pepper = Zeroizing::new(pepper.map(<[u8]>::to_vec).unwrap_or_default());
        let mut hasher = Self {
            argon2,
            pepper,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.encode(DUMMY_SECRET)?;
        Ok(hasher)
    }

    /// Hash a password into a storable PHC string.
    pub fn hash_password(&self, password: &Password) -> Result<PasswordHash, CredentialHashError> {
        self.encode(password.expose()).map(PasswordHash::from_encoded)
    }

    /// Check a password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored hash
    /// cannot be parsed.
    pub fn verify_password(
        &self,
        password: &Password,
        stored: &PasswordHash,
    ) -> Result<bool, CredentialHashError> {
        let parsed = PhcString::new(stored.as_str())
            .map_err(|err| CredentialHashError::MalformedHash(err.to_string()))?;
        let material = self.material(password.expose());
        Ok(self.argon2.verify_password(&material, &parsed).is_ok())
    }

    /// Spend the same work as a real verification and report no match.
    ///
    /// Used when the claimed identity does not exist so response timing does
    /// not reveal account existence.
    pub fn verify_against_dummy(&self, password: &Password) -> bool {
        let Ok(parsed) = PhcString::new(self.dummy_hash.as_str()) else {
            return false;
        };
        let material = self.material(password.expose());
        let _ = self.argon2.verify_password(&material, &parsed);
        false
    }

    fn encode(&self, secret: &str) -> Result<String, CredentialHashError> {
        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| CredentialHashError::Hash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;
        let material = self.material(secret);
        Ok(self.argon2.hash_password(&material, &salt)?.to_string())
    }

    fn material(&self, secret: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(secret.len() + self.pepper.len()));
        material.extend_from_slice(secret.as_bytes());
        material.extend_from_slice(&self.pepper);
        material
    }
}

/// Minimal-cost hasher for unit and integration tests.
#[cfg(any(test, feature = "test-support"))]
pub fn fast_test_hasher() -> CredentialHasher {
    let params = Params::new(8, 1, 1, Some(32)).unwrap_or_else(|err| panic!("test params: {err}"));
    CredentialHasher::with_params(params, None)
        .unwrap_or_else(|err| panic!("test hasher should build: {err}"))
}
