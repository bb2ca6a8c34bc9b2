use crate::{Error, error::ValidationError};

/// Password hashing capability.
///
/// Implementations must use a slow, salted, one-way scheme, and
/// verification must run in constant time regardless of mismatch position.
/// The core never inspects raw passwords beyond this call boundary.
pub trait PasswordHasher: Send + Sync + 'static {
    /// Hash a password into an opaque digest.
    fn hash(&self, password: &str) -> Result<String, Error>;

    /// Verify a candidate password against a stored digest.
    fn verify(&self, digest: &str, candidate: &str) -> bool;
}

/// Default hasher backed by argon2 (via `password_auth`).
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, Error> {
        use password_auth::generate_hash;
        if password.is_empty() {
            return Err(ValidationError::MissingField("Password is required".to_string()).into());
        }
        Ok(generate_hash(password))
    }

    fn verify(&self, digest: &str, candidate: &str) -> bool {
        use password_auth::verify_password;
        verify_password(candidate, digest).is_ok()
    }
}
