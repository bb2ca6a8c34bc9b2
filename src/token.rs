//! Reset-token generation and validation
//!
//! Reset tokens prove control of the registered email address. They are
//! single-use and time-limited: at most one is pending per account, a new
//! request overwrites the previous one, and a successful reset consumes it.
//!
//! # Security
//!
//! Tokens are drawn from the OS CSPRNG with 256 bits of entropy. The store
//! holds a SHA-256 digest of the token rather than the plaintext, and
//! verification compares digests in constant time via the `subtle` crate so
//! the comparison cannot leak the mismatch position. For high-entropy random
//! tokens SHA-256 is sufficient; a slow password hash would add cost without
//! adding security.
//!
//! Expiry is evaluated lazily here at validation time: an expired token
//! stays in the store until overwritten or consumed, it simply fails
//! validation.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// How long a reset token remains redeemable after issuance.
pub fn reset_token_ttl() -> Duration {
    Duration::hours(1)
}

/// Outcome of validating a supplied reset token against the stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTokenStatus {
    /// Token matches and has not expired.
    Valid,
    /// No reset is pending for the account.
    Absent,
    /// A reset is pending but the supplied token does not match.
    Mismatch,
    /// The supplied token matches but its expiry has passed.
    Expired,
}

impl ResetTokenStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ResetTokenStatus::Valid)
    }
}

/// Generate a cryptographically secure reset token.
///
/// Produces a 256-bit random token encoded as URL-safe base64 (43
/// characters).
///
/// # Panics
///
/// Panics if the OS random number generator fails. This indicates a critical
/// system failure (e.g. /dev/urandom unavailable) from which recovery is not
/// possible for security-sensitive operations.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32]; // 256 bits of entropy
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a reset token for storage.
///
/// Returns a hex-encoded SHA-256 digest. The digest is what the credential
/// store persists; the plaintext token leaves the process only inside the
/// notification email.
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate a supplied token against the stored digest and expiry.
///
/// Pure function of its inputs; the caller supplies `now` so expiry
/// semantics are testable without a real clock. There is no hidden state
/// beyond what is in the account record.
pub fn validate_reset_token(
    stored_hash: Option<&str>,
    stored_expiry: Option<DateTime<Utc>>,
    supplied: &str,
    now: DateTime<Utc>,
) -> ResetTokenStatus {
    let (Some(stored_hash), Some(expires_at)) = (stored_hash, stored_expiry) else {
        return ResetTokenStatus::Absent;
    };

    let supplied_hash = hash_reset_token(supplied);
    if !constant_time_compare(supplied_hash.as_bytes(), stored_hash.as_bytes()) {
        return ResetTokenStatus::Mismatch;
    }

    if now >= expires_at {
        return ResetTokenStatus::Expired;
    }

    ResetTokenStatus::Valid
}

/// Constant-time comparison of two byte slices.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
