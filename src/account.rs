//! Account records
//!
//! This module contains the core account struct and related functionality.
//!
//! Accounts are owned exclusively by the [`CredentialStore`](crate::repositories::CredentialStore)
//! and referenced by id everywhere else. The core account struct is defined as follows:
//!
//! | Field                    | Type                       | Description                                           |
//! | ------------------------ | -------------------------- | ----------------------------------------------------- |
//! | `id`                     | `AccountId`                | The unique, immutable identifier for the account.     |
//! | `display_name`           | `String`                   | Free-text display name.                               |
//! | `email`                  | `String`                   | Login handle, unique case-insensitively.              |
//! | `password_hash`          | `String`                   | Opaque argon2 digest; never logged or returned.       |
//! | `role`                   | `Role`                     | Authorization role; `User` on registration.           |
//! | `reset_token_hash`       | `Option<String>`           | Digest of the pending reset token, if any.            |
//! | `reset_token_expires_at` | `Option<DateTime<Utc>>`    | Expiry of the pending reset token, if any.            |

use crate::{
    Error,
    error::ValidationError,
    id::{generate_prefixed_id, validate_prefixed_id},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unique, stable identifier for a specific account
/// This value should be treated as opaque
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: &str) -> Self {
        AccountId(id.to_string())
    }

    pub fn new_random() -> Self {
        AccountId(generate_prefixed_id("acct"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this ID has the correct format for an account ID
    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "acct")
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authorization role carried in session-token claims.
///
/// Roles influence authorization decisions elsewhere in the system; this
/// core only records and propagates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user account as held by the credential store.
///
/// The reset-token fields are private: they are always set and cleared as a
/// pair through [`Account::set_pending_reset`] and
/// [`Account::clear_pending_reset`], never independently.
#[derive(Clone)]
pub struct Account {
    /// The unique identifier for the account.
    pub id: AccountId,

    /// Free-text display name.
    pub display_name: String,

    /// The email of the account holder. Unique, compared case-insensitively.
    pub email: String,

    /// Argon2 digest of the password. Set once at creation and replaced
    /// wholesale on reset.
    pub password_hash: String,

    /// The authorization role.
    pub role: Role,

    // Present only while a reset is pending. Holds the SHA-256 digest of the
    // token, not the token itself.
    reset_token_hash: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,

    /// The created at timestamp.
    pub created_at: DateTime<Utc>,

    /// The updated at timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn builder() -> AccountBuilder {
        AccountBuilder::default()
    }

    /// Digest of the pending reset token, if a reset is pending.
    pub fn reset_token_hash(&self) -> Option<&str> {
        self.reset_token_hash.as_deref()
    }

    /// Expiry of the pending reset token, if a reset is pending.
    pub fn reset_token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.reset_token_expires_at
    }

    pub fn has_pending_reset(&self) -> bool {
        self.reset_token_hash.is_some()
    }

    /// Record a pending password reset. Overwrites any prior pending token
    /// (at most one active token per account, last write wins).
    pub fn set_pending_reset(&mut self, token_hash: String, expires_at: DateTime<Utc>) {
        self.reset_token_hash = Some(token_hash);
        self.reset_token_expires_at = Some(expires_at);
        self.updated_at = Utc::now();
    }

    /// Clear the pending reset, consuming the token.
    pub fn clear_pending_reset(&mut self) {
        self.reset_token_hash = None;
        self.reset_token_expires_at = None;
        self.updated_at = Utc::now();
    }
}

// Hand-written so the password hash and reset-token digest never end up in
// logs via {:?}.
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("has_pending_reset", &self.has_pending_reset())
            .field("reset_token_expires_at", &self.reset_token_expires_at)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[derive(Default)]
pub struct AccountBuilder {
    id: Option<AccountId>,
    display_name: Option<String>,
    email: Option<String>,
    password_hash: Option<String>,
    role: Option<Role>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl AccountBuilder {
    pub fn id(mut self, id: AccountId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password_hash(mut self, password_hash: impl Into<String>) -> Self {
        self.password_hash = Some(password_hash.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn build(self) -> Result<Account, Error> {
        let now = Utc::now();
        Ok(Account {
            id: self.id.unwrap_or_default(),
            display_name: self.display_name.unwrap_or_default(),
            email: self.email.ok_or(ValidationError::MissingField(
                "Email is required".to_string(),
            ))?,
            password_hash: self.password_hash.ok_or(ValidationError::MissingField(
                "Password hash is required".to_string(),
            ))?,
            role: self.role.unwrap_or_default(),
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}
