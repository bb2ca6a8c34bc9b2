//! Auth orchestration
//!
//! [`AuthService`] wires the credential store, password hasher, notification
//! gateway and signing material into the four public operations: register,
//! login, request-password-reset and reset-password.
//!
//! Each operation is one unit of work: lookup, then in-memory validation,
//! then mutation, in that order. There is no shared mutable state across
//! requests beyond the store itself.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::{
    Error,
    account::{Account, Role},
    error::AuthError,
    repositories::CredentialStore,
    services::{NotificationGateway, PasswordHasher},
    session::{JwtConfig, SessionToken},
    token::{generate_reset_token, hash_reset_token, reset_token_ttl, validate_reset_token},
    validation::{validate_email, validate_password},
};

/// Upper bound on a single notification delivery attempt.
const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Registration input as received from the upstream request layer.
#[derive(Clone)]
pub struct Registration {
    pub display_name: String,
    /// Accepted for parity with the registration form; the account record
    /// does not persist it.
    pub phone: String,
    pub email: String,
    pub password: String,
}

// Hand-written so the raw password never ends up in logs via {:?}.
impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("display_name", &self.display_name)
            .field("phone", &self.phone)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Orchestrates credential and session lifecycle operations.
///
/// All collaborators are supplied explicitly at construction; there is no
/// ambient service locator.
pub struct AuthService<S: CredentialStore, H: PasswordHasher, N: NotificationGateway> {
    store: Arc<S>,
    hasher: Arc<H>,
    notifier: Arc<N>,
    jwt: JwtConfig,
}

impl<S: CredentialStore, H: PasswordHasher, N: NotificationGateway> AuthService<S, H, N> {
    pub fn new(store: Arc<S>, hasher: Arc<H>, notifier: Arc<N>, jwt: JwtConfig) -> Self {
        Self {
            store,
            hasher,
            notifier,
            jwt,
        }
    }

    /// Register a new account with role `User`.
    ///
    /// Fails with [`AuthError::DuplicateEmail`] if an account already exists
    /// under the same email, compared case-insensitively. No session token
    /// is issued; the caller must log in separately.
    pub async fn register(&self, registration: Registration) -> Result<Account, Error> {
        validate_email(&registration.email)?;
        validate_password(&registration.password)?;

        if self.store.find_by_email(&registration.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail.into());
        }

        let password_hash = self.hasher.hash(&registration.password)?;
        let account = Account::builder()
            .display_name(registration.display_name)
            .email(registration.email)
            .password_hash(password_hash)
            .role(Role::User)
            .build()?;

        let account = self.store.insert(account).await?;
        tracing::info!(account_id = %account.id, "registered new account");

        Ok(account)
    }

    /// Authenticate and issue a session token.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`] with identical shape and message.
    /// This uniformity is a deliberate anti-enumeration property.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionToken, Error> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(&account.password_hash, password) {
            return Err(AuthError::InvalidCredentials.into());
        }

        SessionToken::issue(&account, Utc::now(), &self.jwt)
    }

    /// Issue a single-use reset token and deliver it out of band.
    ///
    /// Returns `Ok(())` whether or not the email is registered, so callers
    /// cannot distinguish "no such account" from "token issued". For a known
    /// account this overwrites any prior pending token (at most one active
    /// token per account; under concurrent requests the last committed write
    /// wins and silently invalidates the earlier token).
    ///
    /// The token is committed before delivery is attempted, so it remains
    /// redeemable even if the email never arrives. Delivery failure is
    /// surfaced as [`AuthError::DeliveryFailure`]; note that this differs
    /// from the generic success outcome and is a known, deliberate
    /// enumeration side channel (see DESIGN.md).
    pub async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let Some(mut account) = self.store.find_by_email(email).await? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + reset_token_ttl();
        account.set_pending_reset(hash_reset_token(&token), expires_at);
        self.store.update(&account).await?;

        let body = reset_email_body(&account.display_name, &token);
        let send = self.notifier.send(&account.email, "Password Reset Request", &body);
        match tokio::time::timeout(NOTIFICATION_TIMEOUT, send).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                tracing::warn!(account_id = %account.id, error = %e, "reset email delivery failed");
                Err(AuthError::DeliveryFailure.into())
            }
            Err(_) => {
                tracing::warn!(account_id = %account.id, "reset email delivery timed out");
                Err(AuthError::DeliveryFailure.into())
            }
        }
    }

    /// Redeem a reset token and replace the account password.
    ///
    /// The token is consumed on success whether or not the caller later logs
    /// in; replaying the same token afterwards fails.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        validate_password(new_password)?;

        let Some(mut account) = self.store.find_by_email(email).await? else {
            return Err(AuthError::InvalidTokenOrEmail.into());
        };

        let status = validate_reset_token(
            account.reset_token_hash(),
            account.reset_token_expires_at(),
            token,
            Utc::now(),
        );
        if !status.is_valid() {
            return Err(AuthError::InvalidOrExpiredToken.into());
        }

        account.password_hash = self.hasher.hash(new_password)?;
        account.clear_pending_reset();
        self.store.update(&account).await?;

        tracing::info!(account_id = %account.id, "password reset completed");
        Ok(())
    }
}

fn reset_email_body(display_name: &str, token: &str) -> String {
    format!(
        "Hello {display_name},\n\n\
         You have requested a password reset. Please use the following token to reset your password:\n\n\
         {token}\n\n\
         This token is valid for 1 hour. If you did not request this, please ignore this email.\n\n\
         Thank you."
    )
}
