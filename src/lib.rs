//! Credential and session lifecycle core for the Somon marketplace backend
//!
//! This crate owns the security-sensitive slice of the marketplace: account
//! registration, password login, a time-boxed single-use password-reset flow
//! and signed session-token (JWT) issuance. HTTP routing, the catalogue CRUD
//! services, caching, schema management and the concrete mail transport are
//! external collaborators and live elsewhere.
//!
//! The entry point is [`AuthService`], which takes its collaborators - a
//! [`CredentialStore`], a [`PasswordHasher`], a [`NotificationGateway`] and
//! signing material ([`JwtConfig`]) - as explicit constructor parameters.
//!
//! Two invariants run through the whole design:
//!
//! - **Anti-enumeration**: responses never let a caller distinguish "account
//!   exists" from "account does not exist". Unknown email and wrong password
//!   fail identically on login; a reset request reports the same generic
//!   outcome either way.
//! - **Single-use reset tokens**: at most one pending token per account,
//!   consumed on successful redemption, lazily expired at validation time.

pub mod account;
pub mod error;
pub mod id;
pub mod repositories;
pub mod services;
pub mod session;
pub mod token;
pub mod validation;

pub use account::{Account, AccountId, Role};
pub use error::{AuthError, Error};
pub use repositories::CredentialStore;
pub use services::{
    Argon2PasswordHasher, AuthService, NotificationGateway, PasswordHasher, Registration,
};
pub use session::{JwtClaims, JwtConfig, SessionToken};
