//! Service layer for business logic
//!
//! This module contains the auth orchestration service and the capability
//! traits it consumes.

pub mod auth;
pub mod hasher;
pub mod notification;

pub use auth::{AuthService, Registration};
pub use hasher::{Argon2PasswordHasher, PasswordHasher};
pub use notification::NotificationGateway;
