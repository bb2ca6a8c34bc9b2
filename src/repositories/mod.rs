//! Repository traits for data access layer
//!
//! This module defines the persistence interfaces the auth core consumes.
//! Storage backends implement these traits; the core never performs I/O of
//! its own.

pub mod account;

pub use account::CredentialStore;
