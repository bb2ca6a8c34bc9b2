use crate::{Account, Error};
use async_trait::async_trait;

/// Persistence capability over account records.
///
/// All mutations are single-record, single-statement commits; the core
/// requires no multi-record transactions. The store is the sole arbiter of
/// last-write-wins semantics per account row: two concurrent updates to the
/// same account race, and the later commit wins.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Find an account by email, compared case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error>;

    /// Insert a new account. Fails if an account with the same email
    /// (case-insensitive) already exists.
    async fn insert(&self, account: Account) -> Result<Account, Error>;

    /// Commit the current state of an existing account.
    async fn update(&self, account: &Account) -> Result<(), Error>;
}
