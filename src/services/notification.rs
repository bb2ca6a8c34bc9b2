use crate::Error;
use async_trait::async_trait;

/// Outbound message delivery capability (email).
///
/// The core only calls this interface, it never implements delivery.
/// Implementations should expect to be raced against a timeout; a send that
/// outlives the caller's bound is dropped.
#[async_trait]
pub trait NotificationGateway: Send + Sync + 'static {
    /// Deliver a message to the given address.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), Error>;
}
