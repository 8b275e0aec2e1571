use async_trait::async_trait;

use crate::Result;

/// Authorization mapping from a role identifier to the origin it may claim.
#[async_trait]
pub trait AuthMappingStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    async fn put(&self, role_identifier: &str, origin_url: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the store rejects the delete.
    async fn delete_by_role_identifier(&self, role_identifier: &str) -> Result<()>;
}
