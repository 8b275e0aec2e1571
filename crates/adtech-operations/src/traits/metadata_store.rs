use adtech_core::TenantRecord;
use async_trait::async_trait;

use crate::Result;

/// Tenant-metadata store keyed by role identifier.
#[async_trait]
pub trait TenantMetadataStore: Send + Sync {
    /// Blind overwrite of the record stored under its role identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    async fn put(&self, record: &TenantRecord) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the store rejects the delete.
    async fn delete_by_role_identifier(&self, role_identifier: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the store cannot be read. A missing record is `Ok(None)`.
    async fn get_by_role_identifier(&self, role_identifier: &str) -> Result<Option<TenantRecord>>;

    /// # Errors
    ///
    /// Returns an error if the store cannot be scanned.
    async fn scan_all(&self) -> Result<Vec<TenantRecord>>;
}
