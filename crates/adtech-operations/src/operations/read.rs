use std::sync::Arc;

use adtech_core::{ReadRequest, TenantRecord};
use tracing::debug;

use crate::Result;
use crate::error::OperationError;
use crate::traits::TenantMetadataStore;

/// What a read request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    One(TenantRecord),
    All(Vec<TenantRecord>),
}

/// Read-only lookups against the tenant-metadata store.
pub struct ReadOperation<M> {
    metadata: Arc<M>,
}

impl<M> ReadOperation<M>
where
    M: TenantMetadataStore,
{
    #[must_use]
    pub fn new(metadata: Arc<M>) -> Self {
        Self { metadata }
    }

    /// # Errors
    ///
    /// Returns `OperationError::TenantNotFound` if no record is stored under
    /// the identifier, or the store error if the lookup fails.
    pub async fn read_one(&self, role_identifier: &str) -> Result<TenantRecord> {
        debug!(role_identifier = %role_identifier, "reading tenant");
        self.metadata
            .get_by_role_identifier(role_identifier)
            .await?
            .ok_or_else(|| OperationError::TenantNotFound(role_identifier.to_string()))
    }

    /// # Errors
    ///
    /// Returns the store error if the scan fails.
    pub async fn read_all(&self) -> Result<Vec<TenantRecord>> {
        let records = self.metadata.scan_all().await?;
        debug!(count = records.len(), "scanned tenants");
        Ok(records)
    }

    /// Resolves the request to a single lookup or a full scan.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever lookup ran.
    pub async fn execute(&self, request: &ReadRequest) -> Result<ReadOutcome> {
        match request.role_identifier() {
            Some(id) => self.read_one(id).await.map(ReadOutcome::One),
            None => self.read_all().await.map(ReadOutcome::All),
        }
    }
}
