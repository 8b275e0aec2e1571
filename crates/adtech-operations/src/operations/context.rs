use std::sync::Arc;

use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

/// Store clients shared by every step of a provisioning workflow.
///
/// The context also acts as the compensation dispatcher for both workflows,
/// so reversing a checkpoint always goes through the same injected clients
/// that performed the forward action.
pub struct ProvisioningContext<I, M, A> {
    identity: Arc<I>,
    metadata: Arc<M>,
    auth_mapping: Arc<A>,
}

impl<I, M, A> Clone for ProvisioningContext<I, M, A> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            metadata: Arc::clone(&self.metadata),
            auth_mapping: Arc::clone(&self.auth_mapping),
        }
    }
}

impl<I, M, A> ProvisioningContext<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    #[must_use]
    pub fn new(identity: Arc<I>, metadata: Arc<M>, auth_mapping: Arc<A>) -> Self {
        Self {
            identity,
            metadata,
            auth_mapping,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &I {
        &self.identity
    }

    #[must_use]
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    #[must_use]
    pub fn auth_mapping(&self) -> &A {
        &self.auth_mapping
    }

    /// Shared handle to the metadata store, for read-only operations.
    #[must_use]
    pub fn metadata_handle(&self) -> Arc<M> {
        Arc::clone(&self.metadata)
    }
}
