use adtech_core::TenantRecord;
use adtech_saga::{Checkpoint, CompensationDispatcher};
use async_trait::async_trait;
use tracing::debug;

use crate::OperationError;
use crate::operations::context::ProvisioningContext;
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

/// Undo records left by completed offboarding steps.
///
/// Each variant carries what is needed to restore the removed resource; the
/// metadata record is the one reconstructed from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffboardingCheckpoint {
    PolicyDetached {
        role_name: String,
    },
    RoleDeleted {
        account_id: String,
    },
    MetadataDeleted {
        record: TenantRecord,
    },
    AuthMappingDeleted {
        role_identifier: String,
        origin_url: String,
    },
}

impl Checkpoint for OffboardingCheckpoint {
    fn kind(&self) -> &'static str {
        match self {
            Self::PolicyDetached { .. } => "policy_detached",
            Self::RoleDeleted { .. } => "role_deleted",
            Self::MetadataDeleted { .. } => "metadata_deleted",
            Self::AuthMappingDeleted { .. } => "auth_mapping_deleted",
        }
    }

    fn compensation_description(&self) -> String {
        match self {
            Self::PolicyDetached { role_name } => {
                format!("re-attach policy to role '{role_name}'")
            }
            Self::RoleDeleted { account_id } => {
                format!("re-create role for account '{account_id}'")
            }
            Self::MetadataDeleted { record } => {
                format!("restore metadata for '{}'", record.role_identifier)
            }
            Self::AuthMappingDeleted {
                role_identifier,
                origin_url,
            } => format!("restore auth mapping '{role_identifier}' -> '{origin_url}'"),
        }
    }
}

#[async_trait]
impl<I, M, A> CompensationDispatcher<OffboardingCheckpoint> for ProvisioningContext<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Error = OperationError;

    async fn compensate(&self, checkpoint: OffboardingCheckpoint) -> Result<(), Self::Error> {
        debug!(kind = checkpoint.kind(), "compensating offboarding step");
        match checkpoint {
            OffboardingCheckpoint::PolicyDetached { role_name } => {
                self.identity().attach_policy(&role_name).await
            }
            OffboardingCheckpoint::RoleDeleted { account_id } => {
                let handle = self.identity().create_role(&account_id).await?;
                debug!(role = %handle.role_name, "re-created role");
                Ok(())
            }
            OffboardingCheckpoint::MetadataDeleted { record } => {
                self.metadata().put(&record).await
            }
            OffboardingCheckpoint::AuthMappingDeleted {
                role_identifier,
                origin_url,
            } => {
                self.auth_mapping()
                    .put(&role_identifier, &origin_url)
                    .await
            }
        }
    }
}
