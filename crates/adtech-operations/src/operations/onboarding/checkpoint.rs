use adtech_saga::{Checkpoint, CompensationDispatcher};
use async_trait::async_trait;
use tracing::debug;

use crate::OperationError;
use crate::operations::context::ProvisioningContext;
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

/// Undo records left by completed onboarding steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingCheckpoint {
    RoleCreated { role_name: String },
    PolicyAttached { role_name: String },
    MetadataWritten { role_identifier: String },
    AuthMappingWritten { role_identifier: String },
}

impl Checkpoint for OnboardingCheckpoint {
    fn kind(&self) -> &'static str {
        match self {
            Self::RoleCreated { .. } => "role_created",
            Self::PolicyAttached { .. } => "policy_attached",
            Self::MetadataWritten { .. } => "metadata_written",
            Self::AuthMappingWritten { .. } => "auth_mapping_written",
        }
    }

    fn compensation_description(&self) -> String {
        match self {
            Self::RoleCreated { role_name } => format!("delete role '{role_name}'"),
            Self::PolicyAttached { role_name } => {
                format!("detach policy from role '{role_name}'")
            }
            Self::MetadataWritten { role_identifier } => {
                format!("delete metadata for '{role_identifier}'")
            }
            Self::AuthMappingWritten { role_identifier } => {
                format!("delete auth mapping for '{role_identifier}'")
            }
        }
    }
}

#[async_trait]
impl<I, M, A> CompensationDispatcher<OnboardingCheckpoint> for ProvisioningContext<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Error = OperationError;

    async fn compensate(&self, checkpoint: OnboardingCheckpoint) -> Result<(), Self::Error> {
        debug!(kind = checkpoint.kind(), "compensating onboarding step");
        match checkpoint {
            OnboardingCheckpoint::RoleCreated { role_name } => {
                self.identity().delete_role(&role_name).await
            }
            OnboardingCheckpoint::PolicyAttached { role_name } => {
                self.identity().detach_policy(&role_name).await
            }
            OnboardingCheckpoint::MetadataWritten { role_identifier } => {
                self.metadata()
                    .delete_by_role_identifier(&role_identifier)
                    .await
            }
            OnboardingCheckpoint::AuthMappingWritten { role_identifier } => {
                self.auth_mapping()
                    .delete_by_role_identifier(&role_identifier)
                    .await
            }
        }
    }
}
