use std::marker::PhantomData;

use adtech_core::TenantRecord;
use adtech_saga::SagaStep;
use async_trait::async_trait;
use tracing::debug;

use super::checkpoint::OffboardingCheckpoint;
use crate::OperationError;
use crate::operations::context::ProvisioningContext;
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

pub struct DetachPolicyStep<I, M, A> {
    _marker: PhantomData<(I, M, A)>,
}

impl<I, M, A> DetachPolicyStep<I, M, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<I, M, A> Default for DetachPolicyStep<I, M, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, M, A> SagaStep for DetachPolicyStep<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Input = TenantRecord;
    type Output = TenantRecord;
    type Context = ProvisioningContext<I, M, A>;
    type Checkpoint = OffboardingCheckpoint;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "detach_policy"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        ctx.identity().detach_policy(&input.role_name).await?;
        debug!(role = %input.role_name, "detached policy");
        Ok(input)
    }

    fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
        Some(OffboardingCheckpoint::PolicyDetached {
            role_name: output.role_name.clone(),
        })
    }
}

pub struct DeleteRoleStep<I, M, A> {
    _marker: PhantomData<(I, M, A)>,
}

impl<I, M, A> DeleteRoleStep<I, M, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<I, M, A> Default for DeleteRoleStep<I, M, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, M, A> SagaStep for DeleteRoleStep<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Input = TenantRecord;
    type Output = TenantRecord;
    type Context = ProvisioningContext<I, M, A>;
    type Checkpoint = OffboardingCheckpoint;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "delete_role"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        ctx.identity().delete_role(&input.role_name).await?;
        debug!(role = %input.role_name, "deleted role");
        Ok(input)
    }

    fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
        Some(OffboardingCheckpoint::RoleDeleted {
            account_id: output.aws_id.clone(),
        })
    }
}

pub struct DeleteMetadataStep<I, M, A> {
    _marker: PhantomData<(I, M, A)>,
}

impl<I, M, A> DeleteMetadataStep<I, M, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<I, M, A> Default for DeleteMetadataStep<I, M, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, M, A> SagaStep for DeleteMetadataStep<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Input = TenantRecord;
    type Output = TenantRecord;
    type Context = ProvisioningContext<I, M, A>;
    type Checkpoint = OffboardingCheckpoint;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "delete_metadata"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        ctx.metadata()
            .delete_by_role_identifier(&input.role_identifier)
            .await?;
        debug!(role_identifier = %input.role_identifier, "deleted tenant metadata");
        Ok(input)
    }

    fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
        Some(OffboardingCheckpoint::MetadataDeleted {
            record: output.clone(),
        })
    }
}

pub struct DeleteAuthMappingStep<I, M, A> {
    _marker: PhantomData<(I, M, A)>,
}

impl<I, M, A> DeleteAuthMappingStep<I, M, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<I, M, A> Default for DeleteAuthMappingStep<I, M, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, M, A> SagaStep for DeleteAuthMappingStep<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Input = TenantRecord;
    type Output = TenantRecord;
    type Context = ProvisioningContext<I, M, A>;
    type Checkpoint = OffboardingCheckpoint;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "delete_auth_mapping"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        ctx.auth_mapping()
            .delete_by_role_identifier(&input.role_identifier)
            .await?;
        debug!(role_identifier = %input.role_identifier, "deleted auth mapping");
        Ok(input)
    }

    fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
        Some(OffboardingCheckpoint::AuthMappingDeleted {
            role_identifier: output.role_identifier.clone(),
            origin_url: output.origin_url.clone(),
        })
    }
}
