use std::marker::PhantomData;

use adtech_core::{OnboardingRequest, TenantRecord};
use adtech_saga::SagaStep;
use async_trait::async_trait;
use tracing::debug;

use super::checkpoint::OnboardingCheckpoint;
use crate::OperationError;
use crate::operations::context::ProvisioningContext;
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

pub struct CreateRoleStep<I, M, A> {
    _marker: PhantomData<(I, M, A)>,
}

impl<I, M, A> CreateRoleStep<I, M, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<I, M, A> Default for CreateRoleStep<I, M, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, M, A> SagaStep for CreateRoleStep<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Input = OnboardingRequest;
    type Output = TenantRecord;
    type Context = ProvisioningContext<I, M, A>;
    type Checkpoint = OnboardingCheckpoint;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "create_role"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        let role = ctx.identity().create_role(&input.aws_id).await?;
        debug!(
            role = %role.role_name,
            role_identifier = %role.role_identifier,
            "created role"
        );
        Ok(input.into_record(role))
    }

    fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
        Some(OnboardingCheckpoint::RoleCreated {
            role_name: output.role_name.clone(),
        })
    }
}

pub struct AttachPolicyStep<I, M, A> {
    _marker: PhantomData<(I, M, A)>,
}

impl<I, M, A> AttachPolicyStep<I, M, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<I, M, A> Default for AttachPolicyStep<I, M, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, M, A> SagaStep for AttachPolicyStep<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Input = TenantRecord;
    type Output = TenantRecord;
    type Context = ProvisioningContext<I, M, A>;
    type Checkpoint = OnboardingCheckpoint;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "attach_policy"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        ctx.identity().attach_policy(&input.role_name).await?;
        debug!(role = %input.role_name, "attached policy");
        Ok(input)
    }

    fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
        Some(OnboardingCheckpoint::PolicyAttached {
            role_name: output.role_name.clone(),
        })
    }
}

pub struct WriteMetadataStep<I, M, A> {
    _marker: PhantomData<(I, M, A)>,
}

impl<I, M, A> WriteMetadataStep<I, M, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<I, M, A> Default for WriteMetadataStep<I, M, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, M, A> SagaStep for WriteMetadataStep<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Input = TenantRecord;
    type Output = TenantRecord;
    type Context = ProvisioningContext<I, M, A>;
    type Checkpoint = OnboardingCheckpoint;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "write_metadata"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        ctx.metadata().put(&input).await?;
        debug!(role_identifier = %input.role_identifier, "wrote tenant metadata");
        Ok(input)
    }

    fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
        Some(OnboardingCheckpoint::MetadataWritten {
            role_identifier: output.role_identifier.clone(),
        })
    }
}

pub struct WriteAuthMappingStep<I, M, A> {
    _marker: PhantomData<(I, M, A)>,
}

impl<I, M, A> WriteAuthMappingStep<I, M, A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<I, M, A> Default for WriteAuthMappingStep<I, M, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I, M, A> SagaStep for WriteAuthMappingStep<I, M, A>
where
    I: IdentityRoleProvider,
    M: TenantMetadataStore,
    A: AuthMappingStore,
{
    type Input = TenantRecord;
    type Output = TenantRecord;
    type Context = ProvisioningContext<I, M, A>;
    type Checkpoint = OnboardingCheckpoint;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "write_auth_mapping"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        ctx.auth_mapping()
            .put(&input.role_identifier, &input.origin_url)
            .await?;
        debug!(
            role_identifier = %input.role_identifier,
            origin = %input.origin_url,
            "wrote auth mapping"
        );
        Ok(input)
    }

    fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
        Some(OnboardingCheckpoint::AuthMappingWritten {
            role_identifier: output.role_identifier.clone(),
        })
    }
}
