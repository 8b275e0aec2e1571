use adtech_core::{OnboardingRequest, TenantRecord};
use adtech_saga::{Saga, SagaAuditLog, SagaBuilder};
use tracing::{info, warn};

use super::checkpoint::OnboardingCheckpoint;
use super::steps::{AttachPolicyStep, CreateRoleStep, WriteAuthMappingStep, WriteMetadataStep};
use crate::Result;
use crate::error::OperationError;
use crate::operations::context::ProvisioningContext;
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

type OnboardingSaga<I, M, A> = Saga<
    OnboardingRequest,
    TenantRecord,
    ProvisioningContext<I, M, A>,
    OnboardingCheckpoint,
    OperationError,
>;

/// Provisions a new Adtech: role, policy, metadata record and auth mapping.
///
/// A failure at any step reverses the steps already completed, newest first.
pub struct OnboardingOperation<I, M, A> {
    context: ProvisioningContext<I, M, A>,
    saga: OnboardingSaga<I, M, A>,
}

impl<I, M, A> OnboardingOperation<I, M, A>
where
    I: IdentityRoleProvider + 'static,
    M: TenantMetadataStore + 'static,
    A: AuthMappingStore + 'static,
{
    #[must_use]
    pub fn new(context: ProvisioningContext<I, M, A>) -> Self {
        let saga = SagaBuilder::new()
            .first_step(CreateRoleStep::new())
            .then(AttachPolicyStep::new())
            .then(WriteMetadataStep::new())
            .then(WriteAuthMappingStep::new())
            .build();
        Self { context, saga }
    }

    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.saga.step_names()
    }

    /// # Errors
    ///
    /// Returns `OperationError::Core` if the request is incomplete, or a saga
    /// error naming the failed step once every completed step was reversed.
    pub async fn execute(&self, request: OnboardingRequest) -> Result<TenantRecord> {
        self.execute_with_audit(request).await.0
    }

    /// Runs the workflow and returns its audit log alongside the outcome.
    ///
    /// A request rejected by validation yields an empty log still `Pending`.
    pub async fn execute_with_audit(
        &self,
        request: OnboardingRequest,
    ) -> (Result<TenantRecord>, SagaAuditLog) {
        if let Err(e) = request.validate() {
            return (Err(e.into()), SagaAuditLog::new());
        }

        info!(
            adtech_id = %request.adtech_id,
            aws_id = %request.aws_id,
            "onboarding adtech"
        );
        let (result, audit_log) = self.saga.execute_with_audit(&self.context, request).await;
        let result = result.map_err(OperationError::from);

        match &result {
            Ok(record) => info!(
                adtech_id = %record.adtech_id,
                role_identifier = %record.role_identifier,
                "adtech onboarded"
            ),
            Err(e) => warn!(error = %e, "onboarding failed"),
        }
        (result, audit_log)
    }
}
