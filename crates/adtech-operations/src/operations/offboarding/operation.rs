use adtech_core::{OffboardingRequest, TenantRecord};
use adtech_saga::{Saga, SagaAuditLog, SagaBuilder};
use tracing::{info, warn};

use super::checkpoint::OffboardingCheckpoint;
use super::steps::{DeleteAuthMappingStep, DeleteMetadataStep, DeleteRoleStep, DetachPolicyStep};
use crate::Result;
use crate::error::OperationError;
use crate::operations::context::ProvisioningContext;
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

type OffboardingSaga<I, M, A> = Saga<
    TenantRecord,
    TenantRecord,
    ProvisioningContext<I, M, A>,
    OffboardingCheckpoint,
    OperationError,
>;

/// Removes an onboarded Adtech.
///
/// The caller supplies the full tenant record: role and policy calls use
/// the role name, store deletes use the role identifier. Removed resources
/// are restored from the request if a later step fails.
pub struct OffboardingOperation<I, M, A> {
    context: ProvisioningContext<I, M, A>,
    saga: OffboardingSaga<I, M, A>,
}

impl<I, M, A> OffboardingOperation<I, M, A>
where
    I: IdentityRoleProvider + 'static,
    M: TenantMetadataStore + 'static,
    A: AuthMappingStore + 'static,
{
    #[must_use]
    pub fn new(context: ProvisioningContext<I, M, A>) -> Self {
        let saga = SagaBuilder::new()
            .first_step(DetachPolicyStep::new())
            .then(DeleteRoleStep::new())
            .then(DeleteMetadataStep::new())
            .then(DeleteAuthMappingStep::new())
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
    pub async fn execute(&self, request: OffboardingRequest) -> Result<TenantRecord> {
        self.execute_with_audit(request).await.0
    }

    /// Runs the workflow and returns its audit log alongside the outcome.
    ///
    /// A request rejected by validation yields an empty log still `Pending`.
    pub async fn execute_with_audit(
        &self,
        request: OffboardingRequest,
    ) -> (Result<TenantRecord>, SagaAuditLog) {
        if let Err(e) = request.validate() {
            return (Err(e.into()), SagaAuditLog::new());
        }

        let record = request.into_record();
        info!(
            adtech_id = %record.adtech_id,
            role_identifier = %record.role_identifier,
            "offboarding adtech"
        );
        let (result, audit_log) = self.saga.execute_with_audit(&self.context, record).await;
        let result = result.map_err(OperationError::from);

        match &result {
            Ok(record) => info!(
                adtech_id = %record.adtech_id,
                role_identifier = %record.role_identifier,
                "adtech offboarded"
            ),
            Err(e) => warn!(error = %e, "offboarding failed"),
        }
        (result, audit_log)
    }
}
