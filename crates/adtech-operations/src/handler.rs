//! Request entry points translating JSON bodies into response envelopes.

use adtech_core::{
    ApiResponse, OffboardingRequest, OnboardingRequest, ReadRequest, Result as CoreResult,
};
use tracing::error;

use crate::error::OperationError;
use crate::operations::{
    OffboardingOperation, OnboardingOperation, ProvisioningContext, ReadOperation, ReadOutcome,
};
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

/// Serves onboarding, offboarding and read requests against one set of stores.
///
/// Every entry point returns an envelope; failures are reported as status
/// 500 with a message, never as an `Err`.
pub struct ProvisioningHandler<I, M, A> {
    onboarding: OnboardingOperation<I, M, A>,
    offboarding: OffboardingOperation<I, M, A>,
    read: ReadOperation<M>,
}

impl<I, M, A> ProvisioningHandler<I, M, A>
where
    I: IdentityRoleProvider + 'static,
    M: TenantMetadataStore + 'static,
    A: AuthMappingStore + 'static,
{
    #[must_use]
    pub fn new(context: ProvisioningContext<I, M, A>) -> Self {
        Self {
            read: ReadOperation::new(context.metadata_handle()),
            onboarding: OnboardingOperation::new(context.clone()),
            offboarding: OffboardingOperation::new(context),
        }
    }

    pub async fn onboard(&self, body: &str) -> ApiResponse {
        let result = match OnboardingRequest::from_json(body) {
            Ok(request) => self.onboarding.execute(request).await,
            Err(e) => Err(e.into()),
        };
        let response = match result {
            Ok(record) => ApiResponse::success(format!(
                "Adtech {} onboarded successfully",
                record.adtech_id
            )),
            Err(e) => ApiResponse::failure(failure_message(&e)),
        };
        finish(response)
    }

    pub async fn offboard(&self, body: &str) -> ApiResponse {
        let result = match OffboardingRequest::from_json(body) {
            Ok(request) => self.offboarding.execute(request).await,
            Err(e) => Err(e.into()),
        };
        let response = match result {
            Ok(record) => ApiResponse::success(format!(
                "Adtech {} offboarded successfully",
                record.adtech_id
            )),
            Err(e) => ApiResponse::failure(failure_message(&e)),
        };
        finish(response)
    }

    /// Reads one tenant when the body names a role identifier, all otherwise.
    ///
    /// A failed read of all tenants uses the bare `{statusCode, message}`
    /// envelope.
    pub async fn read(&self, body: &str) -> ApiResponse {
        let request = match ReadRequest::from_json(body) {
            Ok(request) => request,
            Err(e) => return finish(ApiResponse::failure(OperationError::from(e).user_message())),
        };
        let reads_all = request.role_identifier().is_none();

        match self.read.execute(&request).await {
            Ok(ReadOutcome::One(record)) => finish(ApiResponse::record(&record)),
            Ok(ReadOutcome::All(records)) => finish(ApiResponse::records(&records)),
            Err(e) if reads_all => ApiResponse::bare_failure(e.user_message()),
            Err(e) => finish(ApiResponse::failure(e.user_message())),
        }
    }
}

fn failure_message(err: &OperationError) -> String {
    let message = err.user_message();
    match err.compensation_failures().len() {
        0 => message,
        n => format!("{message} Rollback incomplete: {n} compensation(s) failed."),
    }
}

fn finish(response: CoreResult<ApiResponse>) -> ApiResponse {
    response.unwrap_or_else(|e| {
        error!(error = %e, "failed to encode response");
        ApiResponse::bare_failure(e.to_string())
    })
}
