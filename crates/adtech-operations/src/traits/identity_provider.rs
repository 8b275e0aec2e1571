use adtech_core::RoleHandle;
use async_trait::async_trait;

use crate::Result;
use crate::error::RoleCreationError;

/// Identity/role provider holding one role per onboarded cloud account.
///
/// Every call either fully applies or leaves no side effect.
#[async_trait]
pub trait IdentityRoleProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns a `RoleCreationError` classified as malformed policy,
    /// duplicate name, or other.
    async fn create_role(
        &self,
        account_id: &str,
    ) -> std::result::Result<RoleHandle, RoleCreationError>;

    /// # Errors
    ///
    /// Returns an error if the role does not exist or still has policies attached.
    async fn delete_role(&self, role_name: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the role does not exist or the policy cannot be attached.
    async fn attach_policy(&self, role_name: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the role does not exist or the policy is not attached.
    async fn detach_policy(&self, role_name: &str) -> Result<()>;
}
