use std::sync::{Mutex, MutexGuard};

use adtech_core::{ProvisioningConfig, RoleHandle, TenantRecord};
use async_trait::async_trait;
use tracing::debug;

use super::state::{
    AUTH_MAPPING_STORE, AuthMappingTable, IDENTITY_PROVIDER, METADATA_STORE, RoleTable,
    TenantTable,
};
use crate::Result;
use crate::error::{OperationError, RoleCreationError, RoleCreationErrorKind};
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &'static str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| OperationError::LockPoisoned(store))
}

/// Role provider holding roles in process memory.
pub struct InMemoryIdentityProvider {
    config: ProvisioningConfig,
    roles: Mutex<RoleTable>,
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new(config: ProvisioningConfig) -> Self {
        Self {
            config,
            roles: Mutex::new(RoleTable::default()),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the role table lock is poisoned.
    pub fn has_role(&self, role_name: &str) -> Result<bool> {
        Ok(lock(&self.roles, IDENTITY_PROVIDER)?.get(role_name).is_some())
    }

    /// Policies attached to `role_name`, or `None` if the role does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the role table lock is poisoned.
    pub fn attached_policies(&self, role_name: &str) -> Result<Option<Vec<String>>> {
        Ok(lock(&self.roles, IDENTITY_PROVIDER)?
            .get(role_name)
            .map(|entry| entry.attached_policies.iter().cloned().collect()))
    }

    /// # Errors
    ///
    /// Returns an error if the role table lock is poisoned.
    pub fn role_names(&self) -> Result<Vec<String>> {
        Ok(lock(&self.roles, IDENTITY_PROVIDER)?.names())
    }
}

#[async_trait]
impl IdentityRoleProvider for InMemoryIdentityProvider {
    async fn create_role(
        &self,
        account_id: &str,
    ) -> std::result::Result<RoleHandle, RoleCreationError> {
        let mut roles = self.roles.lock().map_err(|_| {
            RoleCreationError::new(
                RoleCreationErrorKind::Other,
                account_id,
                OperationError::LockPoisoned(IDENTITY_PROVIDER).to_string(),
            )
        })?;
        let handle = roles.create(&self.config, account_id)?;
        debug!(role = %handle.role_name, "created role");
        Ok(handle)
    }

    async fn delete_role(&self, role_name: &str) -> Result<()> {
        lock(&self.roles, IDENTITY_PROVIDER)?.delete(role_name)?;
        debug!(role = %role_name, "deleted role");
        Ok(())
    }

    async fn attach_policy(&self, role_name: &str) -> Result<()> {
        lock(&self.roles, IDENTITY_PROVIDER)?.attach(role_name, self.config.policy_arn())
    }

    async fn detach_policy(&self, role_name: &str) -> Result<()> {
        lock(&self.roles, IDENTITY_PROVIDER)?.detach(role_name, self.config.policy_arn())
    }
}

#[derive(Default)]
pub struct InMemoryMetadataStore {
    records: Mutex<TenantTable>,
}

impl InMemoryMetadataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns an error if the table lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.records, METADATA_STORE)?.all().len())
    }

    /// # Errors
    ///
    /// Returns an error if the table lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl TenantMetadataStore for InMemoryMetadataStore {
    async fn put(&self, record: &TenantRecord) -> Result<()> {
        lock(&self.records, METADATA_STORE)?.put(record);
        Ok(())
    }

    async fn delete_by_role_identifier(&self, role_identifier: &str) -> Result<()> {
        lock(&self.records, METADATA_STORE)?.delete(role_identifier);
        Ok(())
    }

    async fn get_by_role_identifier(&self, role_identifier: &str) -> Result<Option<TenantRecord>> {
        Ok(lock(&self.records, METADATA_STORE)?.get(role_identifier))
    }

    async fn scan_all(&self) -> Result<Vec<TenantRecord>> {
        Ok(lock(&self.records, METADATA_STORE)?.all())
    }
}

#[derive(Default)]
pub struct InMemoryAuthMappingStore {
    origins: Mutex<AuthMappingTable>,
}

impl InMemoryAuthMappingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns an error if the table lock is poisoned.
    pub fn origin_for(&self, role_identifier: &str) -> Result<Option<String>> {
        Ok(lock(&self.origins, AUTH_MAPPING_STORE)?.get(role_identifier))
    }

    /// # Errors
    ///
    /// Returns an error if the table lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.origins, AUTH_MAPPING_STORE)?.len())
    }

    /// # Errors
    ///
    /// Returns an error if the table lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl AuthMappingStore for InMemoryAuthMappingStore {
    async fn put(&self, role_identifier: &str, origin_url: &str) -> Result<()> {
        lock(&self.origins, AUTH_MAPPING_STORE)?.put(role_identifier, origin_url);
        Ok(())
    }

    async fn delete_by_role_identifier(&self, role_identifier: &str) -> Result<()> {
        lock(&self.origins, AUTH_MAPPING_STORE)?.delete(role_identifier);
        Ok(())
    }
}
