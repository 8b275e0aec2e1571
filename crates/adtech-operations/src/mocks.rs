use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use adtech_core::{RoleHandle, TenantRecord};
use async_trait::async_trait;

use crate::Result;
use crate::error::{OperationError, RoleCreationError, RoleCreationErrorKind};
use crate::handler::ProvisioningHandler;
use crate::operations::ProvisioningContext;
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

pub const MOCK_ROLE_NAME: &str = "my-role-name";
pub const MOCK_ROLE_IDENTIFIER: &str = "arn:aws:iam::123456789012:role/my-role-name";

/// Ordered log of calls made against every mock sharing it.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("lock poisoned").push(call.into());
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Calls recorded after the first `n`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls_after(&self, n: usize) -> Vec<String> {
        self.calls().into_iter().skip(n).collect()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().expect("lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn injected(store: &'static str, operation: &'static str) -> OperationError {
    OperationError::store(store, operation, format!("injected {operation} failure"))
}

pub struct MockIdentityProvider {
    journal: CallJournal,
    role: RoleHandle,
    create_failure: Option<RoleCreationError>,
    failing: HashSet<&'static str>,
    roles: Mutex<BTreeSet<String>>,
    attached: Mutex<BTreeSet<String>>,
}

impl MockIdentityProvider {
    #[must_use]
    pub fn new(journal: &CallJournal) -> Self {
        Self {
            journal: journal.clone(),
            role: RoleHandle {
                role_identifier: MOCK_ROLE_IDENTIFIER.to_string(),
                role_name: MOCK_ROLE_NAME.to_string(),
            },
            create_failure: None,
            failing: HashSet::new(),
            roles: Mutex::new(BTreeSet::new()),
            attached: Mutex::new(BTreeSet::new()),
        }
    }

    /// Seeds an existing role with its policy attached.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    #[must_use]
    pub fn with_existing_role(self, role_name: &str) -> Self {
        self.roles
            .lock()
            .expect("lock poisoned")
            .insert(role_name.to_string());
        self.attached
            .lock()
            .expect("lock poisoned")
            .insert(role_name.to_string());
        self
    }

    #[must_use]
    pub fn failing_create(mut self, kind: RoleCreationErrorKind, message: &str) -> Self {
        self.create_failure = Some(RoleCreationError::new(kind, "", message));
        self
    }

    /// Makes `operation` (`delete_role`, `attach_policy`, `detach_policy`) fail.
    #[must_use]
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn has_role(&self, role_name: &str) -> bool {
        self.roles.lock().expect("lock poisoned").contains(role_name)
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn has_policy(&self, role_name: &str) -> bool {
        self.attached
            .lock()
            .expect("lock poisoned")
            .contains(role_name)
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(operation) {
            return Err(injected("identity provider", operation));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityRoleProvider for MockIdentityProvider {
    async fn create_role(
        &self,
        account_id: &str,
    ) -> std::result::Result<RoleHandle, RoleCreationError> {
        self.journal.record(format!("create_role({account_id})"));
        if let Some(failure) = &self.create_failure {
            return Err(RoleCreationError::new(
                failure.kind,
                account_id,
                failure.message.clone(),
            ));
        }
        self.roles
            .lock()
            .expect("lock poisoned")
            .insert(self.role.role_name.clone());
        Ok(self.role.clone())
    }

    async fn delete_role(&self, role_name: &str) -> Result<()> {
        self.journal.record(format!("delete_role({role_name})"));
        self.check("delete_role")?;
        if self.has_policy(role_name) {
            return Err(OperationError::store(
                "identity provider",
                "delete_role",
                "Cannot delete entity, must detach all policies first.",
            ));
        }
        if !self.roles.lock().expect("lock poisoned").remove(role_name) {
            return Err(OperationError::RoleNotFound(role_name.to_string()));
        }
        Ok(())
    }

    async fn attach_policy(&self, role_name: &str) -> Result<()> {
        self.journal.record(format!("attach_policy({role_name})"));
        self.check("attach_policy")?;
        self.attached
            .lock()
            .expect("lock poisoned")
            .insert(role_name.to_string());
        Ok(())
    }

    async fn detach_policy(&self, role_name: &str) -> Result<()> {
        self.journal.record(format!("detach_policy({role_name})"));
        self.check("detach_policy")?;
        self.attached
            .lock()
            .expect("lock poisoned")
            .remove(role_name);
        Ok(())
    }
}

pub struct MockMetadataStore {
    journal: CallJournal,
    failing: HashSet<&'static str>,
    records: Mutex<BTreeMap<String, TenantRecord>>,
}

impl MockMetadataStore {
    #[must_use]
    pub fn new(journal: &CallJournal) -> Self {
        Self {
            journal: journal.clone(),
            failing: HashSet::new(),
            records: Mutex::new(BTreeMap::new()),
        }
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_record(self, record: TenantRecord) -> Self {
        self.records
            .lock()
            .expect("lock poisoned")
            .insert(record.role_identifier.clone(), record);
        self
    }

    /// Makes `operation` (`put`, `delete`, `get`, `scan`) fail.
    #[must_use]
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn records(&self) -> Vec<TenantRecord> {
        self.records
            .lock()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(operation) {
            return Err(injected("metadata store", operation));
        }
        Ok(())
    }
}

#[async_trait]
impl TenantMetadataStore for MockMetadataStore {
    async fn put(&self, record: &TenantRecord) -> Result<()> {
        self.journal
            .record(format!("metadata.put({})", record.role_identifier));
        self.check("put")?;
        self.records
            .lock()
            .expect("lock poisoned")
            .insert(record.role_identifier.clone(), record.clone());
        Ok(())
    }

    async fn delete_by_role_identifier(&self, role_identifier: &str) -> Result<()> {
        self.journal
            .record(format!("metadata.delete({role_identifier})"));
        self.check("delete")?;
        self.records
            .lock()
            .expect("lock poisoned")
            .remove(role_identifier);
        Ok(())
    }

    async fn get_by_role_identifier(&self, role_identifier: &str) -> Result<Option<TenantRecord>> {
        self.journal.record(format!("metadata.get({role_identifier})"));
        self.check("get")?;
        Ok(self
            .records
            .lock()
            .expect("lock poisoned")
            .get(role_identifier)
            .cloned())
    }

    async fn scan_all(&self) -> Result<Vec<TenantRecord>> {
        self.journal.record("metadata.scan()");
        self.check("scan")?;
        Ok(self.records())
    }
}

pub struct MockAuthMappingStore {
    journal: CallJournal,
    failing: HashSet<&'static str>,
    origins: Mutex<BTreeMap<String, String>>,
}

impl MockAuthMappingStore {
    #[must_use]
    pub fn new(journal: &CallJournal) -> Self {
        Self {
            journal: journal.clone(),
            failing: HashSet::new(),
            origins: Mutex::new(BTreeMap::new()),
        }
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_mapping(self, role_identifier: &str, origin_url: &str) -> Self {
        self.origins
            .lock()
            .expect("lock poisoned")
            .insert(role_identifier.to_string(), origin_url.to_string());
        self
    }

    /// Makes `operation` (`put`, `delete`) fail.
    #[must_use]
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn origin_for(&self, role_identifier: &str) -> Option<String> {
        self.origins
            .lock()
            .expect("lock poisoned")
            .get(role_identifier)
            .cloned()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.origins.lock().expect("lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(operation) {
            return Err(injected("auth-mapping store", operation));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthMappingStore for MockAuthMappingStore {
    async fn put(&self, role_identifier: &str, origin_url: &str) -> Result<()> {
        self.journal
            .record(format!("auth_mapping.put({role_identifier}, {origin_url})"));
        self.check("put")?;
        self.origins
            .lock()
            .expect("lock poisoned")
            .insert(role_identifier.to_string(), origin_url.to_string());
        Ok(())
    }

    async fn delete_by_role_identifier(&self, role_identifier: &str) -> Result<()> {
        self.journal
            .record(format!("auth_mapping.delete({role_identifier})"));
        self.check("delete")?;
        self.origins
            .lock()
            .expect("lock poisoned")
            .remove(role_identifier);
        Ok(())
    }
}

/// The three mocks wired to one journal.
pub struct MockStores {
    pub journal: CallJournal,
    pub identity: Arc<MockIdentityProvider>,
    pub metadata: Arc<MockMetadataStore>,
    pub auth_mapping: Arc<MockAuthMappingStore>,
}

impl MockStores {
    /// Fresh mocks with default behavior and empty state.
    #[must_use]
    pub fn new() -> Self {
        let journal = CallJournal::new();
        let identity = MockIdentityProvider::new(&journal);
        let metadata = MockMetadataStore::new(&journal);
        let auth_mapping = MockAuthMappingStore::new(&journal);
        Self::from_parts(journal, identity, metadata, auth_mapping)
    }

    #[must_use]
    pub fn from_parts(
        journal: CallJournal,
        identity: MockIdentityProvider,
        metadata: MockMetadataStore,
        auth_mapping: MockAuthMappingStore,
    ) -> Self {
        Self {
            journal,
            identity: Arc::new(identity),
            metadata: Arc::new(metadata),
            auth_mapping: Arc::new(auth_mapping),
        }
    }

    #[must_use]
    pub fn context(
        &self,
    ) -> ProvisioningContext<MockIdentityProvider, MockMetadataStore, MockAuthMappingStore> {
        ProvisioningContext::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.metadata),
            Arc::clone(&self.auth_mapping),
        )
    }

    #[must_use]
    pub fn handler(
        &self,
    ) -> ProvisioningHandler<MockIdentityProvider, MockMetadataStore, MockAuthMappingStore> {
        ProvisioningHandler::new(self.context())
    }
}

impl Default for MockStores {
    fn default() -> Self {
        Self::new()
    }
}

/// An already onboarded tenant matching the default mock role.
#[must_use]
pub fn onboarded_record() -> TenantRecord {
    TenantRecord {
        origin_url: "https://example.com".to_string(),
        adtech_id: "123456".to_string(),
        aws_id: "1234567890".to_string(),
        role_identifier: MOCK_ROLE_IDENTIFIER.to_string(),
        role_name: MOCK_ROLE_NAME.to_string(),
    }
}
