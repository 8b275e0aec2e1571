use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use adtech_core::{ProvisioningConfig, RoleHandle, TenantRecord};
use async_trait::async_trait;
use fd_lock::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use super::state::{AuthMappingTable, RoleTable, TenantTable};
use crate::Result;
use crate::error::{OperationError, RoleCreationError, RoleCreationErrorKind};
use crate::traits::{AuthMappingStore, IdentityRoleProvider, TenantMetadataStore};

const ROLES_FILENAME: &str = "roles.json";
const TENANTS_FILENAME: &str = "tenants.json";
const AUTH_MAPPINGS_FILENAME: &str = "auth-mappings.json";

/// A JSON file holding one table.
///
/// Updates hold an exclusive advisory lock on a sibling `.lock` file from
/// load to store, so every process sharing the state directory sees each
/// read-modify-write whole. Stores replace the file with a complete temp
/// file, so reads take no lock.
struct JsonDocument<T> {
    path: PathBuf,
    lock_path: PathBuf,
    _table: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    fn new(path: PathBuf) -> Self {
        let lock_path = path.with_extension("json.lock");
        Self {
            path,
            lock_path,
            _table: PhantomData,
        }
    }

    fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    fn read(&self) -> Result<T> {
        self.load()
    }

    fn update<R>(&self, apply: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let lock_err = |source: std::io::Error| OperationError::StateLock {
            path: self.lock_path.clone(),
            source,
        };

        fs::create_dir_all(self.directory()).map_err(lock_err)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(lock_err)?;
        let mut lock = RwLock::new(file);
        let _held = lock.write().map_err(lock_err)?;

        let mut table = self.load()?;
        let outcome = apply(&mut table)?;
        self.store(&table)?;
        Ok(outcome)
    }

    fn load(&self) -> Result<T> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => {
                return Err(OperationError::StateRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| OperationError::StateParse {
            path: self.path.clone(),
            source,
        })
    }

    fn store(&self, table: &T) -> Result<()> {
        let content =
            serde_json::to_vec_pretty(table).map_err(|source| OperationError::StateSerialize {
                path: self.path.clone(),
                source,
            })?;

        let write_err = |source: std::io::Error| OperationError::StateWrite {
            path: self.path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(self.directory()).map_err(write_err)?;
        tmp.write_all(&content).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Role provider persisting roles to `roles.json` in the state directory.
pub struct FileIdentityProvider {
    config: ProvisioningConfig,
    document: JsonDocument<RoleTable>,
}

impl FileIdentityProvider {
    #[must_use]
    pub fn new(config: ProvisioningConfig) -> Self {
        let document = JsonDocument::new(config.state_dir().join(ROLES_FILENAME));
        Self { config, document }
    }

    /// # Errors
    ///
    /// Returns an error if the roles file cannot be read.
    pub fn role_names(&self) -> Result<Vec<String>> {
        Ok(self.document.read()?.names())
    }
}

#[async_trait]
impl IdentityRoleProvider for FileIdentityProvider {
    async fn create_role(
        &self,
        account_id: &str,
    ) -> std::result::Result<RoleHandle, RoleCreationError> {
        // Outer error is the state file, inner is the role table's verdict.
        let created = self
            .document
            .update(|roles| Ok(roles.create(&self.config, account_id)))
            .map_err(|e| {
                RoleCreationError::new(RoleCreationErrorKind::Other, account_id, e.to_string())
            })?;
        let handle = created?;
        debug!(role = %handle.role_name, "created role");
        Ok(handle)
    }

    async fn delete_role(&self, role_name: &str) -> Result<()> {
        self.document.update(|roles| roles.delete(role_name))?;
        debug!(role = %role_name, "deleted role");
        Ok(())
    }

    async fn attach_policy(&self, role_name: &str) -> Result<()> {
        let policy = self.config.policy_arn();
        self.document.update(|roles| roles.attach(role_name, policy))
    }

    async fn detach_policy(&self, role_name: &str) -> Result<()> {
        let policy = self.config.policy_arn();
        self.document.update(|roles| roles.detach(role_name, policy))
    }
}

/// Tenant-metadata store persisting records to `tenants.json`.
pub struct FileMetadataStore {
    document: JsonDocument<TenantTable>,
}

impl FileMetadataStore {
    #[must_use]
    pub fn new(state_dir: &Path) -> Self {
        Self {
            document: JsonDocument::new(state_dir.join(TENANTS_FILENAME)),
        }
    }
}

#[async_trait]
impl TenantMetadataStore for FileMetadataStore {
    async fn put(&self, record: &TenantRecord) -> Result<()> {
        self.document.update(|records| {
            records.put(record);
            Ok(())
        })
    }

    async fn delete_by_role_identifier(&self, role_identifier: &str) -> Result<()> {
        self.document.update(|records| {
            records.delete(role_identifier);
            Ok(())
        })
    }

    async fn get_by_role_identifier(&self, role_identifier: &str) -> Result<Option<TenantRecord>> {
        Ok(self.document.read()?.get(role_identifier))
    }

    async fn scan_all(&self) -> Result<Vec<TenantRecord>> {
        Ok(self.document.read()?.all())
    }
}

/// Auth-mapping store persisting origins to `auth-mappings.json`.
pub struct FileAuthMappingStore {
    document: JsonDocument<AuthMappingTable>,
}

impl FileAuthMappingStore {
    #[must_use]
    pub fn new(state_dir: &Path) -> Self {
        Self {
            document: JsonDocument::new(state_dir.join(AUTH_MAPPINGS_FILENAME)),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the mappings file cannot be read.
    pub fn origin_for(&self, role_identifier: &str) -> Result<Option<String>> {
        Ok(self.document.read()?.get(role_identifier))
    }
}

#[async_trait]
impl AuthMappingStore for FileAuthMappingStore {
    async fn put(&self, role_identifier: &str, origin_url: &str) -> Result<()> {
        self.document.update(|origins| {
            origins.put(role_identifier, origin_url);
            Ok(())
        })
    }

    async fn delete_by_role_identifier(&self, role_identifier: &str) -> Result<()> {
        self.document.update(|origins| {
            origins.delete(role_identifier);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;

    fn record(role_identifier: &str) -> TenantRecord {
        TenantRecord {
            origin_url: "https://example.com".to_string(),
            adtech_id: "123456".to_string(),
            aws_id: "1234567890".to_string(),
            role_identifier: role_identifier.to_string(),
            role_name: "r".to_string(),
        }
    }

    fn config_in(dir: &TempDir) -> ProvisioningConfig {
        ProvisioningConfig::default().with_state_dir(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn missing_files_read_as_empty() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = FileMetadataStore::new(dir.path());

        assert!(store.scan_all().await?.is_empty());
        assert!(!dir.path().join(TENANTS_FILENAME).exists());
        Ok(())
    }

    #[tokio::test]
    async fn roles_survive_a_new_provider_instance() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let handle = FileIdentityProvider::new(config_in(&dir))
            .create_role("1234567890")
            .await?;

        let reopened = FileIdentityProvider::new(config_in(&dir));

        assert_eq!(reopened.role_names()?, vec![handle.role_name.clone()]);
        let duplicate = reopened
            .create_role("1234567890")
            .await
            .expect_err("role already exists");
        assert_eq!(duplicate.kind, RoleCreationErrorKind::DuplicateName);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_update_leaves_file_untouched() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let provider = FileIdentityProvider::new(config_in(&dir));

        assert!(provider.delete_role("missing").await.is_err());

        assert!(!dir.path().join(ROLES_FILENAME).exists());
        Ok(())
    }

    #[test]
    fn corrupt_file_reports_parse_error() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join(AUTH_MAPPINGS_FILENAME), "not json")?;
        let store = FileAuthMappingStore::new(dir.path());

        let result = store.origin_for("arn:role/r");

        assert!(matches!(result, Err(OperationError::StateParse { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn metadata_round_trips_through_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let record = record("arn:role/r");
        FileMetadataStore::new(dir.path()).put(&record).await?;

        let reopened = FileMetadataStore::new(dir.path());

        assert_eq!(
            reopened.get_by_role_identifier("arn:role/r").await?,
            Some(record)
        );
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn independent_stores_on_one_directory_keep_every_write() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let stores = [
            Arc::new(FileMetadataStore::new(dir.path())),
            Arc::new(FileMetadataStore::new(dir.path())),
        ];

        let mut writes = Vec::new();
        for i in 0..20 {
            for (n, store) in stores.iter().enumerate() {
                let store = Arc::clone(store);
                writes.push(tokio::spawn(async move {
                    store.put(&record(&format!("arn:role/{n}-{i}"))).await
                }));
            }
        }
        for write in writes {
            write.await??;
        }

        let stored = FileMetadataStore::new(dir.path()).scan_all().await?;
        assert_eq!(stored.len(), 40);
        Ok(())
    }
}
