use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CoreError, Result};

pub const DEFAULT_STATE_DIR: &str = ".adtech-state";

/// Settings shared by the role provider and the local stores.
///
/// Loaded from a TOML file with kebab-case keys; every key is optional.
///
/// ```toml
/// role-name-prefix = "adtech-access"
/// partition = "aws"
/// coordinator-account-id = "111122223333"
/// policy-arn = "arn:aws:iam::111122223333:policy/budget-access"
/// state-dir = "/var/lib/adtech"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProvisioningConfig {
    role_name_prefix: String,
    partition: String,
    coordinator_account_id: String,
    policy_arn: String,
    state_dir: PathBuf,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            role_name_prefix: String::from("adtech-access"),
            partition: String::from("aws"),
            coordinator_account_id: String::from("000000000000"),
            policy_arn: String::from("arn:aws:iam::000000000000:policy/adtech-budget-access"),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

impl ProvisioningConfig {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid config.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// # Errors
    ///
    /// Returns the TOML error if `content` is not valid config.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn with_state_dir(mut self, state_dir: PathBuf) -> Self {
        self.state_dir = state_dir;
        self
    }

    #[must_use]
    pub fn policy_arn(&self) -> &str {
        &self.policy_arn
    }

    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Name of the role provisioned for a tenant's cloud account.
    #[must_use]
    pub fn role_name_for(&self, account_id: &str) -> String {
        format!("{}-{account_id}", self.role_name_prefix)
    }

    /// Identifier (ARN) of a role in the coordinator account.
    #[must_use]
    pub fn role_identifier_for(&self, role_name: &str) -> String {
        format!(
            "arn:{}:iam::{}:role/{role_name}",
            self.partition, self.coordinator_account_id
        )
    }
}
