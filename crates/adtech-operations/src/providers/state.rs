//! Store contents shared by the in-memory and file-backed providers.

use std::collections::{BTreeMap, BTreeSet};

use adtech_core::{ProvisioningConfig, RoleHandle, TenantRecord};
use serde::{Deserialize, Serialize};

use crate::error::{OperationError, Result, RoleCreationError, RoleCreationErrorKind};

pub(crate) const IDENTITY_PROVIDER: &str = "identity provider";
pub(crate) const METADATA_STORE: &str = "metadata store";
pub(crate) const AUTH_MAPPING_STORE: &str = "auth-mapping store";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RoleEntry {
    pub(crate) role_identifier: String,
    pub(crate) account_id: String,
    #[serde(default)]
    pub(crate) attached_policies: BTreeSet<String>,
}

/// Roles keyed by role name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct RoleTable {
    roles: BTreeMap<String, RoleEntry>,
}

impl RoleTable {
    pub(crate) fn create(
        &mut self,
        config: &ProvisioningConfig,
        account_id: &str,
    ) -> std::result::Result<RoleHandle, RoleCreationError> {
        if account_id.is_empty() || !account_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RoleCreationError::new(
                RoleCreationErrorKind::MalformedPolicy,
                account_id,
                format!("Invalid principal in policy: \"AWS\":\"{account_id}\""),
            ));
        }

        let role_name = config.role_name_for(account_id);
        if self.roles.contains_key(&role_name) {
            return Err(RoleCreationError::new(
                RoleCreationErrorKind::DuplicateName,
                account_id,
                format!("Role with name {role_name} already exists."),
            ));
        }

        let role_identifier = config.role_identifier_for(&role_name);
        self.roles.insert(
            role_name.clone(),
            RoleEntry {
                role_identifier: role_identifier.clone(),
                account_id: account_id.to_string(),
                attached_policies: BTreeSet::new(),
            },
        );
        Ok(RoleHandle {
            role_identifier,
            role_name,
        })
    }

    pub(crate) fn delete(&mut self, role_name: &str) -> Result<()> {
        let entry = self
            .roles
            .get(role_name)
            .ok_or_else(|| OperationError::RoleNotFound(role_name.to_string()))?;
        if !entry.attached_policies.is_empty() {
            return Err(OperationError::store(
                IDENTITY_PROVIDER,
                "delete_role",
                "Cannot delete entity, must detach all policies first.",
            ));
        }
        self.roles.remove(role_name);
        Ok(())
    }

    /// Attaching an already attached policy is a no-op.
    pub(crate) fn attach(&mut self, role_name: &str, policy_arn: &str) -> Result<()> {
        let entry = self
            .roles
            .get_mut(role_name)
            .ok_or_else(|| OperationError::RoleNotFound(role_name.to_string()))?;
        entry.attached_policies.insert(policy_arn.to_string());
        Ok(())
    }

    pub(crate) fn detach(&mut self, role_name: &str, policy_arn: &str) -> Result<()> {
        let entry = self
            .roles
            .get_mut(role_name)
            .ok_or_else(|| OperationError::RoleNotFound(role_name.to_string()))?;
        if !entry.attached_policies.remove(policy_arn) {
            return Err(OperationError::store(
                IDENTITY_PROVIDER,
                "detach_policy",
                format!("Policy {policy_arn} was not found."),
            ));
        }
        Ok(())
    }

    pub(crate) fn get(&self, role_name: &str) -> Option<&RoleEntry> {
        self.roles.get(role_name)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.roles.keys().cloned().collect()
    }
}

/// Tenant records keyed by role identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct TenantTable {
    records: BTreeMap<String, TenantRecord>,
}

impl TenantTable {
    pub(crate) fn put(&mut self, record: &TenantRecord) {
        self.records
            .insert(record.role_identifier.clone(), record.clone());
    }

    pub(crate) fn delete(&mut self, role_identifier: &str) {
        self.records.remove(role_identifier);
    }

    pub(crate) fn get(&self, role_identifier: &str) -> Option<TenantRecord> {
        self.records.get(role_identifier).cloned()
    }

    pub(crate) fn all(&self) -> Vec<TenantRecord> {
        self.records.values().cloned().collect()
    }
}

/// Origins keyed by role identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct AuthMappingTable {
    origins: BTreeMap<String, String>,
}

impl AuthMappingTable {
    pub(crate) fn put(&mut self, role_identifier: &str, origin_url: &str) {
        self.origins
            .insert(role_identifier.to_string(), origin_url.to_string());
    }

    pub(crate) fn delete(&mut self, role_identifier: &str) {
        self.origins.remove(role_identifier);
    }

    pub(crate) fn get(&self, role_identifier: &str) -> Option<String> {
        self.origins.get(role_identifier).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.origins.len()
    }
}
