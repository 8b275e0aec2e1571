//! Typed requests deserialized from an inbound JSON body.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{RoleHandle, TenantRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRequest {
    #[serde(rename = "originURL")]
    pub origin_url: String,
    #[serde(rename = "adtechID")]
    pub adtech_id: String,
    #[serde(rename = "awsID")]
    pub aws_id: String,
}

impl OnboardingRequest {
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for this request or a
    /// required field is empty.
    pub fn from_json(body: &str) -> Result<Self> {
        let request: Self = serde_json::from_str(body).map_err(CoreError::RequestParse)?;
        request.validate()?;
        Ok(request)
    }

    /// # Errors
    ///
    /// Returns `CoreError::MissingField` for the first empty field.
    pub fn validate(&self) -> Result<()> {
        require("originURL", &self.origin_url)?;
        require("adtechID", &self.adtech_id)?;
        require("awsID", &self.aws_id)
    }

    /// Tenant record for this request once its role exists.
    #[must_use]
    pub fn into_record(self, role: RoleHandle) -> TenantRecord {
        TenantRecord {
            origin_url: self.origin_url,
            adtech_id: self.adtech_id,
            aws_id: self.aws_id,
            role_identifier: role.role_identifier,
            role_name: role.role_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffboardingRequest {
    #[serde(rename = "originURL")]
    pub origin_url: String,
    #[serde(rename = "adtechID")]
    pub adtech_id: String,
    #[serde(rename = "awsID")]
    pub aws_id: String,
    #[serde(rename = "roleIdentifier")]
    pub role_identifier: String,
    #[serde(rename = "roleName")]
    pub role_name: String,
}

impl OffboardingRequest {
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for this request or a
    /// required field is empty.
    pub fn from_json(body: &str) -> Result<Self> {
        let request: Self = serde_json::from_str(body).map_err(CoreError::RequestParse)?;
        request.validate()?;
        Ok(request)
    }

    /// # Errors
    ///
    /// Returns `CoreError::MissingField` for the first empty field.
    pub fn validate(&self) -> Result<()> {
        require("originURL", &self.origin_url)?;
        require("adtechID", &self.adtech_id)?;
        require("awsID", &self.aws_id)?;
        require("roleIdentifier", &self.role_identifier)?;
        require("roleName", &self.role_name)
    }

    /// The record being torn down, as the caller describes it.
    ///
    /// Compensations re-create state from this record, so it is never read
    /// back from the stores.
    #[must_use]
    pub fn into_record(self) -> TenantRecord {
        TenantRecord {
            origin_url: self.origin_url,
            adtech_id: self.adtech_id,
            aws_id: self.aws_id,
            role_identifier: self.role_identifier,
            role_name: self.role_name,
        }
    }
}

/// Reads one tenant by role identifier, or all tenants when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    #[serde(
        rename = "roleIdentifier",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub role_identifier: Option<String>,
}

impl ReadRequest {
    /// An empty body reads every tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-empty body is not valid JSON.
    pub fn from_json(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(body).map_err(CoreError::RequestParse)
    }

    /// The identifier to look up, treating an empty string as absent.
    #[must_use]
    pub fn role_identifier(&self) -> Option<&str> {
        self.role_identifier
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::MissingField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_request_parses_store_field_names() -> anyhow::Result<()> {
        let request = OnboardingRequest::from_json(
            r#"{"originURL":"https://example.com","adtechID":"123456","awsID":"1234567890"}"#,
        )?;

        assert_eq!(request.origin_url, "https://example.com");
        assert_eq!(request.adtech_id, "123456");
        assert_eq!(request.aws_id, "1234567890");
        Ok(())
    }

    #[test]
    fn onboarding_request_rejects_empty_aws_id() {
        let result = OnboardingRequest::from_json(
            r#"{"originURL":"https://example.com","adtechID":"123456","awsID":" "}"#,
        );

        assert!(matches!(result, Err(CoreError::MissingField("awsID"))));
    }

    #[test]
    fn onboarding_request_rejects_missing_field() {
        let result =
            OnboardingRequest::from_json(r#"{"originURL":"https://example.com","adtechID":"1"}"#);

        assert!(matches!(result, Err(CoreError::RequestParse(_))));
    }

    #[test]
    fn onboarding_request_becomes_record_with_role() {
        let request = OnboardingRequest {
            origin_url: "https://example.com".to_string(),
            adtech_id: "123456".to_string(),
            aws_id: "1234567890".to_string(),
        };

        let record = request.into_record(RoleHandle {
            role_identifier: "arn:role/my-role-name".to_string(),
            role_name: "my-role-name".to_string(),
        });

        assert_eq!(record.aws_id, "1234567890");
        assert_eq!(record.role_identifier, "arn:role/my-role-name");
        assert_eq!(record.role_name, "my-role-name");
    }

    #[test]
    fn offboarding_request_requires_role_name() {
        let result = OffboardingRequest::from_json(
            r#"{"originURL":"o","adtechID":"a","awsID":"1","roleIdentifier":"arn","roleName":""}"#,
        );

        assert!(matches!(result, Err(CoreError::MissingField("roleName"))));
    }

    #[test]
    fn read_request_with_empty_body_reads_all() -> anyhow::Result<()> {
        let request = ReadRequest::from_json("  ")?;

        assert_eq!(request.role_identifier(), None);
        Ok(())
    }

    #[test]
    fn read_request_treats_blank_identifier_as_absent() -> anyhow::Result<()> {
        let request = ReadRequest::from_json(r#"{"roleIdentifier":""}"#)?;

        assert_eq!(request.role_identifier(), None);
        Ok(())
    }

    #[test]
    fn read_request_with_identifier() -> anyhow::Result<()> {
        let request = ReadRequest::from_json(r#"{"roleIdentifier":"arn:role/r"}"#)?;

        assert_eq!(request.role_identifier(), Some("arn:role/r"));
        Ok(())
    }
}
