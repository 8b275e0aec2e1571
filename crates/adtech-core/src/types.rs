use serde::{Deserialize, Serialize};

/// A provisioned Adtech as stored in the tenant-metadata store.
///
/// Metadata and auth-mapping entries are both keyed by `role_identifier`.
/// Role and policy operations are addressed by `role_name`; the name cannot
/// be derived from the identifier without a read-back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantRecord {
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

/// Identity returned by the role provider for a freshly created role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleHandle {
    #[serde(rename = "roleIdentifier")]
    pub role_identifier: String,
    #[serde(rename = "roleName")]
    pub role_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_record_uses_store_field_names() -> anyhow::Result<()> {
        let record = TenantRecord {
            origin_url: "https://example.com".to_string(),
            adtech_id: "123456".to_string(),
            aws_id: "1234567890".to_string(),
            role_identifier: "arn:aws:iam::999:role/my-role-name".to_string(),
            role_name: "my-role-name".to_string(),
        };

        let json = serde_json::to_value(&record)?;

        assert_eq!(json["originURL"], "https://example.com");
        assert_eq!(json["adtechID"], "123456");
        assert_eq!(json["awsID"], "1234567890");
        assert_eq!(json["roleIdentifier"], "arn:aws:iam::999:role/my-role-name");
        assert_eq!(json["roleName"], "my-role-name");
        Ok(())
    }
}
