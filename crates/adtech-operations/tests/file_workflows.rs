use std::sync::Arc;

use adtech_core::{ProvisioningConfig, TenantRecord};
use adtech_operations::ProvisioningHandler;
use adtech_operations::operations::{OnboardingOperation, ProvisioningContext};
use adtech_operations::providers::{
    FileAuthMappingStore, FileIdentityProvider, FileMetadataStore,
};
use tempfile::TempDir;

type FileHandler =
    ProvisioningHandler<FileIdentityProvider, FileMetadataStore, FileAuthMappingStore>;

fn file_context(
    dir: &TempDir,
) -> ProvisioningContext<FileIdentityProvider, FileMetadataStore, FileAuthMappingStore> {
    let config = ProvisioningConfig::default().with_state_dir(dir.path().to_path_buf());
    ProvisioningContext::new(
        Arc::new(FileIdentityProvider::new(config.clone())),
        Arc::new(FileMetadataStore::new(config.state_dir())),
        Arc::new(FileAuthMappingStore::new(config.state_dir())),
    )
}

fn file_handler(dir: &TempDir) -> FileHandler {
    ProvisioningHandler::new(file_context(dir))
}

const ONBOARD_BODY: &str =
    r#"{"originURL":"https://example.com","adtechID":"123456","awsID":"1234567890"}"#;

#[tokio::test]
async fn onboarded_tenant_is_visible_to_a_later_process() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let response = file_handler(&dir).onboard(ONBOARD_BODY).await;
    assert!(response.is_success());

    let listed = file_handler(&dir).read("").await;

    let records: Vec<TenantRecord> = serde_json::from_str(listed.body.as_deref().unwrap_or("[]"))?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].aws_id, "1234567890");
    assert!(dir.path().join("roles.json").exists());
    assert!(dir.path().join("auth-mappings.json").exists());
    Ok(())
}

#[tokio::test]
async fn read_one_by_role_identifier() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let record = OnboardingOperation::new(file_context(&dir))
        .execute(serde_json::from_str(ONBOARD_BODY)?)
        .await?;

    let body = format!(r#"{{"roleIdentifier":"{}"}}"#, record.role_identifier);
    let response = file_handler(&dir).read(&body).await;

    let read: TenantRecord = serde_json::from_str(response.body.as_deref().unwrap_or("{}"))?;
    assert_eq!(read, record);
    Ok(())
}

#[tokio::test]
async fn offboarding_empties_state_files() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let record = OnboardingOperation::new(file_context(&dir))
        .execute(serde_json::from_str(ONBOARD_BODY)?)
        .await?;

    let response = file_handler(&dir)
        .offboard(&serde_json::to_string(&record)?)
        .await;

    assert!(response.is_success());
    let listed = file_handler(&dir).read("").await;
    assert_eq!(listed.body.as_deref(), Some("[]"));
    Ok(())
}

#[tokio::test]
async fn corrupt_metadata_file_fails_read_all_with_bare_envelope() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("tenants.json"), "{")?;

    let response = file_handler(&dir).read("").await;

    assert!(!response.is_success());
    assert!(response.body.is_none());
    assert!(response.message.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_handlers_on_one_state_dir_lose_no_tenant() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let handlers = [Arc::new(file_handler(&dir)), Arc::new(file_handler(&dir))];

    let mut onboardings = Vec::new();
    for i in 0..10 {
        for (n, handler) in handlers.iter().enumerate() {
            let handler = Arc::clone(handler);
            let body = format!(
                r#"{{"originURL":"https://{n}-{i}.example.com","adtechID":"{n}{i}","awsID":"20000000{n}{i}"}}"#
            );
            onboardings.push(tokio::spawn(async move { handler.onboard(&body).await }));
        }
    }
    for onboarding in onboardings {
        let response = onboarding.await?;
        assert!(response.is_success(), "{response:?}");
    }

    let listed = file_handler(&dir).read("").await;
    let records: Vec<TenantRecord> = serde_json::from_str(listed.body.as_deref().unwrap_or("[]"))?;
    assert_eq!(records.len(), 20);
    let roles = FileIdentityProvider::new(
        ProvisioningConfig::default().with_state_dir(dir.path().to_path_buf()),
    )
    .role_names()?;
    assert_eq!(roles.len(), 20);
    Ok(())
}
