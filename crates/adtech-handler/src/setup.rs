use std::path::{Path, PathBuf};
use std::sync::Arc;

use adtech_core::ProvisioningConfig;
use adtech_operations::ProvisioningHandler;
use adtech_operations::operations::ProvisioningContext;
use adtech_operations::providers::{
    FileAuthMappingStore, FileIdentityProvider, FileMetadataStore,
};
use tracing::debug;

use crate::error::{CliError, Result};

pub(crate) type FileHandler =
    ProvisioningHandler<FileIdentityProvider, FileMetadataStore, FileAuthMappingStore>;

/// Loads the config file if one was given, then applies the state-dir override.
pub(crate) fn load_config(
    config_path: Option<&Path>,
    state_dir: Option<PathBuf>,
) -> Result<ProvisioningConfig> {
    let config = match config_path {
        Some(path) => ProvisioningConfig::load(path).map_err(CliError::Config)?,
        None => ProvisioningConfig::default(),
    };
    let config = match state_dir {
        Some(dir) => config.with_state_dir(dir),
        None => config,
    };
    debug!(state_dir = %config.state_dir().display(), "resolved configuration");
    Ok(config)
}

pub(crate) fn file_handler(config: &ProvisioningConfig) -> FileHandler {
    ProvisioningHandler::new(ProvisioningContext::new(
        Arc::new(FileIdentityProvider::new(config.clone())),
        Arc::new(FileMetadataStore::new(config.state_dir())),
        Arc::new(FileAuthMappingStore::new(config.state_dir())),
    ))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn no_config_path_means_defaults() {
        let config = load_config(None, None).expect("defaults always load");

        assert_eq!(config, ProvisioningConfig::default());
    }

    #[test]
    fn state_dir_override_beats_config_file() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("adtech.toml");
        fs::write(&path, "state-dir = \"/from/config\"\n").expect("failed to write config");

        let config =
            load_config(Some(&path), Some(PathBuf::from("/from/flag"))).expect("config loads");

        assert_eq!(config.state_dir(), Path::new("/from/flag"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/adtech.toml")), None);

        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
