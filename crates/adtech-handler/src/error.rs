use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error")]
    Config(#[source] adtech_core::CoreError),

    #[error("failed to read request body from stdin")]
    Stdin(#[source] std::io::Error),

    #[error("failed to start async runtime")]
    Runtime(#[source] std::io::Error),

    #[error("failed to encode response")]
    Encode(#[source] adtech_core::CoreError),
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::CliError;

    #[test]
    fn config_error_keeps_path_in_source_chain() {
        let err = CliError::Config(adtech_core::CoreError::ConfigRead {
            path: PathBuf::from("/etc/adtech.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        });

        let source = std::error::Error::source(&err).map(ToString::to_string);

        assert_eq!(err.to_string(), "configuration error");
        assert!(source.is_some_and(|s| s.contains("/etc/adtech.toml")));
    }

    #[test]
    fn stdin_error_message() {
        let err = CliError::Stdin(std::io::Error::other("closed"));

        assert!(err.to_string().contains("stdin"));
    }
}
