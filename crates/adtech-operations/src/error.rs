use std::path::PathBuf;

use adtech_saga::SagaError;
use thiserror::Error;

/// Message returned when the role's trust policy is rejected as malformed.
pub const MALFORMED_POLICY_MESSAGE: &str =
    "The AWS ID provided is not a valid AWS account ID. Please check the AWS ID and try again.";

/// Closed set of reasons a role provider can refuse to create a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCreationErrorKind {
    /// The trust policy built for the account was rejected.
    MalformedPolicy,
    /// A role with the derived name already exists.
    DuplicateName,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to create role for account '{account_id}': {message}")]
pub struct RoleCreationError {
    pub kind: RoleCreationErrorKind,
    pub account_id: String,
    /// Provider's own description of the failure.
    pub message: String,
}

impl RoleCreationError {
    #[must_use]
    pub fn new(
        kind: RoleCreationErrorKind,
        account_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            account_id: account_id.into(),
            message: message.into(),
        }
    }

    /// Message safe to show to the caller that requested onboarding.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.kind {
            RoleCreationErrorKind::MalformedPolicy => MALFORMED_POLICY_MESSAGE.to_string(),
            RoleCreationErrorKind::DuplicateName => format!(
                "An Adtech with AWS ID {} is already onboarded.",
                self.account_id
            ),
            RoleCreationErrorKind::Other => self.message.clone(),
        }
    }
}

/// Details about a failed compensation during saga rollback.
///
/// Each one marks state the saga could not restore on its own.
#[derive(Debug)]
pub struct CompensationFailure {
    /// Name of the step whose compensation failed.
    pub step: String,
    /// Checkpoint kind that was being reversed.
    pub kind: &'static str,
    /// Description of what the compensation was trying to do.
    pub description: String,
    /// The error that occurred during compensation.
    pub error: Box<OperationError>,
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Core(#[from] adtech_core::CoreError),

    #[error(transparent)]
    RoleCreation(#[from] RoleCreationError),

    #[error("role '{0}' does not exist")]
    RoleNotFound(String),

    #[error("{store} rejected {operation}: {message}")]
    Store {
        store: &'static str,
        operation: &'static str,
        message: String,
    },

    #[error("no Adtech found with role identifier '{0}'")]
    TenantNotFound(String),

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error("failed to read state file '{path}'")]
    StateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write state file '{path}'")]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to lock state file '{path}'")]
    StateLock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state file '{path}'")]
    StateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize state for '{path}'")]
    StateSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("saga failed at step '{step}'")]
    SagaFailed {
        step: String,
        #[source]
        source: Box<OperationError>,
    },

    #[error(
        "saga failed at step '{step}' and {} compensation(s) also failed", compensation_failures.len()
    )]
    SagaCompensationFailed {
        step: String,
        source: Box<OperationError>,
        compensation_failures: Vec<CompensationFailure>,
    },
}

pub type Result<T> = std::result::Result<T, OperationError>;

impl OperationError {
    pub(crate) fn store(
        store: &'static str,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::Store {
            store,
            operation,
            message: message.into(),
        }
    }

    /// Message placed in the response body for this failure.
    ///
    /// Role creation failures are translated to stable messages; everything
    /// else surfaces the underlying message unmodified.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::SagaFailed { source, .. } | Self::SagaCompensationFailed { source, .. } => {
                source.user_message()
            }
            Self::RoleCreation(err) => err.user_message(),
            Self::Store { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Step at which a workflow failed, if this is a workflow failure.
    #[must_use]
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Self::SagaFailed { step, .. } | Self::SagaCompensationFailed { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Compensations that could not be applied, empty unless the workflow
    /// was left partially applied.
    #[must_use]
    pub fn compensation_failures(&self) -> &[CompensationFailure] {
        match self {
            Self::SagaCompensationFailed {
                compensation_failures,
                ..
            } => compensation_failures,
            _ => &[],
        }
    }
}

impl From<SagaError<OperationError>> for OperationError {
    fn from(err: SagaError<OperationError>) -> Self {
        match err {
            SagaError::StepFailed { step, source } => Self::SagaFailed {
                step,
                source: Box::new(source),
            },
            SagaError::CompensationFailed {
                failed_step,
                step_error,
                compensation_errors,
            } => {
                let compensation_failures = compensation_errors
                    .into_iter()
                    .map(|e| CompensationFailure {
                        step: e.step,
                        kind: e.kind,
                        description: e.description,
                        error: Box::new(e.error),
                    })
                    .collect();
                Self::SagaCompensationFailed {
                    step: failed_step,
                    source: Box::new(step_error),
                    compensation_failures,
                }
            }
            other => Self::SagaFailed {
                step: other.failed_step().to_string(),
                source: Box::new(Self::store("saga", "execute", format!("{other:?}"))),
            },
        }
    }
}
