mod error;
pub mod handler;
pub mod operations;
pub mod providers;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod mocks;

pub use error::{
    CompensationFailure, MALFORMED_POLICY_MESSAGE, OperationError, Result, RoleCreationError,
    RoleCreationErrorKind,
};
pub use handler::ProvisioningHandler;
