pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod types;

pub use config::ProvisioningConfig;
pub use error::{CoreError, Result};
pub use request::{OffboardingRequest, OnboardingRequest, ReadRequest};
pub use response::{ApiResponse, MessageBody, StatusCode};
pub use types::{RoleHandle, TenantRecord};
