mod context;
pub mod offboarding;
pub mod onboarding;
mod read;

pub use context::ProvisioningContext;
pub use offboarding::{OffboardingCheckpoint, OffboardingOperation};
pub use onboarding::{OnboardingCheckpoint, OnboardingOperation};
pub use read::{ReadOperation, ReadOutcome};
