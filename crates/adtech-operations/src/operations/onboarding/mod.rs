mod checkpoint;
mod operation;
pub mod steps;

pub use checkpoint::OnboardingCheckpoint;
pub use operation::OnboardingOperation;
