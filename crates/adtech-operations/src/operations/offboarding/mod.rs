mod checkpoint;
mod operation;
pub mod steps;

pub use checkpoint::OffboardingCheckpoint;
pub use operation::OffboardingOperation;
