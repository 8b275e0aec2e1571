//! Saga pattern for provisioning across independently failing stores.
//!
//! A saga is an ordered list of steps. Each step's output becomes the next
//! step's input, and each completed step leaves a typed checkpoint in a
//! [`CheckpointLedger`]. When a step fails, the ledger is unwound in reverse
//! order and every checkpoint is handed to a [`CompensationDispatcher`].
//!
//! This is best-effort compensation, not an atomic transaction: a failed
//! compensation is reported, never retried.

mod audit;
mod builder;
mod erased;
mod error;
mod ledger;
mod saga;
mod step;

pub use audit::{SagaAuditLog, SagaState, StepRecord, StepStatus};
pub use builder::{Empty, HasSteps, SagaBuilder};
pub use error::{CompensationError, SagaError};
pub use ledger::{
    Checkpoint, CheckpointLedger, CompensationDispatcher, LedgerEntry, UnwindReport, UnwoundStep,
};
pub use saga::Saga;
pub use step::SagaStep;
