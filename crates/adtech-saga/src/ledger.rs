use async_trait::async_trait;
use tracing::{debug, error};

use crate::error::CompensationError;

/// A typed undo record left behind by a completed step.
///
/// Workflows implement this on a tagged union whose variants carry the
/// argument needed to reverse one action.
pub trait Checkpoint: Send + 'static {
    /// Tag identifying which compensable action completed.
    fn kind(&self) -> &'static str;

    /// Human-readable description of what compensation will do.
    fn compensation_description(&self) -> String;
}

/// Reverses the action recorded by a checkpoint.
///
/// Usually implemented by the saga context, which owns the store handles
/// the compensating calls need.
#[async_trait]
pub trait CompensationDispatcher<C: Checkpoint>: Sync {
    type Error: Send;

    /// Undo the action described by `checkpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the compensating call fails.
    async fn compensate(&self, checkpoint: C) -> Result<(), Self::Error>;
}

/// One recorded checkpoint together with the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry<C> {
    /// Name of the step that completed.
    pub step: &'static str,
    /// Undo record for that step.
    pub checkpoint: C,
}

/// Result of compensating one ledger entry during unwind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnwoundStep {
    pub step: &'static str,
    pub kind: &'static str,
    pub compensated: bool,
}

/// Everything that happened while unwinding a ledger, in unwind order.
#[derive(Debug)]
pub struct UnwindReport<E> {
    pub steps: Vec<UnwoundStep>,
    pub failures: Vec<CompensationError<E>>,
}

impl<E> UnwindReport<E> {
    /// Whether every compensation succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered record of completed steps for a single saga invocation.
///
/// Entries are appended only after their forward action has completed and
/// are consumed, most recent first, by [`CheckpointLedger::unwind_all`].
#[derive(Debug)]
pub struct CheckpointLedger<C> {
    entries: Vec<LedgerEntry<C>>,
}

impl<C> Default for CheckpointLedger<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C: Checkpoint> CheckpointLedger<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: &'static str, checkpoint: C) {
        debug!(step, kind = checkpoint.kind(), "recorded checkpoint");
        self.entries.push(LedgerEntry { step, checkpoint });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry<C>] {
        &self.entries
    }

    /// Compensate every entry in strict reverse insertion order.
    ///
    /// A failing compensation does not stop the unwind: its error is
    /// collected and the remaining entries are still compensated.
    pub async fn unwind_all<D>(self, dispatcher: &D) -> UnwindReport<D::Error>
    where
        D: CompensationDispatcher<C>,
        D::Error: std::fmt::Debug,
    {
        let mut report = UnwindReport {
            steps: Vec::with_capacity(self.entries.len()),
            failures: Vec::new(),
        };

        for LedgerEntry { step, checkpoint } in self.entries.into_iter().rev() {
            let kind = checkpoint.kind();
            let description = checkpoint.compensation_description();
            debug!(step, kind, %description, "compensating");

            match dispatcher.compensate(checkpoint).await {
                Ok(()) => {
                    report.steps.push(UnwoundStep {
                        step,
                        kind,
                        compensated: true,
                    });
                }
                Err(error) => {
                    error!(step, kind, %description, error = ?error, "compensation failed");
                    report.steps.push(UnwoundStep {
                        step,
                        kind,
                        compensated: false,
                    });
                    report.failures.push(CompensationError {
                        step: step.to_string(),
                        kind,
                        description,
                        error,
                    });
                }
            }
        }

        report
    }
}
