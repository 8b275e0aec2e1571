use std::fmt;
use std::time::Instant;

use crate::ledger::UnwoundStep;

/// Lifecycle of one saga invocation.
///
/// `Succeeded` and `Failed` are terminal; a failed saga is never resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SagaState {
    /// Steps are still being executed.
    #[default]
    Pending,
    /// A step failed and completed steps are being compensated.
    Unwinding,
    /// Every step completed.
    Succeeded,
    /// A step failed and the unwind has finished.
    Failed,
}

impl SagaState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for SagaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Unwinding => "unwinding",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Status of a step in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Step executed successfully.
    Executed,
    /// Step failed during execution.
    Failed,
    /// Step was compensated successfully.
    Compensated,
    /// Step compensation failed.
    CompensationFailed,
}

/// Record of a step's execution in the saga.
#[derive(Debug)]
pub struct StepRecord {
    /// Name of the step.
    pub name: String,
    /// Current status.
    pub status: StepStatus,
    /// Kind of checkpoint the step recorded, if any.
    pub checkpoint_kind: Option<&'static str>,
    /// When the step started executing.
    pub started_at: Instant,
    /// When the step completed (execution or compensation).
    pub completed_at: Option<Instant>,
    /// Description of compensation (if applicable).
    pub compensation_description: Option<String>,
}

/// Audit log tracking all step executions in a saga.
#[derive(Debug, Default)]
pub struct SagaAuditLog {
    records: Vec<StepRecord>,
    state: SagaState,
}

impl SagaAuditLog {
    /// Create a new empty audit log in the `Pending` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, name: &str) {
        self.records.push(StepRecord {
            name: name.to_string(),
            status: StepStatus::Executed,
            checkpoint_kind: None,
            started_at: Instant::now(),
            completed_at: None,
            compensation_description: None,
        });
    }

    pub(crate) fn record_failure(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Failed;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Mark the last step as completed, with the checkpoint it left behind.
    pub(crate) fn record_success(&mut self, checkpoint: Option<(&'static str, String)>) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Executed;
            record.completed_at = Some(Instant::now());
            if let Some((kind, description)) = checkpoint {
                record.checkpoint_kind = Some(kind);
                record.compensation_description = Some(description);
            }
        }
    }

    /// Apply one unwind result to the most recent executed record of that step.
    pub(crate) fn record_unwound(&mut self, unwound: &UnwoundStep) {
        let record = self
            .records
            .iter_mut()
            .rev()
            .find(|r| r.name == unwound.step && r.status == StepStatus::Executed);
        if let Some(record) = record {
            record.status = if unwound.compensated {
                StepStatus::Compensated
            } else {
                StepStatus::CompensationFailed
            };
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn transition(&mut self, state: SagaState) {
        self.state = state;
    }

    /// Get all records in the audit log.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Current lifecycle state of the invocation.
    #[must_use]
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Get a summary of the saga execution for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("saga {}", self.state)];
        for record in &self.records {
            let status = match record.status {
                StepStatus::Executed => "✓",
                StepStatus::Failed => "✗",
                StepStatus::Compensated => "↩",
                StepStatus::CompensationFailed => "⚠",
            };
            lines.push(format!("{status} {}", record.name));
        }
        lines.join("\n")
    }
}
