use std::fmt::Debug;
use std::marker::PhantomData;

use tracing::{debug, info, warn};

use crate::audit::{SagaAuditLog, SagaState};
use crate::erased::{AnyValue, ErasedStep};
use crate::error::SagaError;
use crate::ledger::{Checkpoint, CheckpointLedger, CompensationDispatcher};

/// A compiled saga ready for execution.
///
/// Sagas execute a sequence of steps, where each step's output becomes the
/// next step's input. Completed steps leave checkpoints in a ledger owned by
/// the invocation; if any step fails, the ledger is unwound in reverse order
/// (LIFO) through the context's [`CompensationDispatcher`].
///
/// A `Saga` holds no per-invocation state and may be executed concurrently.
pub struct Saga<Input, Output, Ctx, Ckpt, Err> {
    steps: Vec<Box<dyn ErasedStep<Ctx, Ckpt, Err>>>,
    _phantom: PhantomData<fn(Input) -> Output>,
}

impl<Input, Output, Ctx, Ckpt, Err> Saga<Input, Output, Ctx, Ckpt, Err>
where
    Input: Send + 'static,
    Output: Send + 'static,
    Err: Debug,
{
    pub(crate) fn from_steps(steps: Vec<Box<dyn ErasedStep<Ctx, Ckpt, Err>>>) -> Self {
        Self {
            steps,
            _phantom: PhantomData,
        }
    }

    /// Step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }
}

impl<Input, Output, Ctx, Ckpt, Err> Saga<Input, Output, Ctx, Ckpt, Err>
where
    Input: Send + 'static,
    Output: Send + 'static,
    Ctx: CompensationDispatcher<Ckpt, Error = Err>,
    Ckpt: Checkpoint,
    Err: Debug + Send,
{
    /// Execute the saga, returning the final output on success.
    ///
    /// On failure, compensates all previously completed steps in reverse order.
    ///
    /// # Errors
    ///
    /// Returns `SagaError::StepFailed` if a step fails and all compensations succeed.
    /// Returns `SagaError::CompensationFailed` if a step fails and some compensations also fail.
    pub async fn execute(&self, ctx: &Ctx, input: Input) -> Result<Output, SagaError<Err>> {
        let (result, _audit_log) = self.execute_internal(ctx, input).await;
        result
    }

    /// Execute the saga and return both the result and an audit log.
    ///
    /// The audit log tracks all step executions and compensations.
    pub async fn execute_with_audit(
        &self,
        ctx: &Ctx,
        input: Input,
    ) -> (Result<Output, SagaError<Err>>, SagaAuditLog) {
        self.execute_internal(ctx, input).await
    }

    async fn execute_internal(
        &self,
        ctx: &Ctx,
        input: Input,
    ) -> (Result<Output, SagaError<Err>>, SagaAuditLog) {
        let mut audit_log = SagaAuditLog::new();
        let mut ledger = CheckpointLedger::new();

        let mut current_input: AnyValue = Box::new(input);

        for (index, step) in self.steps.iter().enumerate() {
            audit_log.record_start(step.name());
            debug!(step = step.name(), index, "executing saga step");

            match step.execute_erased(ctx, current_input).await {
                Ok((output, checkpoint)) => {
                    audit_log.record_success(
                        checkpoint
                            .as_ref()
                            .map(|c| (c.kind(), c.compensation_description())),
                    );
                    if let Some(checkpoint) = checkpoint {
                        ledger.record(step.name(), checkpoint);
                    }

                    if index == self.steps.len() - 1 {
                        let typed_output = output
                            .downcast::<Output>()
                            .expect("type-state builder guarantees final output type");
                        audit_log.transition(SagaState::Succeeded);
                        info!(steps = self.steps.len(), "saga succeeded");
                        return (Ok(*typed_output), audit_log);
                    }

                    current_input = output;
                }
                Err(error) => {
                    audit_log.record_failure();
                    warn!(
                        step = step.name(),
                        index,
                        error = ?error,
                        completed = ledger.len(),
                        "saga step failed, unwinding"
                    );
                    let saga_error = Self::compensate(
                        ctx,
                        &mut audit_log,
                        ledger,
                        step.name(),
                        error,
                    )
                    .await;
                    return (Err(saga_error), audit_log);
                }
            }
        }

        unreachable!("saga must have at least one step")
    }

    async fn compensate(
        ctx: &Ctx,
        audit_log: &mut SagaAuditLog,
        ledger: CheckpointLedger<Ckpt>,
        failed_step: &str,
        step_error: Err,
    ) -> SagaError<Err> {
        audit_log.transition(SagaState::Unwinding);

        let report = ledger.unwind_all(ctx).await;
        for unwound in &report.steps {
            audit_log.record_unwound(unwound);
        }

        audit_log.transition(SagaState::Failed);
        info!(
            failed_step,
            compensated = report.steps.len() - report.failures.len(),
            compensation_failures = report.failures.len(),
            "saga failed"
        );

        if report.is_clean() {
            SagaError::StepFailed {
                step: failed_step.to_string(),
                source: step_error,
            }
        } else {
            SagaError::CompensationFailed {
                failed_step: failed_step.to_string(),
                step_error,
                compensation_errors: report.failures,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::audit::StepStatus;
    use crate::builder::SagaBuilder;
    use crate::step::SagaStep;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Undo {
        step: &'static str,
        value: i32,
    }

    impl Checkpoint for Undo {
        fn kind(&self) -> &'static str {
            self.step
        }

        fn compensation_description(&self) -> String {
            format!("undo {} at {}", self.step, self.value)
        }
    }

    #[derive(Default)]
    struct TestContext {
        compensation_log: Mutex<Vec<String>>,
        failing_compensations: Vec<&'static str>,
    }

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("{0}")]
    struct TestError(String);

    #[async_trait]
    impl CompensationDispatcher<Undo> for TestContext {
        type Error = TestError;

        async fn compensate(&self, checkpoint: Undo) -> Result<(), Self::Error> {
            if self.failing_compensations.contains(&checkpoint.step) {
                return Err(TestError(format!("cannot undo {}", checkpoint.step)));
            }
            self.compensation_log
                .lock()
                .expect("lock poisoned")
                .push(checkpoint.compensation_description());
            Ok(())
        }
    }

    struct AddStep {
        name: &'static str,
        value: i32,
    }

    #[async_trait]
    impl SagaStep for AddStep {
        type Input = i32;
        type Output = i32;
        type Context = TestContext;
        type Checkpoint = Undo;
        type Error = TestError;

        fn name(&self) -> &'static str {
            self.name
        }

        async fn execute(
            &self,
            _ctx: &Self::Context,
            input: Self::Input,
        ) -> Result<Self::Output, Self::Error> {
            Ok(input + self.value)
        }

        fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
            Some(Undo {
                step: self.name,
                value: *output,
            })
        }
    }

    struct ReadOnlyStep;

    #[async_trait]
    impl SagaStep for ReadOnlyStep {
        type Input = i32;
        type Output = i32;
        type Context = TestContext;
        type Checkpoint = Undo;
        type Error = TestError;

        fn name(&self) -> &'static str {
            "read_only"
        }

        async fn execute(
            &self,
            _ctx: &Self::Context,
            input: Self::Input,
        ) -> Result<Self::Output, Self::Error> {
            Ok(input)
        }
    }

    struct FailingStep;

    #[async_trait]
    impl SagaStep for FailingStep {
        type Input = i32;
        type Output = i32;
        type Context = TestContext;
        type Checkpoint = Undo;
        type Error = TestError;

        fn name(&self) -> &'static str {
            "failing"
        }

        async fn execute(
            &self,
            _ctx: &Self::Context,
            _input: Self::Input,
        ) -> Result<Self::Output, Self::Error> {
            Err(TestError("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn multi_step_saga_flows_data_through_steps() -> anyhow::Result<()> {
        let ctx = TestContext::default();
        let saga = SagaBuilder::new()
            .first_step(AddStep {
                name: "add_10",
                value: 10,
            })
            .then(AddStep {
                name: "add_5",
                value: 5,
            })
            .build();

        let result = saga.execute(&ctx, 5).await?;

        assert_eq!(result, 20);
        assert!(ctx.compensation_log.lock().expect("lock poisoned").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn compensation_happens_in_lifo_order_with_recorded_checkpoints() {
        let ctx = TestContext::default();
        let saga = SagaBuilder::new()
            .first_step(AddStep {
                name: "add_10",
                value: 10,
            })
            .then(AddStep {
                name: "add_5",
                value: 5,
            })
            .then(FailingStep)
            .build();

        let result = saga.execute(&ctx, 5).await;

        let err = result.expect_err("saga should fail");
        assert_eq!(err.failed_step(), "failing");
        let log = ctx.compensation_log.lock().expect("lock poisoned");
        assert_eq!(*log, vec!["undo add_5 at 20", "undo add_10 at 15"]);
    }

    #[tokio::test]
    async fn read_only_step_leaves_no_checkpoint() {
        let ctx = TestContext::default();
        let saga = SagaBuilder::new()
            .first_step(ReadOnlyStep)
            .then(FailingStep)
            .build();

        let result = saga.execute(&ctx, 42).await;

        assert!(matches!(result, Err(SagaError::StepFailed { .. })));
        assert!(ctx.compensation_log.lock().expect("lock poisoned").is_empty());
    }

    #[tokio::test]
    async fn compensation_failure_returns_compensation_failed_error() {
        let ctx = TestContext {
            failing_compensations: vec!["add_5"],
            ..Default::default()
        };
        let saga = SagaBuilder::new()
            .first_step(AddStep {
                name: "add_10",
                value: 10,
            })
            .then(AddStep {
                name: "add_5",
                value: 5,
            })
            .then(FailingStep)
            .build();

        let err = saga.execute(&ctx, 5).await.expect_err("saga should fail");

        match err {
            SagaError::CompensationFailed {
                failed_step,
                compensation_errors,
                ..
            } => {
                assert_eq!(failed_step, "failing");
                assert_eq!(compensation_errors.len(), 1);
                assert_eq!(compensation_errors[0].step, "add_5");
            }
            SagaError::StepFailed { .. } => panic!("expected CompensationFailed error"),
        }
        let log = ctx.compensation_log.lock().expect("lock poisoned");
        assert_eq!(*log, vec!["undo add_10 at 15"]);
    }

    #[tokio::test]
    async fn audit_log_tracks_states_and_compensation_status() {
        let ctx = TestContext {
            failing_compensations: vec!["add_5"],
            ..Default::default()
        };
        let saga = SagaBuilder::new()
            .first_step(AddStep {
                name: "add_10",
                value: 10,
            })
            .then(AddStep {
                name: "add_5",
                value: 5,
            })
            .then(FailingStep)
            .build();

        let (result, audit_log) = saga.execute_with_audit(&ctx, 5).await;

        assert!(result.is_err());
        assert_eq!(audit_log.state(), SagaState::Failed);
        let records = audit_log.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].status, StepStatus::Compensated);
        assert_eq!(records[1].status, StepStatus::CompensationFailed);
        assert_eq!(records[2].status, StepStatus::Failed);
    }

    #[tokio::test]
    async fn successful_audit_log_ends_succeeded() -> anyhow::Result<()> {
        let ctx = TestContext::default();
        let saga = SagaBuilder::new()
            .first_step(AddStep {
                name: "add_1",
                value: 1,
            })
            .build();

        let (result, audit_log) = saga.execute_with_audit(&ctx, 1).await;

        assert_eq!(result?, 2);
        assert_eq!(audit_log.state(), SagaState::Succeeded);
        assert_eq!(audit_log.records()[0].checkpoint_kind, Some("add_1"));
        Ok(())
    }
}
