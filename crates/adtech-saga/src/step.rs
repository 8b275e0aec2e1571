use async_trait::async_trait;

/// A forward action in a saga.
///
/// Each step transforms an input into an output. A step with side effects
/// declares, from its output, the checkpoint needed to reverse it. The
/// reversal itself is performed by the saga context acting as a
/// [`CompensationDispatcher`](crate::CompensationDispatcher).
///
/// # Type Parameters
///
/// - `Input`: Data received from the previous step (or saga entry point)
/// - `Output`: Data produced for the next step
/// - `Context`: Shared dependencies (injected, not passed between steps)
/// - `Checkpoint`: Undo record this step leaves in the ledger
/// - `Error`: The error type for step failures
#[async_trait]
pub trait SagaStep: Send + Sync {
    /// Data received from the previous step or saga entry point.
    type Input: Send + 'static;

    /// Data produced for the next step.
    type Output: Send + 'static;

    /// Shared context providing dependencies.
    type Context: Sync;

    /// Ledger entry recorded once the step has completed.
    type Checkpoint: Send;

    /// Error type for step failures.
    type Error: Send;

    /// Human-readable name for logging and error messages.
    fn name(&self) -> &'static str;

    /// Execute the step, transforming input into output.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails to complete. A failed step is
    /// treated as not having happened and records no checkpoint.
    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error>;

    /// The undo argument for a completed execution.
    ///
    /// The default returns `None`, suitable for read-only steps.
    fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
        let _ = output;
        None
    }
}
