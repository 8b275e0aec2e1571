use std::fmt::Debug;
use std::marker::PhantomData;

use crate::erased::{ErasedStep, StepWrapper};
use crate::saga::Saga;
use crate::step::SagaStep;

/// Marker type for a builder with no steps.
pub struct Empty;

/// Marker type for a builder with at least one step.
pub struct HasSteps<LastOutput>(PhantomData<LastOutput>);

/// Type-state builder for constructing type-safe sagas.
///
/// The builder enforces at compile-time that:
/// - Each step's input type matches the previous step's output type
/// - Every step shares the saga's context, checkpoint and error types
/// - A saga has at least one step
///
/// The order in which steps are added is the order in which they execute,
/// and the reverse of the order in which they are compensated.
///
/// An empty saga (without calling `first_step()`) cannot be built:
///
/// ```compile_fail
/// use adtech_saga::{Empty, SagaBuilder};
///
/// // Cannot build an empty saga - `build()` is only available after `first_step()`
/// let saga = SagaBuilder::<(), (), (), (), (), Empty>::new().build();
/// ```
pub struct SagaBuilder<Input, Output, Ctx, Ckpt, Err, State> {
    steps: Vec<Box<dyn ErasedStep<Ctx, Ckpt, Err>>>,
    _phantom: PhantomData<fn(Input) -> (Output, State)>,
}

impl<Ctx, Ckpt, Err> SagaBuilder<(), (), Ctx, Ckpt, Err, Empty> {
    /// Create a new saga builder in the empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            _phantom: PhantomData,
        }
    }
}

impl<Ctx, Ckpt, Err> Default for SagaBuilder<(), (), Ctx, Ckpt, Err, Empty> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx, Ckpt, Err> SagaBuilder<(), (), Ctx, Ckpt, Err, Empty> {
    /// Add the first step to the saga.
    ///
    /// This establishes the saga's input type from the step's input type.
    #[must_use]
    pub fn first_step<S>(
        self,
        step: S,
    ) -> SagaBuilder<S::Input, S::Output, Ctx, Ckpt, Err, HasSteps<S::Output>>
    where
        S: SagaStep<Context = Ctx, Checkpoint = Ckpt, Error = Err> + 'static,
    {
        let mut steps = self.steps;
        steps.push(Box::new(StepWrapper::new(step)));
        SagaBuilder {
            steps,
            _phantom: PhantomData,
        }
    }
}

impl<Input, CurrentOutput, Ctx, Ckpt, Err>
    SagaBuilder<Input, CurrentOutput, Ctx, Ckpt, Err, HasSteps<CurrentOutput>>
{
    /// Add another step to the saga.
    ///
    /// The step's input type must match the current output type.
    #[must_use]
    pub fn then<S>(
        self,
        step: S,
    ) -> SagaBuilder<Input, S::Output, Ctx, Ckpt, Err, HasSteps<S::Output>>
    where
        S: SagaStep<Input = CurrentOutput, Context = Ctx, Checkpoint = Ckpt, Error = Err>
            + 'static,
    {
        let mut steps = self.steps;
        steps.push(Box::new(StepWrapper::new(step)));
        SagaBuilder {
            steps,
            _phantom: PhantomData,
        }
    }

    /// Build the saga from the accumulated steps.
    #[must_use]
    pub fn build(self) -> Saga<Input, CurrentOutput, Ctx, Ckpt, Err>
    where
        Input: Send + 'static,
        CurrentOutput: Send + 'static,
        Err: Debug,
    {
        Saga::from_steps(self.steps)
    }
}
