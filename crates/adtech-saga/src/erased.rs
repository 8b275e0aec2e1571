use std::any::Any;

use async_trait::async_trait;

use crate::step::SagaStep;

pub(crate) type AnyValue = Box<dyn Any + Send>;

#[async_trait]
pub(crate) trait ErasedStep<Ctx, Ckpt, Err>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute_erased(
        &self,
        ctx: &Ctx,
        input: AnyValue,
    ) -> Result<(AnyValue, Option<Ckpt>), Err>;
}

pub(crate) struct StepWrapper<S> {
    step: S,
}

impl<S> StepWrapper<S> {
    pub(crate) fn new(step: S) -> Self {
        Self { step }
    }
}

#[async_trait]
impl<S> ErasedStep<S::Context, S::Checkpoint, S::Error> for StepWrapper<S>
where
    S: SagaStep + 'static,
{
    fn name(&self) -> &'static str {
        self.step.name()
    }

    async fn execute_erased(
        &self,
        ctx: &S::Context,
        input: AnyValue,
    ) -> Result<(AnyValue, Option<S::Checkpoint>), S::Error> {
        let typed_input = input
            .downcast::<S::Input>()
            .expect("type-state builder guarantees correct input type");
        let output = self.step.execute(ctx, *typed_input).await?;
        let checkpoint = self.step.checkpoint(&output);
        Ok((Box::new(output), checkpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestContext {
        multiplier: i32,
    }

    #[derive(Debug, PartialEq)]
    struct TestError(String);

    struct MultiplyStep;

    #[async_trait]
    impl SagaStep for MultiplyStep {
        type Input = i32;
        type Output = i32;
        type Context = TestContext;
        type Checkpoint = i32;
        type Error = TestError;

        fn name(&self) -> &'static str {
            "multiply"
        }

        async fn execute(
            &self,
            ctx: &Self::Context,
            input: Self::Input,
        ) -> Result<Self::Output, Self::Error> {
            Ok(input * ctx.multiplier)
        }

        fn checkpoint(&self, output: &Self::Output) -> Option<Self::Checkpoint> {
            Some(*output)
        }
    }

    struct FailingStep;

    #[async_trait]
    impl SagaStep for FailingStep {
        type Input = String;
        type Output = ();
        type Context = TestContext;
        type Checkpoint = i32;
        type Error = TestError;

        fn name(&self) -> &'static str {
            "failing"
        }

        async fn execute(
            &self,
            _ctx: &Self::Context,
            input: Self::Input,
        ) -> Result<Self::Output, Self::Error> {
            Err(TestError(input))
        }
    }

    #[test]
    fn wrapper_delegates_name() {
        let wrapper = StepWrapper::new(MultiplyStep);
        assert_eq!(wrapper.name(), "multiply");
    }

    #[tokio::test]
    async fn wrapper_executes_with_erased_types_and_declares_checkpoint() {
        let ctx = TestContext { multiplier: 3 };
        let wrapper = StepWrapper::new(MultiplyStep);

        let input: AnyValue = Box::new(7_i32);
        let (output, checkpoint) = wrapper
            .execute_erased(&ctx, input)
            .await
            .expect("execution should succeed");

        let output = output.downcast::<i32>().expect("output should be i32");
        assert_eq!(*output, 21);
        assert_eq!(checkpoint, Some(21));
    }

    #[tokio::test]
    async fn wrapper_propagates_errors() {
        let ctx = TestContext { multiplier: 1 };
        let wrapper = StepWrapper::new(FailingStep);

        let input: AnyValue = Box::new(String::from("test error"));
        let result = wrapper.execute_erased(&ctx, input).await;

        let err = result.err().expect("should have an error");
        assert_eq!(err, TestError(String::from("test error")));
    }
}
