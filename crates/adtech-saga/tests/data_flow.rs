//! Integration tests for data flow between saga steps.

use adtech_saga::{Checkpoint, CompensationDispatcher, SagaBuilder, SagaStep};
use async_trait::async_trait;

struct TestContext {
    suffix: &'static str,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

#[derive(Debug)]
struct NoUndo;

impl Checkpoint for NoUndo {
    fn kind(&self) -> &'static str {
        "none"
    }

    fn compensation_description(&self) -> String {
        "nothing to undo".to_string()
    }
}

#[async_trait]
impl CompensationDispatcher<NoUndo> for TestContext {
    type Error = TestError;

    async fn compensate(&self, _checkpoint: NoUndo) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Request {
    account: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Provisioned {
    account: String,
    handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Registered {
    handle: String,
    entries: usize,
}

struct Allocate;

#[async_trait]
impl SagaStep for Allocate {
    type Input = Request;
    type Output = Provisioned;
    type Context = TestContext;
    type Checkpoint = NoUndo;
    type Error = TestError;

    fn name(&self) -> &'static str {
        "allocate"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        Ok(Provisioned {
            handle: format!("{}-{}", input.account, ctx.suffix),
            account: input.account,
        })
    }
}

struct Register;

#[async_trait]
impl SagaStep for Register {
    type Input = Provisioned;
    type Output = Registered;
    type Context = TestContext;
    type Checkpoint = NoUndo;
    type Error = TestError;

    fn name(&self) -> &'static str {
        "register"
    }

    async fn execute(
        &self,
        _ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        if input.account.is_empty() {
            return Err(TestError("account required".to_string()));
        }
        Ok(Registered {
            handle: input.handle,
            entries: 1,
        })
    }
}

#[tokio::test]
async fn values_produced_by_earlier_steps_feed_later_steps() -> anyhow::Result<()> {
    let ctx = TestContext { suffix: "role" };
    let saga = SagaBuilder::new()
        .first_step(Allocate)
        .then(Register)
        .build();

    let result = saga
        .execute(
            &ctx,
            Request {
                account: "1234".to_string(),
            },
        )
        .await?;

    assert_eq!(
        result,
        Registered {
            handle: "1234-role".to_string(),
            entries: 1,
        }
    );
    Ok(())
}

#[tokio::test]
async fn saga_is_reusable_across_invocations() -> anyhow::Result<()> {
    let ctx = TestContext { suffix: "x" };
    let saga = SagaBuilder::new()
        .first_step(Allocate)
        .then(Register)
        .build();

    let first = saga
        .execute(
            &ctx,
            Request {
                account: "a".to_string(),
            },
        )
        .await?;
    let failed = saga
        .execute(
            &ctx,
            Request {
                account: String::new(),
            },
        )
        .await;
    let second = saga
        .execute(
            &ctx,
            Request {
                account: "b".to_string(),
            },
        )
        .await?;

    assert_eq!(first.handle, "a-x");
    assert!(failed.is_err());
    assert_eq!(second.handle, "b-x");
    Ok(())
}
