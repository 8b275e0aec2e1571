mod body;

use adtech_core::ApiResponse;
use clap::{Args, Subcommand};

use crate::error::Result;
use crate::setup::FileHandler;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Provision a new Adtech
    Onboard(BodyArgs),
    /// Remove an onboarded Adtech
    Offboard(BodyArgs),
    /// Read one Adtech by role identifier, or all of them
    Read(BodyArgs),
}

#[derive(Args)]
pub(crate) struct BodyArgs {
    /// JSON request body (read from stdin when omitted)
    #[arg(long)]
    body: Option<String>,
}

impl Commands {
    /// Resolves the request body, reading stdin if `--body` was not given.
    pub(crate) fn body(&self) -> Result<String> {
        let args = match self {
            Self::Onboard(args) | Self::Offboard(args) | Self::Read(args) => args,
        };
        body::resolve(args.body.as_deref())
    }

    pub(crate) async fn execute(&self, handler: &FileHandler, body: &str) -> ApiResponse {
        match self {
            Self::Onboard(_) => handler.onboard(body).await,
            Self::Offboard(_) => handler.offboard(body).await,
            Self::Read(_) => handler.read(body).await,
        }
    }
}
