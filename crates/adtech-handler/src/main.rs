mod commands;
mod error;
mod setup;

use std::path::PathBuf;
use std::process::ExitCode;

use adtech_core::ApiResponse;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::commands::Commands;
use crate::error::{CliError, Result};

/// Exit code for configuration, input and runtime errors; clap uses the same
/// code for usage errors.
const SETUP_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "adtech-handler")]
#[command(about = "Onboard, offboard and read Adtech tenants", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the local state files
    #[arg(long, global = true, env = "ADTECH_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            print_error(&CliError::Runtime(e));
            return ExitCode::from(SETUP_FAILURE);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(response) if response.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            print_error(&e);
            ExitCode::from(SETUP_FAILURE)
        }
    }
}

async fn run(cli: Cli) -> Result<ApiResponse> {
    let config = setup::load_config(cli.config.as_deref(), cli.state_dir)?;
    let body = cli.command.body()?;
    let handler = setup::file_handler(&config);

    let response = cli.command.execute(&handler, &body).await;
    println!("{}", response.to_json().map_err(CliError::Encode)?);
    Ok(response)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("adtech=info")))
        .init();
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
