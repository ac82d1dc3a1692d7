//! catalogctl - manage catalog database services on a managed cluster

use std::path::PathBuf;
use std::process::ExitCode;

use catalogctl_core::{Config, HttpManageClient, Invocation, dispatch};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod error;
mod output;
mod wait;

use cli::Cli;
use error::{CatalogCtlError, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too and are not failures
            let failed = e.use_stderr();
            let _ = e.print();
            return if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    match execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.print_diagnostic();
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "catalogctl=warn,catalogctl_core=warn",
            1 => "catalogctl=info,catalogctl_core=info",
            2 => "catalogctl=debug,catalogctl_core=debug",
            _ => "catalogctl=trace,catalogctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

fn load_config(config_file: Option<&str>) -> Result<Config> {
    let config = if let Some(config_file) = config_file {
        let path = PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        Config::load_from_path(&path)?
    } else {
        debug!("Loading config from default location");
        Config::load()?
    };
    Ok(config)
}

async fn execute(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config_file.as_deref())?;
    let profile = config.resolve_profile(cli.profile.as_deref())?;

    let invocation = Invocation::from_args(&cli.command_args(profile))?;
    info!(
        "Using management service {}",
        invocation.connection.server_url
    );
    let client = HttpManageClient::new(&invocation.connection)?;

    let (spinner, on_progress) = wait::init_spinner(cli.output);
    let start = std::time::Instant::now();
    let result = dispatch(
        &client,
        &invocation.command,
        invocation.wait.as_ref(),
        Some(on_progress),
    )
    .await;
    spinner.finish_and_clear();
    debug!(
        "Operation {} finished in {:?}",
        invocation.command.operation(),
        start.elapsed()
    );

    let output = result.map_err(CatalogCtlError::from)?;
    output::print_operation_output(&output, cli.output)?;
    Ok(())
}
