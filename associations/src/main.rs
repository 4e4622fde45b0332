//! Associations Main Entry Point
//!
//! Runs one maintenance command against the associations database:
//! migrations, an orphan sweep, a ranking or the vote kind listing.

use associations::commands::{run, run_offline, run_until_shutdown};
use associations::{AppError, Command, Dependencies, LogFormat, Settings};
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("associations=info,associations_service=info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .init();
        }
    }

    info!(
        service_name = "associations",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
}

async fn execute(command: &Command) -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    if !command.needs_database() {
        return run_offline(command, &settings);
    }

    let dependencies = Dependencies::new(&settings).await?;
    info!(command = ?command, "Dependencies initialized");

    let shutdown = async {
        // Without a signal handler the command runs to completion.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    run_until_shutdown(run(command, &dependencies), shutdown).await
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    init_tracing(LogFormat::from_env());

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            error!(error = %e, "Invalid command line");
            return Err(e);
        }
    };

    match execute(&command).await {
        Ok(()) => {
            info!(command = ?command, "Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, command = ?command, "Command failed");
            Err(e)
        }
    }
}
