use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use patch_dataset_builder::logging::setup_logging;

mod cli;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    if let Err(e) = setup_logging(&cli.log_dir) {
        eprintln!("Failed to set up logging in {:?}: {}", cli.log_dir, e);
        return ExitCode::FAILURE;
    }
    info!("Starting patch dataset builder");

    match cli::run(cli) {
        Ok(()) => {
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            // No rollback: files written before the failure stay on disk.
            error!("Run failed; output written so far is incomplete and must not be used");
            ExitCode::FAILURE
        }
    }
}
