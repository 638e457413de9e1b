use pginit_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    logging::init_logging();

    // Parse CLI (or environment) and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("pginit error: {:#}", err);
        std::process::exit(1);
    }
}
