use std::process::ExitCode;

use clap::Parser;

use dm_presence::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = dm_presence::logging::init_logging(cli.verbose);

    match dm_presence::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
