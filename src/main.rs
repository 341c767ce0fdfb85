// src/main.rs

use std::process::ExitCode;

use querydag::{cli, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("querydag: {err:#}");
        return ExitCode::FAILURE;
    }

    match querydag::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("querydag error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
