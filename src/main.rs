use chess3d::app;
use chess3d::io::cli::Cli;
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.format_timestamp(None).format_level(true).init();

    info!("chess3d {}", env!("CARGO_PKG_VERSION"));

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match app::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Render failed: {e}");
            ExitCode::FAILURE
        }
    }
}
