use std::process::ExitCode;

use clap::Parser;
use gridyn_cli::{load_config, Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let level = match cli.log_level.map(Ok).unwrap_or_else(|| config.log_level()) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("error: setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Commands::Decode(args) => commands::decode::handle(args, &config),
        Commands::Convert(args) => commands::convert::handle(args, &config),
        Commands::Schemas { command } => commands::schemas::handle(command, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
