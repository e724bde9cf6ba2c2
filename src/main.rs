//! Kibitzer CLI entry point.

use clap::Parser;

use kibitzer::cli::commands::replay::ReplayOptions;
use kibitzer::cli::{handle_error, load_config, Cli, Commands};
use kibitzer::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Commands print to stdout, so logging is only installed for replay runs.
    let _logger = match &cli.command {
        Commands::Replay { .. } => match load_config(cli.config.as_deref()) {
            Ok(config) => LoggerImpl::init(&config.logging).ok(),
            Err(err) => handle_error(err, cli.json),
        },
        Commands::Config | Commands::Validate { .. } => None,
    };

    let result = match &cli.command {
        Commands::Config => kibitzer::cli::commands::config::execute(cli.config.as_deref(), cli.json).await,
        Commands::Validate { file } => kibitzer::cli::commands::validate::execute(file, cli.json).await,
        Commands::Replay {
            file,
            multi_pv,
            depth,
            nack,
            no_delay,
        } => {
            let options = ReplayOptions {
                multi_pv: *multi_pv,
                depth: *depth,
                nack: *nack,
                no_delay: *no_delay,
            };
            kibitzer::cli::commands::replay::execute(file, options, cli.config.as_deref(), cli.json).await
        }
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
