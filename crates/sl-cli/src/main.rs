//! sluice CLI - remote ERP sync and derived-layer builds

use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use commands::common::ExitCode;
use commands::{backfill, metadata, model, refresh, schema, snapshot};

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            // Usage errors exit with 1 rather than clap's 2
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        Commands::Metadata(args) => metadata::execute(args, &cli.global).await,
        Commands::Backfill(args) => backfill::execute(args, &cli.global).await,
        Commands::Snapshot(args) => snapshot::execute(args, &cli.global).await,
        Commands::Refresh => refresh::execute(&cli.global).await,
        Commands::Schema(args) => schema::execute(args, &cli.global).await,
        Commands::Model(args) => model::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
