mod cli;
mod config;
mod db;
mod error;
mod pipeline;
mod sheet;

use anyhow::Result;
use clap::Parser;

use cli::commands::{inspect::handle_inspect_command, load::handle_load_command};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Load(args) => handle_load_command(args).await,
        Commands::Inspect(args) => handle_inspect_command(args).await,
    }
}

/// `RUST_LOG` wins; otherwise `-v` flags pick the level
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
