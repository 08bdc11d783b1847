use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Get(args) => commands::get::run(cli.sources, args).await,
        Commands::Dump(args) => commands::dump::run(cli.sources, args).await,
        Commands::Save(args) => commands::save::run(cli.sources, args).await,
        Commands::Sources(args) => commands::sources::run(cli.sources, args).await
    }
}
