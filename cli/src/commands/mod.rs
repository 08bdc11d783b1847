pub mod dump;
pub mod get;
pub mod save;
pub mod sources;

use clap::{Parser, Subcommand};
pub use sources::SourceArgs;

#[derive(Parser)]
#[command(
    name = "strata",
    author,
    version,
    about = "Strata - layered configuration inspector",
    long_about = "Resolve configuration from JSON files, URLs, environment variables and \
                  explicit overrides.\n\nPrecedence: --set > env > --url > --file > --default. \
                  Later --file and --url arguments win over earlier ones."
)]
pub struct Cli {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Print the resolved value of a key")]
    Get(get::GetArgs),

    #[command(about = "Print every resolved key")]
    Dump(dump::DumpArgs),

    #[command(about = "Write the resolved configuration to a JSON file")]
    Save(save::SaveArgs),

    #[command(about = "List configured sources and whether they load")]
    Sources(sources::SourcesArgs)
}
