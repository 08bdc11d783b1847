use crate::commands::SourceArgs;
use crate::output;
use adapters::JsonSource;
use anyhow::{Context, Result};
use clap::Args;
use config::{Configurable, Writable};
use std::path::PathBuf;

#[derive(Args)]
pub struct SaveArgs {
    #[arg(help = "Destination JSON file (created with owner-only permissions)")]
    pub output: PathBuf,

    #[arg(long, value_name = "NS", help = "Only keys under NS, relative to it")]
    pub scope: Option<String>
}

pub async fn run(sources: SourceArgs, args: SaveArgs) -> Result<()> {
    let root = sources.build().await?;
    let cfg = match &args.scope {
        Some(scope) => root.sub(scope),
        None => root
    };

    let snapshot = cfg.all();
    let target = JsonSource::new(&args.output);
    target.reset(Some(&snapshot));
    target
        .save()
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    output::success(&format!(
        "Wrote {} keys to {}",
        snapshot.len(),
        args.output.display()
    ));
    Ok(())
}
