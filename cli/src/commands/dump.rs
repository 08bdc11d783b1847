use crate::commands::SourceArgs;
use anyhow::Result;
use clap::Args;
use strata_core::flatten::unflatten;

#[derive(Args)]
pub struct DumpArgs {
    #[arg(long, help = "Output as JSON (flat keys)")]
    pub json: bool,

    #[arg(long, help = "Rebuild nested objects and arrays (implies --json)")]
    pub nested: bool,

    #[arg(long, value_name = "NS", help = "Only keys under NS, relative to it")]
    pub scope: Option<String>
}

pub async fn run(sources: SourceArgs, args: DumpArgs) -> Result<()> {
    let root = sources.build().await?;
    let cfg = match &args.scope {
        Some(scope) => root.sub(scope),
        None => root
    };

    if args.nested {
        println!("{}", serde_json::to_string_pretty(&unflatten(&cfg.all())?)?);
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&cfg.all())?);
    } else {
        let dump = cfg.debug_dump();
        if !dump.is_empty() {
            println!("{dump}");
        }
    }
    Ok(())
}
