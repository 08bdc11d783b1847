use crate::commands::SourceArgs;
use crate::output;
use anyhow::{Result, bail};
use clap::Args;
use strata_core::flatten::subtree;

#[derive(Args)]
pub struct GetArgs {
    #[arg(help = "Dotted key, e.g. server.port or tags[0]")]
    pub key: String,

    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub async fn run(sources: SourceArgs, args: GetArgs) -> Result<()> {
    let cfg = sources.build().await?;

    if let Some(value) = cfg.get(&args.key) {
        if args.json {
            println!("{}", serde_json::to_string(&value)?);
        } else {
            println!("{value}");
        }
        return Ok(());
    }

    // Not a leaf: print the subtree below it, if any.
    let Some(nested) = subtree(&cfg.all(), &args.key)? else {
        output::hint("use `strata dump` to list every resolved key");
        bail!("key `{}` not found", args.key);
    };
    if args.json {
        println!("{}", serde_json::to_string(&nested)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&nested)?);
    }
    Ok(())
}
