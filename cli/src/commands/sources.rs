use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use config::{Hierarchy, HierarchyBuilder};
use std::path::PathBuf;

/// Source selection shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[arg(
        long = "file",
        short = 'f',
        global = true,
        value_name = "PATH",
        help = "JSON file source (repeatable, later files win)"
    )]
    pub files: Vec<PathBuf>,

    #[arg(
        long = "url",
        global = true,
        value_name = "URL",
        help = "Remote JSON source fetched with GET (repeatable, later URLs win)"
    )]
    pub urls: Vec<String>,

    #[arg(long, global = true, help = "Read environment variables")]
    pub env: bool,

    #[arg(
        long,
        global = true,
        value_name = "PREFIX",
        help = "Strip PREFIX from environment variable names (implies --env)"
    )]
    pub env_prefix: Option<String>,

    #[arg(
        long = "namespace",
        short = 'n',
        global = true,
        value_name = "NS",
        help = "Treat NS_KEY / NS-KEY / NS:KEY env vars as NS.KEY (repeatable)"
    )]
    pub namespaces: Vec<String>,

    #[arg(
        long = "set",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Override a key (repeatable)"
    )]
    pub overrides: Vec<(String, String)>,

    #[arg(
        long = "default",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Fallback value for a key (repeatable)"
    )]
    pub defaults: Vec<(String, String)>,

    #[arg(long, global = true, help = "Fail when any source cannot be loaded")]
    pub strict: bool
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`"))
    }
}

impl SourceArgs {
    pub fn builder(&self) -> HierarchyBuilder {
        let mut builder = HierarchyBuilder::new();
        for path in &self.files {
            builder = builder.file(path.clone());
        }
        for url in &self.urls {
            builder = builder.url(url.clone());
        }
        if self.env || self.env_prefix.is_some() {
            builder = builder.env(self.env_prefix.clone().unwrap_or_default());
        }
        for ns in &self.namespaces {
            builder = builder.namespace(ns.clone());
        }
        for (key, value) in &self.overrides {
            builder = builder.set(key.clone(), value.clone());
        }
        for (key, value) in &self.defaults {
            builder = builder.set_default(key.clone(), value.clone());
        }
        builder
    }

    pub async fn build(&self) -> Result<Hierarchy> {
        if self.strict {
            return self
                .builder()
                .try_build()
                .await
                .context("Failed to load configuration");
        }
        Ok(self.builder().build().await)
    }
}

#[derive(Args)]
pub struct SourcesArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub async fn run(sources: SourceArgs, args: SourcesArgs) -> Result<()> {
    let cfg = sources.builder().assemble();

    let mut rows = Vec::new();
    for name in cfg.source_names() {
        let Some(source) = cfg.source(&name) else {
            continue;
        };
        let status = match source.load().await {
            Ok(()) => Ok(source.all().len()),
            Err(e) => Err(e.to_string())
        };
        rows.push((name, status));
    }

    if args.json {
        let output: Vec<serde_json::Value> = rows
            .iter()
            .map(|(name, status)| match status {
                Ok(keys) => serde_json::json!({ "name": name, "loaded": true, "keys": keys }),
                Err(e) => serde_json::json!({ "name": name, "loaded": false, "error": e })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if rows.is_empty() {
        output::hint("No sources configured; pass --file, --url or --env");
        return Ok(());
    }

    output::header("Sources (highest precedence first)");
    for (name, status) in rows {
        match status {
            Ok(keys) => println!("  {} {name} ({keys} keys)", "✓".green()),
            Err(e) => println!("  {} {name}: {}", "✗".red(), e.as_str().dimmed())
        }
    }
    Ok(())
}
