//! `vidlink` CLI - resolve post links into playable video URLs

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use vidlink::{load_config, load_config_from, Resolver, ResolverConfig, Source};

#[derive(Parser)]
#[command(name = "vidlink")]
#[command(about = "Resolve social post links into directly playable video URLs")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/vidlink/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a post URL to a video URL
    Resolve {
        /// Post URL
        url: String,

        /// Direct media URL already known for the post
        #[arg(long)]
        alt_url: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check (offline) whether a URL could be resolved
    Check {
        /// Post URL
        url: String,
    },

    /// List providers in priority order
    Providers,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    url: &'a str,
    alt_url: Option<&'a str>,
    resolved: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only results
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Commands::Resolve { url, alt_url, json } => cmd_resolve(&config, url, alt_url, json).await,
        Commands::Check { url } => cmd_check(&config, url),
        Commands::Providers => cmd_providers(&config),
    }
}

async fn cmd_resolve(
    config: &ResolverConfig,
    url: String,
    alt_url: Option<String>,
    json: bool,
) -> Result<ExitCode> {
    let resolver = Resolver::from_config(config)?;
    let source = Source { url, alt_url };
    let resolved = resolver.resolve(&source).await;

    if json {
        let output = ResolveOutput {
            url: &source.url,
            alt_url: source.alt_url(),
            resolved: resolved.as_deref(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if let Some(video) = &resolved {
        println!("{video}");
    } else {
        eprintln!("No video found for {}", source.url);
    }

    Ok(if resolved.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_check(config: &ResolverConfig, url: String) -> Result<ExitCode> {
    let resolver = Resolver::from_config(config)?;
    if resolver.can_resolve(&Source::new(url)) {
        println!("yes");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("no");
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_providers(config: &ResolverConfig) -> Result<ExitCode> {
    let resolver = Resolver::from_config(config)?;
    for name in resolver.names() {
        println!("{name}");
    }
    Ok(ExitCode::SUCCESS)
}
