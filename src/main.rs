//! `radiograb` CLI - Resolve radio stream URLs and record websocket streams

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use radiograb::{extractor, relay, FetchClient, Protocol};

#[derive(Parser)]
#[command(name = "radiograb")]
#[command(about = "Resolve and record internet-radio streams")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a station or episode URL into a stream descriptor
    Resolve {
        /// Station or episode URL
        url: String,

        /// Print the full descriptor as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Record a resolved stream to a local file
    Record {
        /// Station URL
        url: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { url, json } => {
            cmd_resolve(&url, json).await?;
        }
        Commands::Record { url, output } => {
            cmd_record(&url, &output).await?;
        }
    }

    Ok(())
}

async fn cmd_resolve(url: &str, json: bool) -> Result<()> {
    let client = FetchClient::new()?;
    let descriptor = extractor::resolve(&client, url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        return Ok(());
    }

    println!("🎙  {}", descriptor.title);
    println!("   id:       {}", descriptor.id);
    if let Some(description) = &descriptor.description {
        println!("   about:    {description}");
    }
    if !descriptor.tags.is_empty() {
        println!("   tags:     {}", descriptor.tags.join(", "));
    }
    println!("   status:   {:?}", descriptor.live_status);
    if let Some(stream_url) = &descriptor.url {
        println!("   stream:   {stream_url}");
    }
    if let Some(best) = descriptor.best_format() {
        println!("   best:     {} ({})", best.format_id, best.url);
    }
    for format in &descriptor.formats {
        println!(
            "   format:   {:12} quality={:+} preference={:+}{}",
            format.format_id,
            format.quality,
            format.preference,
            format
                .note
                .as_deref()
                .map(|note| format!(" [{note}]"))
                .unwrap_or_default()
        );
    }

    Ok(())
}

async fn cmd_record(url: &str, output: &Path) -> Result<()> {
    let client = FetchClient::new()?;
    let descriptor = extractor::resolve(&client, url).await?;

    match descriptor.protocol {
        Protocol::Fmplapla => {
            let stream_url = descriptor
                .url
                .context("descriptor carries no stream location")?;
            let token = descriptor
                .token
                .context("descriptor carries no stream token")?;

            let mut file = tokio::fs::File::create(output)
                .await
                .with_context(|| format!("failed to create {}", output.display()))?;

            println!("⏺  Recording {} → {}", descriptor.title, output.display());
            println!("   (stop with Ctrl-C; the stream is live and unbounded)");

            let written = relay::record(&stream_url, &token, &HashMap::new(), &mut file).await?;
            println!("✅ Wrote {written} bytes");
        }
        Protocol::Https | Protocol::Hls => {
            // Progressive and HLS playback belong to an external player.
            let target = descriptor
                .best_format()
                .map(|format| format.url.clone())
                .or(descriptor.url)
                .context("descriptor carries no playable URL")?;
            println!("ℹ️  {} is not a websocket stream", descriptor.title);
            println!("   Play or download it directly: {target}");
        }
    }

    Ok(())
}
