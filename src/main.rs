use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use framegrab::{Endpoint, GrabConfig};

#[derive(Parser)]
#[command(
    name = "framegrab",
    version,
    about = "Grab one length-prefixed frame from a TCP server and save it"
)]
struct Args {
    /// Server address as host:port (default 127.0.0.1:8080)
    #[arg(value_name = "ENDPOINT")]
    endpoint_pos: Option<Endpoint>,

    /// Server address as host:port, same as the positional form
    #[arg(long = "endpoint", value_name = "HOST:PORT", conflicts_with = "endpoint_pos")]
    endpoint: Option<Endpoint>,

    /// Output file, or '-' for stdout (default frame.jpg)
    #[arg(short, long)]
    output: Option<String>,

    /// JSON config file applied before environment and flags
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reject frames declaring more than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_payload: Option<u32>,

    /// Give up if the whole transfer takes longer than this
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Fail instead of saving a truncated frame
    #[arg(long)]
    strict: bool,
}

impl Args {
    /// Layer file, environment (via `env`) and flags into one config.
    fn into_config<F>(self, env: F) -> Result<GrabConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => GrabConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => GrabConfig::default(),
        };
        config
            .apply_env_from(env)
            .context("Invalid FRAMEGRAB_* environment")?;

        if let Some(endpoint) = self.endpoint.or(self.endpoint_pos) {
            config.endpoint = endpoint;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.max_payload.is_some() {
            config.max_payload = self.max_payload;
        }
        if self.timeout_ms.is_some() {
            config.timeout_ms = self.timeout_ms;
        }
        if self.strict {
            config.strict = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so '-o -' output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Args::parse().into_config(|key| std::env::var(key).ok())?;
    let sink = config.sink();

    let frame = config
        .receiver()
        .receive()
        .await
        .with_context(|| format!("Failed to receive frame from {}", config.endpoint))?;

    let written = sink.write(frame.payload()).await?;

    tracing::info!(
        "Saved {} of {} bytes from {} to {}",
        written,
        frame.declared_length,
        config.endpoint,
        sink
    );

    Ok(())
}
