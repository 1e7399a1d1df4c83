//! Face Overlay Replay - Main Entry Point

use anyhow::Context;
use overlay_replay::{init_logging, run, AppConfig};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.input = Some(path.into());
    }

    init_logging(&config)?;

    info!("=== Face Overlay Replay v{} ===", env!("CARGO_PKG_VERSION"));

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &config.input {
        Some(path) => {
            info!("Reading detector events from {}", path.display());
            let file = File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => {
            info!("Reading detector events from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        }
    };

    let writer: Box<dyn AsyncWrite + Unpin + Send> = match &config.output {
        Some(path) => Box::new(
            File::create(path)
                .await
                .with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdout()),
    };

    let stats = run(&config, reader, writer).await?;
    info!(?stats, "Replay finished");

    Ok(())
}
