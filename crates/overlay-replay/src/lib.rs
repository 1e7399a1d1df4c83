//! Face Overlay Replay
//!
//! Drives the face tracker from a recorded detector event stream and writes
//! the resulting overlay draw lists, one JSON document per redraw.

pub mod pipeline;
pub mod settings;

pub use pipeline::{parse_event, run, FrameOutput, ReplayStats};
pub use settings::{AppConfig, LogFormat};

use anyhow::Context;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging on stderr; stdout carries the draw lists
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let level = config.level()?;

    match config.log_format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(true)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .json()
                .with_max_level(level)
                .with_target(true)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    }
    .context("Failed to set tracing subscriber")
}
