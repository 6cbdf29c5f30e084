//! acqproc - Command Line Entry Point
//!
//! Runs a stored pipeline description over one JSON data packet.
//!
//! ```text
//! acqproc <pipeline.{json,toml}> <packet.json> [output.json]
//! ```
//!
//! Without an output path the processed packet is written to stdout.

use acqproc_rs::{config::PipelineFile, pipeline::DataPacket};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(version, about = "Run an acquisition processing pipeline over one packet", long_about = None)]
struct Args {
    /// Pipeline description (.toml for TOML, JSON otherwise)
    pipeline: PathBuf,
    /// Raw data packet as JSON
    packet: PathBuf,
    /// Where to write the processed packet; stdout if omitted
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean packet
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,acqproc_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let file = PipelineFile::load(&args.pipeline)?;
    let mut pipeline = file.build_pipeline()?;

    let content = std::fs::read_to_string(&args.packet)
        .with_context(|| format!("Failed to read packet {:?}", args.packet))?;
    let packet: DataPacket = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse packet {:?}", args.packet))?;

    tracing::info!(
        "Running '{}' ({} nodes) on {} channels",
        file.name,
        pipeline.len(),
        packet.len()
    );
    let output = pipeline.run(packet)?;
    let rendered = serde_json::to_string_pretty(&output)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write output {:?}", path))?;
            tracing::info!("Wrote processed packet to {:?}", path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
