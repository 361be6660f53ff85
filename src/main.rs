use std::{io, process};

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tetromino_logo::{
    engine::{Engine, source::SourceTimeline},
    player::Player,
    renderer::Renderer,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    init_tracing();

    if std::env::args().len() > 1 {
        bail!("tetromino-logo takes no arguments\n\nUsage:\n  tetromino-logo");
    }

    let source =
        SourceTimeline::reference().context("Failed to parse the embedded logo timeline")?;
    let timeline = source.build().context("Invalid logo timeline")?;
    let config = source.config;

    let compiled = Engine::compile(timeline, &config)?;
    let contract = Renderer::contract_for(&config);
    let mut recording = Renderer::render(&compiled.scenes, contract, config.frame_rate);
    recording.markers = compiled.markers;

    info!(
        frames = recording.frames.len(),
        width = contract.width,
        height = contract.height,
        "animation rendered"
    );

    let mut player = Player::new(recording);
    player.play()
}

/// Log to stderr, filtered by `RUST_LOG` (warnings only by default).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}
