use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn, Level};

use crate::arena::app::ArenaApp;
use crate::config::{Difficulty, GameConfig};
use crate::core::engine::Engine;
use crate::core::source::spawn_frame_source;

#[derive(Parser, Debug)]
#[command(name = "gesture_arena")]
#[command(about = "✋ Fight arcade enemies with hand gestures, in your terminal")]
#[command(version)]
pub struct Cli {
    /// JSON config file (missing fields use defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Landmark frames as JSON lines, or "-" for stdin
    #[arg(short, long)]
    pub landmarks: Option<String>,

    /// Arena width in game units
    #[arg(long)]
    pub width: Option<f32>,

    /// Arena height in game units
    #[arg(long)]
    pub height: Option<f32>,

    /// Milliseconds between simulation ticks
    #[arg(long)]
    pub tick_ms: Option<u64>,

    #[arg(short, long, value_enum)]
    pub difficulty: Option<Difficulty>,

    /// Seed for a reproducible session
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where tracing output goes (the terminal is taken by the UI)
    #[arg(long, default_value = "gesture_arena.log")]
    pub log_file: PathBuf,

    #[arg(long, default_value = "info")]
    pub log_level: Level,
}

impl Cli {
    /// Config file first, then command-line overrides.
    pub fn resolve_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(path: &Path, level: Level) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_file, cli.log_level)?;
    let config = cli.resolve_config()?;
    info!(?config, "starting gesture arena");

    // Without a landmark source the sender drops here and only keys drive play.
    let (frame_tx, frame_rx) = mpsc::unbounded_channel();
    let source = match &cli.landmarks {
        Some(path) => Some(spawn_frame_source(path, frame_tx).await?),
        None => None,
    };

    let app = ArenaApp::new(config)?;
    let terminal = ratatui::init();
    let result = Engine::new(app).run(terminal, frame_rx).await;
    ratatui::restore();

    if let Some(source) = source {
        if let Err(e) = source.stop().await {
            warn!(error = %format!("{e:#}"), "landmark source failed");
        }
    }

    let app = result?;
    let state = app.simulation().state();
    println!("Final score: {}  Level: {}", state.score, state.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "gesture_arena",
            "--width",
            "1024",
            "--difficulty",
            "hard",
            "--seed",
            "7",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.width, 1024.0);
        assert_eq!(config.height, 600.0);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.seed, Some(7));
        assert_eq!(cli.log_level, Level::INFO);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let cli = Cli::parse_from(["gesture_arena", "--height", "20"]);
        assert!(cli.resolve_config().is_err());
    }
}
