//! Runtime configuration. Gameplay constants live next to the code that
//! uses them; only the arena shape, pacing and session options are here.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::arena::entities::Arena;

/// Stored and displayed; it does not change any gameplay numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Menu cycling order: easy, medium, hard, then back to easy.
    pub fn next(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub tick_ms: u64,
    pub difficulty: Difficulty,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            tick_ms: 16,
            difficulty: Difficulty::Medium,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Spawn ranges are inset from the edges, so tiny arenas are refused.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 100.0 && self.width.is_finite(),
            "arena width must be greater than 100, got {}",
            self.width
        );
        ensure!(
            self.height > 150.0 && self.height.is_finite(),
            "arena height must be greater than 150, got {}",
            self.height
        );
        ensure!(self.tick_ms > 0, "tick interval must be at least 1 ms");
        Ok(())
    }

    pub fn arena(&self) -> Arena {
        Arena { width: self.width, height: self.height }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
