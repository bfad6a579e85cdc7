pub mod cli;
pub mod config;

pub mod core {
	pub mod engine;
	pub mod game;
	pub mod renderer;
	pub mod source;
}

pub mod arena;

// Re-export for convenience
pub use crate::arena::app::ArenaApp;
pub use crate::arena::simulation::{Command, GameSimulation, GameState, Phase};
pub use crate::config::{Difficulty, GameConfig};
pub use crate::core::game::{Flow, Game};
