/// Core game interface driven by the engine loop
use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;

/// What the engine should do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A game the [`Engine`](crate::core::engine::Engine) can host.
///
/// The engine owns the clock and calls in from a single task, so
/// implementations never see two callbacks at once.
pub trait Game {
    /// Out-of-band input from an external producer (a landmark detector).
    type Input: Send + 'static;

    /// How often `on_tick` fires.
    fn tick_rate(&self) -> Duration;

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow;

    fn handle_input(&mut self, input: Self::Input, now: Instant);

    fn on_tick(&mut self, now: Instant);

    fn render(&self, frame: &mut ratatui::Frame);
}
