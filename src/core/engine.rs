use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::core::game::{Flow, Game};

const RENDER_INTERVAL: Duration = Duration::from_millis(33);

pub struct Engine<G: Game> {
    game: G,
}

impl<G: Game> Engine<G> {
    pub fn new(game: G) -> Self {
        Self { game }
    }

    /// Runs until the game asks to quit or the terminal event stream ends.
    pub async fn run(
        mut self,
        mut terminal: DefaultTerminal,
        mut inputs: mpsc::UnboundedReceiver<G::Input>,
    ) -> Result<G> {
        let mut keys = EventStream::new();
        let mut inputs_open = true;

        let mut tick_timer = tokio::time::interval(self.game.tick_rate());
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut render_timer = tokio::time::interval(RENDER_INTERVAL);
        render_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(tick_rate = ?self.game.tick_rate(), "engine loop started");

        loop {
            tokio::select! {
                // 1. KEYS: menu commands and the pose simulator
                maybe_event = keys.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if self.game.handle_key(key, Instant::now()) == Flow::Quit {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("failed to read terminal event"),
                    None => break,
                },

                // 2. INPUT: frames from the external producer
                input = inputs.recv(), if inputs_open => match input {
                    Some(input) => self.game.handle_input(input, Instant::now()),
                    None => {
                        debug!("input source closed");
                        inputs_open = false;
                    }
                },

                // 3. TICK: simulation heartbeat
                _ = tick_timer.tick() => {
                    self.game.on_tick(Instant::now());
                }

                // 4. RENDER
                _ = render_timer.tick() => {
                    terminal.draw(|f| self.game.render(f))?;
                }
            }
        }

        info!("engine loop stopped");
        Ok(self.game)
    }
}
