//! Terminal host for the arena: key bindings, the pose simulator and the
//! event log, wired to the engine through [`Game`].

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::info;

use super::events::{event_channel, GameEvent};
use super::gesture::{canonical_extents, GestureLabel};
use super::landmarks::HandFrame;
use super::log::EventLog;
use super::renderer::{ArenaRenderer, ArenaView};
use super::simulation::{Command, GameSimulation, Phase};
use crate::config::GameConfig;
use crate::core::game::{Flow, Game};
use crate::core::renderer::Renderer;
use crate::core::source::FrameInput;

pub struct ArenaApp {
    sim: GameSimulation,
    events: mpsc::UnboundedReceiver<GameEvent>,
    log: EventLog,
    renderer: ArenaRenderer,
    show_help: bool,
    hand_visible: bool,
    /// `Some(resume)` while asking to quit; `resume` is set when the prompt
    /// paused a running game.
    quit_prompt: Option<bool>,
}

impl ArenaApp {
    pub fn new(config: GameConfig) -> Result<Self> {
        let (sink, events) = event_channel();
        let sim = GameSimulation::new(config, sink)?;
        let now = Instant::now();
        let mut log = EventLog::new(now);
        log.push_message("Press Enter to start, H for controls", now);
        Ok(Self {
            sim,
            events,
            log,
            renderer: ArenaRenderer,
            show_help: false,
            hand_visible: false,
            quit_prompt: None,
        })
    }

    pub fn simulation(&self) -> &GameSimulation {
        &self.sim
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn is_confirming_quit(&self) -> bool {
        self.quit_prompt.is_some()
    }

    /// Y (or a second Q) quits; anything else dismisses the prompt.
    fn answer_quit_prompt(&mut self, key: KeyCode, resume: bool, now: Instant) -> Flow {
        if matches!(key, KeyCode::Char('y' | 'Y' | 'q' | 'Q')) {
            return Flow::Quit;
        }
        self.quit_prompt = None;
        if resume {
            self.sim.command(Command::Resume);
            self.drain_events(now);
        }
        Flow::Continue
    }

    /// Moves pending simulation events into the on-screen log.
    fn drain_events(&mut self, now: Instant) {
        while let Ok(event) = self.events.try_recv() {
            info!(target: "gesture_arena::events", "{event}");
            self.log.push(&event, now);
        }
    }

    /// Keys 1-5 pose a synthetic hand and go through the classifier like a
    /// real frame. FiveFingers has no distinct pose, so 6 sends the label.
    fn simulate_pose(&mut self, digit: char, now: Instant) {
        let label = match digit {
            '1' => GestureLabel::Fist,
            '2' => GestureLabel::Palm,
            '3' => GestureLabel::OneFinger,
            '4' => GestureLabel::TwoFingers,
            '5' => GestureLabel::ThreeFingers,
            '6' => {
                self.sim.apply_gesture(GestureLabel::FiveFingers, now);
                return;
            }
            _ => return,
        };
        if let Some(extents) = canonical_extents(label) {
            self.sim.observe_frame(&HandFrame::from_finger_extents(extents), now);
        }
    }
}

impl Game for ArenaApp {
    type Input = FrameInput;

    fn tick_rate(&self) -> Duration {
        self.sim.config().tick_rate()
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        if let Some(resume) = self.quit_prompt {
            return self.answer_quit_prompt(key.code, resume, now);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                let paused = self.sim.command(Command::Pause);
                self.quit_prompt = Some(paused);
            }
            KeyCode::Enter => {
                self.sim.command(Command::Start);
            }
            KeyCode::Char(' ') => {
                let command = if self.sim.state().phase == Phase::Paused {
                    Command::Resume
                } else {
                    Command::Pause
                };
                self.sim.command(command);
            }
            KeyCode::Esc => {
                self.sim.command(Command::Pause);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.sim.command(Command::Restart);
            }
            KeyCode::Char('h') | KeyCode::Char('H') => self.show_help = !self.show_help,
            KeyCode::Char('d') | KeyCode::Char('D') => {
                let next = self.sim.state().difficulty.next();
                self.sim.set_difficulty(next);
            }
            KeyCode::Char(digit @ '1'..='6') => self.simulate_pose(digit, now),
            _ => {}
        }
        self.drain_events(now);
        Flow::Continue
    }

    fn handle_input(&mut self, input: FrameInput, now: Instant) {
        self.hand_visible = input.is_some();
        if let Some(frame) = input {
            self.sim.observe_frame(&frame, now);
            self.drain_events(now);
        }
    }

    fn on_tick(&mut self, now: Instant) {
        self.sim.tick();
        self.drain_events(now);
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        let view = ArenaView {
            state: self.sim.state(),
            log: &self.log,
            show_help: self.show_help,
            hand_visible: self.hand_visible,
            confirm_quit: self.quit_prompt.is_some(),
        };
        self.renderer.render(frame, &view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;
    use crossterm::event::KeyEventKind;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn app() -> ArenaApp {
        ArenaApp::new(GameConfig { seed: Some(11), ..GameConfig::default() }).unwrap()
    }

    #[test]
    fn keys_drive_the_phase_machine() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(press(KeyCode::Enter), now);
        assert_eq!(app.simulation().state().phase, Phase::Running);
        app.handle_key(press(KeyCode::Char(' ')), now);
        assert_eq!(app.simulation().state().phase, Phase::Paused);
        app.handle_key(press(KeyCode::Char(' ')), now);
        assert_eq!(app.simulation().state().phase, Phase::Running);
        app.handle_key(press(KeyCode::Esc), now);
        assert_eq!(app.simulation().state().phase, Phase::Paused);
        app.handle_key(press(KeyCode::Char('r')), now);
        assert_eq!(app.simulation().state().phase, Phase::Menu);
    }

    #[test]
    fn quitting_asks_first() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(press(KeyCode::Enter), now);

        assert_eq!(app.handle_key(press(KeyCode::Char('q')), now), Flow::Continue);
        assert!(app.is_confirming_quit());
        assert_eq!(app.simulation().state().phase, Phase::Paused);

        // declining resumes the game it interrupted
        assert_eq!(app.handle_key(press(KeyCode::Char('n')), now), Flow::Continue);
        assert!(!app.is_confirming_quit());
        assert_eq!(app.simulation().state().phase, Phase::Running);

        app.handle_key(press(KeyCode::Char('q')), now);
        assert_eq!(app.handle_key(press(KeyCode::Char('y')), now), Flow::Quit);
    }

    #[test]
    fn declining_quit_from_menu_stays_in_menu() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(press(KeyCode::Char('Q')), now);
        app.handle_key(press(KeyCode::Esc), now);
        assert!(!app.is_confirming_quit());
        assert_eq!(app.simulation().state().phase, Phase::Menu);
    }

    #[test]
    fn ctrl_c_quits_without_asking() {
        let mut app = app();
        let key = KeyEvent::new_with_kind(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        );
        assert_eq!(app.handle_key(key, Instant::now()), Flow::Quit);
    }

    #[test]
    fn d_cycles_difficulty_in_menu() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(press(KeyCode::Char('d')), now);
        assert_eq!(app.simulation().state().difficulty, Difficulty::Hard);
        assert_eq!(app.log().entries().last().unwrap().message, "Difficulty: hard");

        app.handle_key(press(KeyCode::Enter), now);
        app.handle_key(press(KeyCode::Char('d')), now);
        assert_eq!(app.simulation().state().difficulty, Difficulty::Hard);
    }

    #[test]
    fn digit_keys_simulate_poses() {
        let mut app = app();
        let t0 = Instant::now();
        app.handle_key(press(KeyCode::Enter), t0);
        app.handle_key(press(KeyCode::Char('3')), t0);
        assert_eq!(app.simulation().state().current_gesture, GestureLabel::OneFinger);
        assert_eq!(app.simulation().state().player.y, 285.0);

        app.handle_key(press(KeyCode::Char('6')), t0 + Duration::from_secs(1));
        assert_eq!(app.simulation().state().current_gesture, GestureLabel::FiveFingers);
        assert_eq!(app.simulation().state().player.y, 300.0);
    }

    #[test]
    fn events_reach_the_log() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(press(KeyCode::Enter), now);
        let last = app.log().entries().last().unwrap();
        assert_eq!(last.message, "Game started (medium)!");
    }

    #[test]
    fn absent_frames_do_nothing() {
        let mut app = app();
        let now = Instant::now();
        app.handle_key(press(KeyCode::Enter), now);
        app.handle_input(None, now);
        assert_eq!(app.simulation().state().current_gesture, GestureLabel::None);

        let palm = HandFrame::from_finger_extents(canonical_extents(GestureLabel::Palm).unwrap());
        app.handle_input(Some(palm), now);
        assert_eq!(app.simulation().state().current_gesture, GestureLabel::Palm);
    }
}
