//! Authoritative game state and the rules that advance it.
//!
//! The host owns the cadence: it calls [`GameSimulation::tick`] once per
//! frame and feeds gestures in between with [`GameSimulation::apply_gesture`]
//! or [`GameSimulation::observe_frame`]. Both take `&mut self`, so a gesture
//! delivered before a tick is always visible to that tick.

use std::time::{Duration, Instant};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use super::entities::{BonusKind, Direction, EntityManager, Player, Stance};
use super::events::{EventSink, GameEvent};
use super::gesture::{classify, GestureLabel};
use super::landmarks::HandFrame;
use super::missions::{MissionKind, MissionTracker};
use crate::config::{Difficulty, GameConfig};

/// Minimum spacing between two accepted gestures.
pub const GESTURE_COOLDOWN: Duration = Duration::from_millis(500);

pub const MAX_LIVES: u8 = 3;
pub const INITIAL_ENEMIES: usize = 5;
pub const INITIAL_BONUSES: usize = 3;

pub const ATTACK_RADIUS: f32 = 100.0;
pub const POINTS_PER_KILL: u32 = 10;
/// Below this many survivors an attack calls in reinforcements.
pub const ENEMY_LOW_WATER: usize = 3;
pub const ENEMY_REINFORCEMENTS: usize = 2;

pub const POINTS_BONUS_VALUE: u32 = 50;
pub const BONUS_LOW_WATER: usize = 2;
pub const BONUS_SPAWN_CHANCE: f64 = 0.01;

pub const SCORE_PER_LEVEL: u32 = 100;
pub const LEVEL_SPEED_FACTOR: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Menu,
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Restart,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub score: u32,
    pub lives: u8,
    pub level: u32,
    pub phase: Phase,
    pub current_gesture: GestureLabel,
    pub difficulty: Difficulty,
    pub player: Player,
    pub entities: EntityManager,
    pub missions: MissionTracker,
}

impl GameState {
    fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let arena = config.arena();
        let (x, y) = arena.center();
        let mut entities = EntityManager::new(arena);
        entities.spawn_enemies(INITIAL_ENEMIES, rng);
        entities.spawn_bonuses(INITIAL_BONUSES, rng);

        Self {
            score: 0,
            lives: MAX_LIVES,
            level: 1,
            phase: Phase::Menu,
            current_gesture: GestureLabel::None,
            difficulty: config.difficulty,
            player: Player::new(x, y),
            entities,
            missions: MissionTracker::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }
}

pub struct GameSimulation {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
    events: EventSink,
    last_gesture_at: Option<Instant>,
}

impl GameSimulation {
    /// Fails if the config describes an arena too small to spawn into.
    pub fn new(config: GameConfig, events: EventSink) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let state = GameState::new(&config, &mut rng);
        Ok(Self {
            config,
            state,
            rng,
            events,
            last_gesture_at: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Drives the phase machine. Returns false when the command does not
    /// apply to the current phase.
    pub fn command(&mut self, command: Command) -> bool {
        let next = match (command, self.state.phase) {
            (Command::Start, Phase::Menu) => {
                info!(difficulty = %self.state.difficulty, "game started");
                self.emit(GameEvent::Started { difficulty: self.state.difficulty });
                Phase::Running
            }
            (Command::Pause, Phase::Running) => {
                self.emit(GameEvent::Paused);
                Phase::Paused
            }
            (Command::Resume, Phase::Paused) => {
                self.emit(GameEvent::Resumed);
                Phase::Running
            }
            (Command::Restart, _) => {
                self.restart();
                return true;
            }
            (command, phase) => {
                debug!(?command, ?phase, "command ignored");
                return false;
            }
        };
        self.state.phase = next;
        true
    }

    /// Only the menu may change difficulty. The choice survives restarts.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.state.phase != Phase::Menu {
            return false;
        }
        info!(%difficulty, "difficulty changed");
        self.config.difficulty = difficulty;
        self.state.difficulty = difficulty;
        self.emit(GameEvent::DifficultyChanged { difficulty });
        true
    }

    fn restart(&mut self) {
        info!(score = self.state.score, level = self.state.level, "restarting session");
        self.state = GameState::new(&self.config, &mut self.rng);
        self.last_gesture_at = None;
        self.emit(GameEvent::Restarted);
    }

    /// Classifies a landmark frame and applies the result.
    pub fn observe_frame(&mut self, frame: &HandFrame, now: Instant) -> bool {
        self.apply_gesture(classify(frame), now)
    }

    /// Applies a gesture unless it repeats the current one or arrives inside
    /// the cooldown window. Returns whether it was accepted.
    pub fn apply_gesture(&mut self, gesture: GestureLabel, now: Instant) -> bool {
        if self.state.phase != Phase::Running
            || gesture == GestureLabel::None
            || gesture == self.state.current_gesture
        {
            return false;
        }
        if let Some(last) = self.last_gesture_at {
            if now.saturating_duration_since(last) < GESTURE_COOLDOWN {
                debug!(gesture = gesture.as_str(), "gesture inside cooldown");
                return false;
            }
        }

        debug!(gesture = gesture.as_str(), action = gesture.action(), "gesture accepted");
        self.state.current_gesture = gesture;
        self.last_gesture_at = Some(now);
        self.emit(GameEvent::GestureRecognized { gesture });

        let arena = self.config.arena();
        match gesture {
            GestureLabel::Fist => {
                self.state.player.stance = Stance::Attacking;
                self.attack();
            }
            GestureLabel::Palm => {
                self.state.player.stance = Stance::Defending;
                self.defend();
            }
            GestureLabel::OneFinger => self.state.player.step(Direction::Up, arena),
            GestureLabel::TwoFingers => self.state.player.step(Direction::Right, arena),
            GestureLabel::ThreeFingers => self.state.player.step(Direction::Left, arena),
            GestureLabel::FiveFingers => self.state.player.step(Direction::Down, arena),
            GestureLabel::None => {}
        }
        true
    }

    /// Destroys every enemy within reach of the player.
    fn attack(&mut self) {
        let Player { x, y, .. } = self.state.player;
        let destroyed = self.state.entities.remove_enemies_near(x, y, ATTACK_RADIUS);
        for _ in 0..destroyed {
            self.add_score(POINTS_PER_KILL);
            self.emit(GameEvent::EnemyDestroyed { points: POINTS_PER_KILL });
            self.record_mission(MissionKind::DestroyEnemies);
        }
        if destroyed > 0 {
            debug!(destroyed, score = self.state.score, "attack landed");
        }

        if self.state.entities.enemies().len() < ENEMY_LOW_WATER {
            self.state.entities.spawn_enemies(ENEMY_REINFORCEMENTS, &mut self.rng);
        }
    }

    /// Damage is suppressed by the stance itself; this only reports it.
    fn defend(&mut self) {
        self.emit(GameEvent::DefenseRaised);
    }

    /// Advances one frame. Does nothing unless the game is running.
    pub fn tick(&mut self) {
        if self.state.phase != Phase::Running {
            return;
        }

        let Player { x, y, .. } = self.state.player;
        self.state.entities.advance_enemies(x, y);

        if !self.resolve_enemy_contacts() {
            return;
        }

        let collected = self.state.entities.collect_bonuses(&self.state.player.bounds());
        for kind in collected {
            self.apply_bonus(kind);
        }
        self.state.entities.remove_collected_bonuses();

        if self.state.entities.bonuses().len() < BONUS_LOW_WATER
            && self.rng.random_bool(BONUS_SPAWN_CHANCE)
        {
            self.state.entities.spawn_bonuses(1, &mut self.rng);
        }

        self.check_level_up();
    }

    /// Returns false if the player ran out of lives.
    fn resolve_enemy_contacts(&mut self) -> bool {
        if self.state.player.is_defending() {
            return true;
        }

        let player = self.state.player.bounds();
        for index in 0..self.state.entities.enemies().len() {
            if !player.overlaps(&self.state.entities.enemies()[index].bounds()) {
                continue;
            }
            self.state.lives = self.state.lives.saturating_sub(1);
            self.state.entities.relocate_enemy(index, &mut self.rng);
            self.emit(GameEvent::LifeLost { lives: self.state.lives });

            if self.state.lives == 0 {
                self.game_over();
                return false;
            }
        }
        true
    }

    fn apply_bonus(&mut self, kind: BonusKind) {
        let mut points = 0;
        match kind {
            BonusKind::Health => self.state.lives = (self.state.lives + 1).min(MAX_LIVES),
            BonusKind::Points => {
                points = POINTS_BONUS_VALUE;
                self.add_score(points);
            }
            BonusKind::Speed => {}
        }
        self.emit(GameEvent::BonusCollected { kind, points, lives: self.state.lives });
        if kind == BonusKind::Points {
            self.record_mission(MissionKind::CollectBonuses);
        }
    }

    fn record_mission(&mut self, kind: MissionKind) {
        if let Some(reward) = self.state.missions.record(kind) {
            info!(mission = kind.title(), reward, "mission completed");
            self.add_score(reward);
            self.emit(GameEvent::MissionCompleted { mission: kind, reward });
        }
    }

    fn check_level_up(&mut self) {
        if self.state.score < self.state.level.saturating_mul(SCORE_PER_LEVEL) {
            return;
        }
        self.state.level += 1;
        self.state.entities.scale_enemy_speed(LEVEL_SPEED_FACTOR);
        let spawned = self.state.level as usize + 2;
        self.state.entities.spawn_enemies(spawned, &mut self.rng);

        info!(level = self.state.level, spawned, "level up");
        self.emit(GameEvent::LevelUp { level: self.state.level, spawned });
    }

    fn game_over(&mut self) {
        self.state.phase = Phase::GameOver;
        info!(score = self.state.score, level = self.state.level, "game over");
        self.emit(GameEvent::GameOver { score: self.state.score, level: self.state.level });
    }

    fn add_score(&mut self, points: u32) {
        self.state.score = self.state.score.saturating_add(points);
    }

    fn emit(&self, event: GameEvent) {
        self.events.emit(event);
    }
}
