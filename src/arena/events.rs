//! Structured notifications from the simulation to whoever presents them.

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc;

use super::entities::BonusKind;
use super::gesture::GestureLabel;
use super::missions::MissionKind;
use crate::config::Difficulty;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Started { difficulty: Difficulty },
    Paused,
    Resumed,
    Restarted,
    DifficultyChanged { difficulty: Difficulty },
    GestureRecognized { gesture: GestureLabel },
    EnemyDestroyed { points: u32 },
    DefenseRaised,
    LifeLost { lives: u8 },
    BonusCollected { kind: BonusKind, points: u32, lives: u8 },
    MissionCompleted { mission: MissionKind, reward: u32 },
    LevelUp { level: u32, spawned: usize },
    GameOver { score: u32, level: u32 },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { difficulty } => write!(f, "Game started ({difficulty})!"),
            Self::Paused => write!(f, "Paused"),
            Self::Resumed => write!(f, "Resumed"),
            Self::Restarted => write!(f, "New game ready"),
            Self::DifficultyChanged { difficulty } => write!(f, "Difficulty: {difficulty}"),
            Self::GestureRecognized { gesture } => write!(f, "Gesture recognized: {gesture}"),
            Self::EnemyDestroyed { points } => write!(f, "Enemy destroyed! +{points} points"),
            Self::DefenseRaised => write!(f, "Shield raised"),
            Self::LifeLost { lives } => write!(f, "Enemy hit you! -1 life ({lives} left)"),
            Self::BonusCollected { kind, points, lives } => match kind {
                BonusKind::Health => write!(f, "❤ Health bonus! {lives} lives"),
                BonusKind::Points => write!(f, "★ Points bonus! +{points} points"),
                BonusKind::Speed => write!(f, "⚡ Speed bonus!"),
            },
            Self::MissionCompleted { mission, reward } => {
                write!(f, "🎯 Mission complete: {}! +{reward} points", mission.title())
            }
            Self::LevelUp { level, .. } => write!(f, "🎉 LEVEL {level}!"),
            Self::GameOver { score, level } => {
                write!(f, "💀 GAME OVER! Score {score}, level {level}")
            }
        }
    }
}

/// Sending half handed to the simulation.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<GameEvent>) -> Self {
        Self { tx }
    }

    /// A closed receiver is not an error: nobody is listening any more.
    pub fn emit(&self, event: GameEvent) {
        let _ = self.tx.send(event);
    }
}

pub fn event_channel() -> (EventSink, mpsc::UnboundedReceiver<GameEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink::new(tx), rx)
}
