use serde::Serialize;

pub const MISSION_REWARD: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    DestroyEnemies,
    CollectBonuses,
}

impl MissionKind {
    pub fn target(&self) -> u32 {
        match self {
            Self::DestroyEnemies => 10,
            Self::CollectBonuses => 5,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::DestroyEnemies => "Destroy 10 enemies",
            Self::CollectBonuses => "Collect 5 bonuses",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mission {
    pub kind: MissionKind,
    pub progress: u32,
    pub completed: bool,
}

impl Mission {
    fn new(kind: MissionKind) -> Self {
        Self { kind, progress: 0, completed: false }
    }

    /// Counts one event. Returns true only on the event that completes it.
    fn record(&mut self) -> bool {
        self.progress += 1;
        if !self.completed && self.progress >= self.kind.target() {
            self.completed = true;
            return true;
        }
        false
    }
}

/// Kill and pickup counters with one-shot rewards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionTracker {
    missions: [Mission; 2],
}

impl MissionTracker {
    pub fn new() -> Self {
        Self {
            missions: [
                Mission::new(MissionKind::DestroyEnemies),
                Mission::new(MissionKind::CollectBonuses),
            ],
        }
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn get(&self, kind: MissionKind) -> &Mission {
        match kind {
            MissionKind::DestroyEnemies => &self.missions[0],
            MissionKind::CollectBonuses => &self.missions[1],
        }
    }

    /// Records one qualifying event and returns the reward if this event
    /// completed the mission.
    pub fn record(&mut self, kind: MissionKind) -> Option<u32> {
        let mission = match kind {
            MissionKind::DestroyEnemies => &mut self.missions[0],
            MissionKind::CollectBonuses => &mut self.missions[1],
        };
        mission.record().then_some(MISSION_REWARD)
    }
}

impl Default for MissionTracker {
    fn default() -> Self {
        Self::new()
    }
}
