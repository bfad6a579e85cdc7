//! Player, enemies and bonuses plus the collections that own them.
//!
//! Positions are the top-left corner of each entity's bounding box. Collision
//! is a strict axis-aligned box test even though the renderer draws circles.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

pub const PLAYER_WIDTH: f32 = 60.0;
pub const PLAYER_HEIGHT: f32 = 80.0;
pub const ENEMY_SIZE: f32 = 40.0;
pub const BONUS_SIZE: f32 = 30.0;

pub const ENEMY_MIN_SPEED: f32 = 1.0;
pub const ENEMY_MAX_SPEED: f32 = 3.0;
pub const STRONG_ENEMY_CHANCE: f64 = 0.3;

/// Distance the player travels per movement gesture.
pub const MOVE_STEP: f32 = 15.0;
/// Closest the player may get to the top and left edges.
pub const PLAYER_EDGE_MARGIN: f32 = 50.0;
/// Closest the player may get to the bottom edge.
pub const PLAYER_BOTTOM_MARGIN: f32 = 100.0;

/// Playable area in arena units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Strict overlap: touching edges do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Combat mode. Attacking and defending exclude each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    #[default]
    Neutral,
    Attacking,
    Defending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub stance: Stance,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, stance: Stance::Neutral }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn is_attacking(&self) -> bool {
        self.stance == Stance::Attacking
    }

    pub fn is_defending(&self) -> bool {
        self.stance == Stance::Defending
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        (x - self.x).hypot(y - self.y)
    }

    /// One movement step, clamped to the arena margins.
    pub fn step(&mut self, direction: Direction, arena: Arena) {
        match direction {
            Direction::Up => self.y = (self.y - MOVE_STEP).max(PLAYER_EDGE_MARGIN),
            Direction::Down => {
                self.y = (self.y + MOVE_STEP).min(arena.height - PLAYER_BOTTOM_MARGIN)
            }
            Direction::Left => self.x = (self.x - MOVE_STEP).max(PLAYER_EDGE_MARGIN),
            Direction::Right => self.x = (self.x + MOVE_STEP).min(arena.width - PLAYER_EDGE_MARGIN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Normal,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub kind: EnemyKind,
}

impl Enemy {
    pub fn new(x: f32, y: f32, speed: f32, kind: EnemyKind) -> Self {
        Self { x, y, speed, kind }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, ENEMY_SIZE, ENEMY_SIZE)
    }

    /// Moves `speed` units straight at the target. Stays put when already on it.
    pub fn step_toward(&mut self, target_x: f32, target_y: f32) {
        let dx = target_x - self.x;
        let dy = target_y - self.y;
        let distance = dx.hypot(dy);
        if distance > 0.0 {
            self.x += dx / distance * self.speed;
            self.y += dy / distance * self.speed;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    Health,
    Points,
    Speed,
}

impl BonusKind {
    pub const ALL: [BonusKind; 3] = [BonusKind::Health, BonusKind::Points, BonusKind::Speed];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bonus {
    pub x: f32,
    pub y: f32,
    pub kind: BonusKind,
    pub collected: bool,
}

impl Bonus {
    pub fn new(x: f32, y: f32, kind: BonusKind) -> Self {
        Self { x, y, kind, collected: false }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, BONUS_SIZE, BONUS_SIZE)
    }
}

/// Owns the live enemies and bonuses. Removal from a collection is the only
/// way an entity dies.
#[derive(Debug, Clone, Serialize)]
pub struct EntityManager {
    arena: Arena,
    enemies: Vec<Enemy>,
    bonuses: Vec<Bonus>,
}

impl EntityManager {
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            enemies: Vec::new(),
            bonuses: Vec::new(),
        }
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn bonuses(&self) -> &[Bonus] {
        &self.bonuses
    }

    pub fn insert_enemy(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    pub fn insert_bonus(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    /// Empties both collections.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.bonuses.clear();
    }

    pub fn spawn_enemies<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        let Arena { width, height } = self.arena;
        for _ in 0..count {
            let x = rng.random_range(50.0..width - 50.0);
            let y = rng.random_range(50.0..height - 100.0);
            let speed = rng.random_range(ENEMY_MIN_SPEED..ENEMY_MAX_SPEED);
            let kind = if rng.random_bool(STRONG_ENEMY_CHANCE) {
                EnemyKind::Strong
            } else {
                EnemyKind::Normal
            };
            self.enemies.push(Enemy::new(x, y, speed, kind));
        }
        debug!(count, total = self.enemies.len(), "spawned enemies");
    }

    pub fn spawn_bonuses<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        let Arena { width, height } = self.arena;
        for _ in 0..count {
            let x = rng.random_range(25.0..width - 25.0);
            let y = rng.random_range(25.0..height - 75.0);
            let kind = BonusKind::ALL[rng.random_range(0..BonusKind::ALL.len())];
            self.bonuses.push(Bonus::new(x, y, kind));
        }
        debug!(count, total = self.bonuses.len(), "spawned bonuses");
    }

    pub fn advance_enemies(&mut self, target_x: f32, target_y: f32) {
        for enemy in &mut self.enemies {
            enemy.step_toward(target_x, target_y);
        }
    }

    /// Drops a hit enemy somewhere uniformly random in the whole arena.
    pub fn relocate_enemy<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) {
        let Arena { width, height } = self.arena;
        if let Some(enemy) = self.enemies.get_mut(index) {
            enemy.x = rng.random_range(0.0..width);
            enemy.y = rng.random_range(0.0..height);
        }
    }

    /// Removes every enemy strictly closer than `radius` to the point and
    /// returns how many were removed.
    pub fn remove_enemies_near(&mut self, x: f32, y: f32, radius: f32) -> usize {
        let before = self.enemies.len();
        self.enemies
            .retain(|enemy| (enemy.x - x).hypot(enemy.y - y) >= radius);
        before - self.enemies.len()
    }

    pub fn scale_enemy_speed(&mut self, factor: f32) {
        for enemy in &mut self.enemies {
            enemy.speed *= factor;
        }
    }

    /// Marks uncollected bonuses touching `bounds` as collected and returns
    /// their kinds in collection order.
    pub fn collect_bonuses(&mut self, bounds: &Rect) -> Vec<BonusKind> {
        self.bonuses
            .iter_mut()
            .filter(|bonus| !bonus.collected && bounds.overlaps(&bonus.bounds()))
            .map(|bonus| {
                bonus.collected = true;
                bonus.kind
            })
            .collect()
    }

    pub fn remove_collected_bonuses(&mut self) {
        self.bonuses.retain(|bonus| !bonus.collected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ARENA: Arena = Arena { width: 800.0, height: 600.0 };

    #[test]
    fn overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(9.0, 9.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(-10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn enemy_moves_toward_target_by_speed() {
        let mut enemy = Enemy::new(0.0, 0.0, 2.0, EnemyKind::Normal);
        enemy.step_toward(30.0, 40.0);
        assert!((enemy.x - 1.2).abs() < 1e-5);
        assert!((enemy.y - 1.6).abs() < 1e-5);
    }

    #[test]
    fn enemy_on_target_does_not_move() {
        let mut enemy = Enemy::new(5.0, 5.0, 2.0, EnemyKind::Strong);
        enemy.step_toward(5.0, 5.0);
        assert_eq!((enemy.x, enemy.y), (5.0, 5.0));
        assert!(enemy.x.is_finite());
    }

    #[test]
    fn player_steps_are_clamped() {
        let mut player = Player::new(55.0, 55.0);
        player.step(Direction::Up, ARENA);
        player.step(Direction::Left, ARENA);
        assert_eq!((player.x, player.y), (50.0, 50.0));

        let mut player = Player::new(745.0, 495.0);
        player.step(Direction::Right, ARENA);
        player.step(Direction::Down, ARENA);
        assert_eq!((player.x, player.y), (750.0, 500.0));

        let mut player = Player::new(400.0, 300.0);
        player.step(Direction::Down, ARENA);
        assert_eq!(player.y, 315.0);
    }

    #[test]
    fn spawns_stay_inside_inset_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut entities = EntityManager::new(ARENA);
        entities.spawn_enemies(200, &mut rng);
        entities.spawn_bonuses(200, &mut rng);

        for enemy in entities.enemies() {
            assert!((50.0..750.0).contains(&enemy.x));
            assert!((50.0..500.0).contains(&enemy.y));
            assert!((ENEMY_MIN_SPEED..ENEMY_MAX_SPEED).contains(&enemy.speed));
        }
        for bonus in entities.bonuses() {
            assert!((25.0..775.0).contains(&bonus.x));
            assert!((25.0..525.0).contains(&bonus.y));
            assert!(!bonus.collected);
        }
        assert!(entities.enemies().iter().any(|e| e.kind == EnemyKind::Strong));
        assert!(entities.enemies().iter().any(|e| e.kind == EnemyKind::Normal));
        for kind in BonusKind::ALL {
            assert!(entities.bonuses().iter().any(|b| b.kind == kind));
        }
    }

    #[test]
    fn removes_only_enemies_inside_radius() {
        let mut entities = EntityManager::new(ARENA);
        entities.insert_enemy(Enemy::new(450.0, 300.0, 1.0, EnemyKind::Normal));
        entities.insert_enemy(Enemy::new(500.0, 300.0, 1.0, EnemyKind::Normal));
        entities.insert_enemy(Enemy::new(400.0, 150.0, 1.0, EnemyKind::Normal));

        assert_eq!(entities.remove_enemies_near(400.0, 300.0, 100.0), 1);
        assert_eq!(entities.enemies().len(), 2);
    }

    #[test]
    fn collected_bonuses_are_swept() {
        let mut entities = EntityManager::new(ARENA);
        entities.insert_bonus(Bonus::new(410.0, 310.0, BonusKind::Points));
        entities.insert_bonus(Bonus::new(10.0, 10.0, BonusKind::Health));

        let player = Player::new(400.0, 300.0);
        assert_eq!(entities.collect_bonuses(&player.bounds()), vec![BonusKind::Points]);
        assert!(entities.collect_bonuses(&player.bounds()).is_empty());

        entities.remove_collected_bonuses();
        assert_eq!(entities.bonuses().len(), 1);
        assert_eq!(entities.bonuses()[0].kind, BonusKind::Health);
    }
}
