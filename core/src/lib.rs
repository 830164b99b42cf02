#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Path Defence engine.
//!
//! This crate defines the message surface that connects the engine, the
//! authoritative world, and pure systems. Systems read immutable views and
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing what actually changed. Hosts only ever see a
//! [`Snapshot`] and the event stream.

mod path;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use path::{Grid, Path, PathError, Segment};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Path Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock to the provided host timestamp.
    Tick {
        /// Host timestamp observed at the start of the frame.
        now: Timestamp,
    },
    /// Raises the base stats applied to subsequently spawned enemies.
    RaiseDifficulty,
    /// Spawns one enemy at the start of the path using the current base stats.
    SpawnEnemy,
    /// Records the outcome of an enemy's movement step.
    MoveEnemy {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// World-space position after the step.
        position: Vec2,
        /// Index of the last waypoint reached after the step.
        path_index: usize,
    },
    /// Reports that an enemy arrived at the final waypoint.
    ReportReachedEnd {
        /// Identifier of the enemy that completed the path.
        enemy: EnemyId,
    },
    /// Requests that a tower fire a bullet at the provided enemy.
    FireBullet {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the bullet homes in on.
        target: EnemyId,
    },
    /// Records the outcome of a bullet's flight step.
    MoveBullet {
        /// Identifier of the bullet that moved.
        bullet: BulletId,
        /// World-space position after the step.
        position: Vec2,
    },
    /// Applies the bullet's damage to its target and retires the bullet.
    StrikeEnemy {
        /// Identifier of the bullet that reached its target.
        bullet: BulletId,
    },
    /// Retires a bullet whose target no longer exists.
    DiscardBullet {
        /// Identifier of the orphaned bullet.
        bullet: BulletId,
    },
    /// Applies every removal queued during the current tick.
    ResolveTick,
    /// Requests placement of a tower on the provided cell.
    PlaceTower {
        /// Cell the tower should occupy.
        cell: CellCoord,
        /// Type of tower to construct.
        kind: TowerKind,
    },
    /// Selects the tower type used by subsequent placement requests.
    SelectTowerType {
        /// Tower type to select.
        kind: TowerKind,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Host timestamp the clock advanced to.
        now: Timestamp,
        /// Time elapsed since the session started.
        elapsed: Duration,
    },
    /// Announces that enemies spawned from now on are stronger.
    DifficultyRaised {
        /// Base stats applied to future spawns.
        stats: EnemyStats,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Stats fixed for the enemy's lifetime.
        stats: EnemyStats,
    },
    /// Reports that a bullet damaged an enemy.
    EnemyDamaged {
        /// Enemy that took the hit.
        enemy: EnemyId,
        /// Bullet that delivered the damage.
        bullet: BulletId,
        /// Remaining health, possibly at or below zero.
        health: Health,
    },
    /// Reports that an enemy completed the path and cost a life.
    EnemyReachedEnd {
        /// Enemy that was removed.
        enemy: EnemyId,
        /// Lives left after the loss.
        lives: u32,
    },
    /// Reports that a bullet killed an enemy and paid the reward.
    EnemyKilled {
        /// Enemy that was removed.
        enemy: EnemyId,
        /// Bullet credited with the kill.
        bullet: BulletId,
        /// Money awarded for the kill.
        reward: u32,
    },
    /// Confirms that a tower fired.
    BulletFired {
        /// Identifier assigned to the new bullet.
        bullet: BulletId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the bullet homes in on.
        target: EnemyId,
    },
    /// Reports that a bullet was retired without killing anything.
    BulletSpent {
        /// Identifier of the removed bullet.
        bullet: BulletId,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Money deducted for the placement.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that the player selected a tower type.
    TowerTypeSelected {
        /// Newly selected tower type.
        kind: TowerKind,
    },
    /// Announces that the last life was lost and the session halted.
    GameOver {
        /// Time survived since the session started.
        survived: Duration,
    },
}

/// Host timestamp measured in whole milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds represented by the timestamp.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` lies in the future.
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Timestamp advanced by the provided duration.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new bullet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the bullet identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Hit points carried by an enemy.
///
/// Signed so that overkill damage stays observable until the enemy is
/// removed at the end of the tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Health(i32);

impl Health {
    /// Creates a health value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Raw hit points.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Reports whether the enemy has no hit points left.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 <= 0
    }

    /// Health remaining after taking the provided damage.
    #[must_use]
    pub fn after(self, damage: Damage) -> Self {
        let damage = i32::try_from(damage.get()).unwrap_or(i32::MAX);
        Self(self.0.saturating_sub(damage))
    }

    /// Health increased by `amount`.
    #[must_use]
    pub const fn raised_by(self, amount: i32) -> Self {
        Self(self.0.saturating_add(amount))
    }
}

/// Damage delivered by a single bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Damage(u32);

impl Damage {
    /// Creates a damage value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw damage points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Stats an enemy is spawned with; fixed for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Starting and maximum health.
    pub health: Health,
    /// Distance travelled per tick in world units.
    pub speed: f32,
}

impl EnemyStats {
    /// Creates a new stats bundle.
    #[must_use]
    pub const fn new(health: Health, speed: f32) -> Self {
        Self { health, speed }
    }

    /// Stats increased by the provided step.
    #[must_use]
    pub fn raised_by(self, step: EnemyStats) -> Self {
        Self {
            health: self.health.raised_by(step.health.get()),
            speed: self.speed + step.speed,
        }
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Cheap tower with a short range and slow fire rate.
    Basic,
    /// Expensive tower with a longer range, faster fire rate and heavier bullets.
    Advanced,
}

impl TowerKind {
    /// Every constructible tower type in menu order.
    pub const ALL: [TowerKind; 2] = [TowerKind::Basic, TowerKind::Advanced];

    /// Money required to place the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Basic => 50,
            Self::Advanced => 100,
        }
    }

    /// Targeting radius in world units; enemies must be strictly closer.
    #[must_use]
    pub const fn range(self) -> f32 {
        match self {
            Self::Basic => 100.0,
            Self::Advanced => 120.0,
        }
    }

    /// Minimum time between two shots; a shot needs strictly more to elapse.
    #[must_use]
    pub const fn fire_rate(self) -> Duration {
        match self {
            Self::Basic => Duration::from_millis(1_000),
            Self::Advanced => Duration::from_millis(800),
        }
    }

    /// Damage carried by each bullet the tower fires.
    #[must_use]
    pub const fn damage(self) -> Damage {
        match self {
            Self::Basic => Damage::new(5),
            Self::Advanced => Damage::new(10),
        }
    }

    /// Human readable name of the tower type.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic Tower",
            Self::Advanced => "Advanced Tower",
        }
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The session already ended.
    #[error("the game is over")]
    GameOver,
    /// The requested cell lies outside the grid.
    #[error("cell is outside the grid")]
    OutOfBounds,
    /// The requested cell lies on the enemy path.
    #[error("cannot place a tower on the path")]
    OnPath,
    /// The requested cell already holds a tower.
    #[error("cell already holds a tower")]
    OccupiedCell,
    /// The player cannot afford the tower.
    #[error("not enough money: need {required}, have {available}")]
    InsufficientFunds {
        /// Cost of the requested tower.
        required: u32,
        /// Money available at the time of the request.
        available: u32,
    },
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// World-space position.
    pub position: Vec2,
    /// Remaining health.
    pub health: Health,
    /// Health the enemy spawned with.
    pub max_health: Health,
    /// Distance travelled per tick.
    pub speed: f32,
    /// Index of the last waypoint reached.
    pub path_index: usize,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific enemy.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// World-space centre of the tower's cell.
    pub position: Vec2,
    /// Timestamp of the last shot, `None` if the tower never fired.
    pub last_shot: Option<Timestamp>,
}

impl TowerSnapshot {
    /// Reports whether the tower's cooldown elapsed at `now`.
    ///
    /// A tower that never fired is always ready.
    #[must_use]
    pub fn ready_at(&self, now: Timestamp) -> bool {
        self.last_shot.map_or(true, |last_shot| {
            now.saturating_duration_since(last_shot) > self.kind.fire_rate()
        })
    }
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific tower.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single bullet's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Unique identifier assigned to the bullet.
    pub id: BulletId,
    /// Type of the tower that fired the bullet.
    pub kind: TowerKind,
    /// World-space position.
    pub position: Vec2,
    /// Enemy the bullet homes in on; it may no longer exist.
    pub target: EnemyId,
    /// Damage dealt on impact.
    pub damage: Damage,
}

/// Read-only snapshot describing all bullets in flight.
#[derive(Clone, Debug, Default)]
pub struct BulletView {
    snapshots: Vec<BulletSnapshot>,
}

impl BulletView {
    /// Creates a new bullet view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BulletSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured bullet snapshots in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &BulletSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BulletSnapshot> {
        self.snapshots
    }
}

/// Target chosen for a tower during the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Nearest enemy strictly within range.
    pub enemy: EnemyId,
    /// Distance between the tower and the enemy in world units.
    pub distance: f32,
}

/// Terminal outcome of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOver {
    /// Time survived since the session started.
    pub survived: Duration,
}

impl GameOver {
    /// Survival time truncated to whole seconds.
    #[must_use]
    pub const fn elapsed_seconds(&self) -> u64 {
        self.survived.as_secs()
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Live enemies in spawn order.
    pub enemies: Vec<EnemySnapshot>,
    /// Placed towers in placement order.
    pub towers: Vec<TowerSnapshot>,
    /// Bullets in flight in firing order.
    pub bullets: Vec<BulletSnapshot>,
    /// Lives left.
    pub lives: u32,
    /// Money available for placements.
    pub money: u32,
    /// Time elapsed since the session started.
    pub elapsed: Duration,
    /// Tower type used by the next placement.
    pub selected_tower_kind: TowerKind,
    /// Terminal outcome once the session ended.
    pub game_over: Option<GameOver>,
}

impl Snapshot {
    /// Elapsed session time truncated to whole seconds.
    #[must_use]
    pub const fn elapsed_seconds(&self) -> u64 {
        self.elapsed.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tower_kinds_match_the_price_list() {
        assert_eq!(TowerKind::Basic.cost(), 50);
        assert_eq!(TowerKind::Advanced.cost(), 100);
        assert_eq!(TowerKind::Basic.damage(), Damage::new(5));
        assert_eq!(TowerKind::Advanced.damage(), Damage::new(10));
        assert_eq!(TowerKind::Basic.fire_rate(), Duration::from_millis(1_000));
        assert_eq!(TowerKind::Advanced.fire_rate(), Duration::from_millis(800));
        assert!((TowerKind::Basic.range() - 100.0).abs() < f32::EPSILON);
        assert!((TowerKind::Advanced.range() - 120.0).abs() < f32::EPSILON);
    }

    #[test]
    fn health_goes_negative_on_overkill() {
        let health = Health::new(3).after(Damage::new(5));
        assert_eq!(health, Health::new(-2));
        assert!(health.is_depleted());
        assert!(Health::new(0).is_depleted());
        assert!(!Health::new(1).is_depleted());
    }

    #[test]
    fn stats_rise_by_step() {
        let base = EnemyStats::new(Health::new(10), 1.0);
        let raised = base.raised_by(EnemyStats::new(Health::new(5), 0.2));
        assert_eq!(raised.health, Health::new(15));
        assert!((raised.speed - 1.2).abs() < 1e-6);
    }

    #[test]
    fn timestamps_saturate_when_going_backwards() {
        let earlier = Timestamp::from_millis(500);
        let later = Timestamp::from_millis(1_750);
        assert_eq!(
            later.saturating_duration_since(earlier),
            Duration::from_millis(1_250)
        );
        assert_eq!(earlier.saturating_duration_since(later), Duration::ZERO);
        assert_eq!(
            earlier.saturating_add(Duration::from_millis(16)),
            Timestamp::from_millis(516)
        );
    }

    #[test]
    fn tower_readiness_requires_strictly_more_than_fire_rate() {
        let tower = TowerSnapshot {
            id: TowerId::new(0),
            kind: TowerKind::Basic,
            cell: CellCoord::new(1, 1),
            position: Vec2::new(60.0, 60.0),
            last_shot: None,
        };
        assert!(tower.ready_at(Timestamp::from_millis(0)));

        let tower = TowerSnapshot {
            last_shot: Some(Timestamp::from_millis(2_000)),
            ..tower
        };
        assert!(!tower.ready_at(Timestamp::from_millis(3_000)));
        assert!(tower.ready_at(Timestamp::from_millis(3_001)));
    }

    #[test]
    fn enemy_view_sorts_and_looks_up_by_id() {
        let snapshot = |id: u32| EnemySnapshot {
            id: EnemyId::new(id),
            position: Vec2::ZERO,
            health: Health::new(10),
            max_health: Health::new(10),
            speed: 1.0,
            path_index: 0,
        };
        let view = EnemyView::from_snapshots(vec![snapshot(4), snapshot(1), snapshot(2)]);
        let ids: Vec<u32> = view.iter().map(|enemy| enemy.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert!(view.get(EnemyId::new(2)).is_some());
        assert!(view.get(EnemyId::new(3)).is_none());
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn placement_errors_describe_the_problem() {
        let error = PlacementError::InsufficientFunds {
            required: 50,
            available: 40,
        };
        assert_eq!(error.to_string(), "not enough money: need 50, have 40");
        assert_eq!(
            PlacementError::OnPath.to_string(),
            "cannot place a tower on the path"
        );
    }

    #[test]
    fn tower_kind_parses_from_lowercase_config_values() {
        #[derive(serde::Deserialize)]
        struct Entry {
            kind: TowerKind,
        }

        let entry: Entry = toml::from_str("kind = \"advanced\"").expect("parse");
        assert_eq!(entry.kind, TowerKind::Advanced);
    }

    #[test]
    fn game_over_reports_whole_seconds() {
        let outcome = GameOver {
            survived: Duration::from_millis(42_999),
        };
        assert_eq!(outcome.elapsed_seconds(), 42);
    }
}
