#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Path Defence.
//!
//! The [`World`] owns every entity collection together with lives, money and
//! the grid occupancy map. It only changes through [`apply`]. Entity
//! membership changes (enemies leaving the path, kills, spent bullets) are
//! queued while the update phases run and applied in one pass when
//! [`Command::ResolveTick`] arrives.

mod placement;
mod resolution;
mod towers;

use std::time::Duration;

use glam::Vec2;
use log::{debug, info, warn};
use path_defence_core::{
    BulletId, CellCoord, Command, Damage, EnemyId, EnemyStats, Event, GameOver, Grid, Health,
    Path, PlacementError, Timestamp, TowerId, TowerKind, WELCOME_BANNER,
};

use self::{
    placement::OccupancyGrid,
    resolution::{Resolution, ResolutionQueue},
    towers::TowerRegistry,
};

/// Parameters fixed for the lifetime of a session.
#[derive(Clone, Debug)]
pub struct Config {
    /// Placement grid the path and towers are laid out on.
    pub grid: Grid,
    /// Route every enemy walks.
    pub path: Path,
    /// Lives the player starts with.
    pub lives: u32,
    /// Money the player starts with.
    pub money: u32,
    /// Money paid for every kill.
    pub kill_reward: u32,
    /// Stats of enemies spawned before the first difficulty increase.
    pub base_stats: EnemyStats,
    /// Amount added to the base stats on every difficulty increase.
    pub difficulty_step: EnemyStats,
    /// Host timestamp at which the session starts.
    pub start: Timestamp,
}

/// Represents the authoritative Path Defence session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    path: Path,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    bullets: Vec<Bullet>,
    occupancy: OccupancyGrid,
    resolutions: ResolutionQueue,
    lives: u32,
    money: u32,
    kill_reward: u32,
    base_stats: EnemyStats,
    difficulty_step: EnemyStats,
    selected_kind: TowerKind,
    clock: Clock,
    phase: Phase,
    next_enemy_id: EnemyId,
    next_bullet_id: BulletId,
}

impl World {
    /// Creates a fresh session from the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let occupancy = OccupancyGrid::new(config.grid.columns(), config.grid.rows());
        Self {
            banner: WELCOME_BANNER,
            grid: config.grid,
            path: config.path,
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            bullets: Vec::new(),
            occupancy,
            resolutions: ResolutionQueue::new(),
            lives: config.lives,
            money: config.money,
            kill_reward: config.kill_reward,
            base_stats: config.base_stats,
            difficulty_step: config.difficulty_step,
            selected_kind: TowerKind::Basic,
            clock: Clock {
                start: config.start,
                now: config.start,
            },
            phase: Phase::Running,
            next_enemy_id: EnemyId::new(0),
            next_bullet_id: BulletId::new(0),
        }
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|candidate| candidate.id == enemy)
    }

    fn bullet_index(&self, bullet: BulletId) -> Option<usize> {
        self.bullets.iter().position(|candidate| candidate.id == bullet)
    }

    fn advance_clock(&mut self, now: Timestamp, out_events: &mut Vec<Event>) {
        if now < self.clock.now {
            debug!(
                "ignoring clock regression from {} ms to {} ms",
                self.clock.now.as_millis(),
                now.as_millis()
            );
        } else {
            self.clock.now = now;
        }

        out_events.push(Event::TimeAdvanced {
            now: self.clock.now,
            elapsed: self.clock.elapsed(),
        });
    }

    fn raise_difficulty(&mut self, out_events: &mut Vec<Event>) {
        self.base_stats = self.base_stats.raised_by(self.difficulty_step);
        info!(
            "difficulty raised: enemies now spawn with {} health at speed {:.1}",
            self.base_stats.health.get(),
            self.base_stats.speed
        );
        out_events.push(Event::DifficultyRaised {
            stats: self.base_stats,
        });
    }

    fn spawn_enemy(&mut self, out_events: &mut Vec<Event>) {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        let stats = self.base_stats;
        self.enemies.push(Enemy {
            id,
            position: self.path.start(),
            speed: stats.speed,
            health: stats.health,
            max_health: stats.health,
            path_index: 0,
        });
        debug!("enemy {} spawned with {} health", id.get(), stats.health.get());
        out_events.push(Event::EnemySpawned { enemy: id, stats });
    }

    fn move_enemy(&mut self, enemy: EnemyId, position: Vec2, path_index: usize) {
        let last_index = self.path.len().saturating_sub(1);
        let Some(state) = self.enemies.iter_mut().find(|state| state.id == enemy) else {
            warn!("movement reported for unknown enemy {}", enemy.get());
            return;
        };

        if path_index < state.path_index || path_index > last_index {
            warn!(
                "enemy {} cannot move from waypoint {} to waypoint {}",
                enemy.get(),
                state.path_index,
                path_index
            );
            return;
        }

        state.position = position;
        state.path_index = path_index;
    }

    fn fire_bullet(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        if self.enemy_index(target).is_none() {
            warn!(
                "tower {} cannot fire at unknown enemy {}",
                tower.get(),
                target.get()
            );
            return;
        }

        let now = self.clock.now;
        let Some(state) = self.towers.get_mut(tower) else {
            warn!("fire requested for unknown tower {}", tower.get());
            return;
        };
        if !state.snapshot().ready_at(now) {
            warn!("tower {} fired before its cooldown elapsed", tower.get());
            return;
        }

        state.last_shot = Some(now);
        let kind = state.kind;
        let position = state.position;

        let id = self.next_bullet_id;
        self.next_bullet_id = BulletId::new(id.get().saturating_add(1));
        self.bullets.push(Bullet {
            id,
            kind,
            position,
            target,
            damage: kind.damage(),
            spent: false,
        });
        out_events.push(Event::BulletFired {
            bullet: id,
            tower,
            target,
        });
    }

    fn move_bullet(&mut self, bullet: BulletId, position: Vec2) {
        match self.bullets.iter_mut().find(|state| state.id == bullet) {
            Some(state) if !state.spent => state.position = position,
            Some(_) => debug!("ignoring movement of spent bullet {}", bullet.get()),
            None => warn!("movement reported for unknown bullet {}", bullet.get()),
        }
    }

    fn strike(&mut self, bullet: BulletId, out_events: &mut Vec<Event>) {
        let Some((target, damage)) = self.retire_bullet(bullet) else {
            return;
        };

        let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id == target) else {
            debug!("bullet {} lost its target {}", bullet.get(), target.get());
            self.resolutions.push(Resolution::Spent(bullet));
            return;
        };

        enemy.health = enemy.health.after(damage);
        out_events.push(Event::EnemyDamaged {
            enemy: target,
            bullet,
            health: enemy.health,
        });

        if enemy.health.is_depleted() {
            self.resolutions.push(Resolution::Killed {
                bullet,
                enemy: target,
            });
        } else {
            self.resolutions.push(Resolution::Spent(bullet));
        }
    }

    fn discard_bullet(&mut self, bullet: BulletId) {
        if self.retire_bullet(bullet).is_some() {
            self.resolutions.push(Resolution::Spent(bullet));
        }
    }

    // Marks the bullet spent so it resolves at most once per tick.
    fn retire_bullet(&mut self, bullet: BulletId) -> Option<(EnemyId, Damage)> {
        let Some(state) = self.bullets.iter_mut().find(|state| state.id == bullet) else {
            warn!("impact reported for unknown bullet {}", bullet.get());
            return None;
        };
        if state.spent {
            warn!("bullet {} already resolved this tick", bullet.get());
            return None;
        }

        state.spent = true;
        Some((state.target, state.damage))
    }

    fn place_tower(&mut self, cell: CellCoord, kind: TowerKind, out_events: &mut Vec<Event>) {
        let verdict = placement::validate(
            cell,
            kind,
            self.money,
            &self.grid,
            &self.path,
            &self.occupancy,
        );

        match verdict {
            Ok(cost) => {
                self.money = self.money.saturating_sub(cost);
                let position = self.grid.cell_center(cell);
                let tower = self.towers.insert(kind, cell, position);
                self.occupancy.occupy(tower, cell);
                debug!(
                    "{} {} placed at ({}, {})",
                    kind.label(),
                    tower.get(),
                    cell.column(),
                    cell.row()
                );
                out_events.push(Event::TowerPlaced {
                    tower,
                    kind,
                    cell,
                    cost,
                });
            }
            Err(reason) => {
                debug!(
                    "placement at ({}, {}) rejected: {reason}",
                    cell.column(),
                    cell.row()
                );
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            }
        }
    }

    fn select_tower_type(&mut self, kind: TowerKind, out_events: &mut Vec<Event>) {
        self.selected_kind = kind;
        out_events.push(Event::TowerTypeSelected { kind });
    }

    fn resolve(&mut self, out_events: &mut Vec<Event>) {
        for resolution in self.resolutions.take() {
            match resolution {
                Resolution::ReachedEnd(enemy) => self.resolve_reached_end(enemy, out_events),
                Resolution::Killed { bullet, enemy } => {
                    self.resolve_kill(bullet, enemy, out_events);
                }
                Resolution::Spent(bullet) => {
                    if self.remove_bullet(bullet) {
                        out_events.push(Event::BulletSpent { bullet });
                    }
                }
            }
        }

        if self.lives == 0 && self.phase == Phase::Running {
            let outcome = GameOver {
                survived: self.clock.elapsed(),
            };
            self.phase = Phase::Over(outcome);
            info!(
                "game over: survived for {} seconds",
                outcome.elapsed_seconds()
            );
            out_events.push(Event::GameOver {
                survived: outcome.survived,
            });
        }
    }

    fn resolve_reached_end(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(index) = self.enemy_index(enemy) else {
            warn!("enemy {} reached the end but is no longer tracked", enemy.get());
            return;
        };

        let _ = self.enemies.remove(index);
        self.lives = self.lives.saturating_sub(1);
        debug!("enemy {} reached the end, {} lives left", enemy.get(), self.lives);
        out_events.push(Event::EnemyReachedEnd {
            enemy,
            lives: self.lives,
        });
    }

    fn resolve_kill(&mut self, bullet: BulletId, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let bullet_removed = self.remove_bullet(bullet);

        match self.enemy_index(enemy) {
            Some(index) => {
                let _ = self.enemies.remove(index);
                self.money = self.money.saturating_add(self.kill_reward);
                debug!("enemy {} killed by bullet {}", enemy.get(), bullet.get());
                out_events.push(Event::EnemyKilled {
                    enemy,
                    bullet,
                    reward: self.kill_reward,
                });
            }
            None => {
                debug!(
                    "enemy {} was already removed, bullet {} earns no reward",
                    enemy.get(),
                    bullet.get()
                );
                if bullet_removed {
                    out_events.push(Event::BulletSpent { bullet });
                }
            }
        }
    }

    fn remove_bullet(&mut self, bullet: BulletId) -> bool {
        match self.bullet_index(bullet) {
            Some(index) => {
                let _ = self.bullets.remove(index);
                true
            }
            None => {
                warn!("bullet {} scheduled for removal is no longer tracked", bullet.get());
                false
            }
        }
    }

    fn apply_after_game_over(&mut self, command: Command, out_events: &mut Vec<Event>) {
        match command {
            Command::SelectTowerType { kind } => self.select_tower_type(kind, out_events),
            Command::PlaceTower { cell, kind } => {
                out_events.push(Event::TowerPlacementRejected {
                    kind,
                    cell,
                    reason: PlacementError::GameOver,
                });
            }
            other => debug!("session is over, ignoring {other:?}"),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if matches!(world.phase, Phase::Over(_)) {
        world.apply_after_game_over(command, out_events);
        return;
    }

    match command {
        Command::Tick { now } => world.advance_clock(now, out_events),
        Command::RaiseDifficulty => world.raise_difficulty(out_events),
        Command::SpawnEnemy => world.spawn_enemy(out_events),
        Command::MoveEnemy {
            enemy,
            position,
            path_index,
        } => world.move_enemy(enemy, position, path_index),
        Command::ReportReachedEnd { enemy } => {
            world.resolutions.push(Resolution::ReachedEnd(enemy));
        }
        Command::FireBullet { tower, target } => world.fire_bullet(tower, target, out_events),
        Command::MoveBullet { bullet, position } => world.move_bullet(bullet, position),
        Command::StrikeEnemy { bullet } => world.strike(bullet, out_events),
        Command::DiscardBullet { bullet } => world.discard_bullet(bullet),
        Command::ResolveTick => world.resolve(out_events),
        Command::PlaceTower { cell, kind } => world.place_tower(cell, kind, out_events),
        Command::SelectTowerType { kind } => world.select_tower_type(kind, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{placement, Phase, World};
    use path_defence_core::{
        BulletSnapshot, BulletView, CellCoord, EnemySnapshot, EnemyStats, EnemyView, GameOver,
        Grid, Path, PlacementError, Snapshot, Timestamp, TowerId, TowerKind, TowerView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the placement grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Provides read-only access to the route enemies walk.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(enemy_snapshot).collect())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of the bullets in flight.
    #[must_use]
    pub fn bullet_view(world: &World) -> BulletView {
        BulletView::from_snapshots(world.bullets.iter().map(bullet_snapshot).collect())
    }

    /// Lives left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Money available for placements.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.money
    }

    /// Most recent host timestamp observed by the world.
    #[must_use]
    pub fn now(world: &World) -> Timestamp {
        world.clock.now
    }

    /// Time elapsed since the session started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock.elapsed()
    }

    /// Stats applied to the next spawned enemy.
    #[must_use]
    pub fn base_stats(world: &World) -> EnemyStats {
        world.base_stats
    }

    /// Tower type used by the next placement request.
    #[must_use]
    pub fn selected_tower_kind(world: &World) -> TowerKind {
        world.selected_kind
    }

    /// Terminal outcome once the last life was lost.
    #[must_use]
    pub fn game_over(world: &World) -> Option<GameOver> {
        match world.phase {
            Phase::Running => None,
            Phase::Over(outcome) => Some(outcome),
        }
    }

    /// Returns the tower standing on the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.occupancy.occupant(cell)
    }

    /// Reports whether placing a tower of `kind` on `cell` would currently succeed.
    pub fn placement_verdict(
        world: &World,
        cell: CellCoord,
        kind: TowerKind,
    ) -> Result<(), PlacementError> {
        if game_over(world).is_some() {
            return Err(PlacementError::GameOver);
        }
        placement::validate(
            cell,
            kind,
            world.money,
            &world.grid,
            &world.path,
            &world.occupancy,
        )
        .map(|_| ())
    }

    /// Captures everything a renderer needs to draw the current frame.
    #[must_use]
    pub fn snapshot(world: &World) -> Snapshot {
        Snapshot {
            enemies: enemy_view(world).into_vec(),
            towers: tower_view(world).into_vec(),
            bullets: bullet_view(world).into_vec(),
            lives: world.lives,
            money: world.money,
            elapsed: world.clock.elapsed(),
            selected_tower_kind: world.selected_kind,
            game_over: game_over(world),
        }
    }

    fn enemy_snapshot(enemy: &super::Enemy) -> EnemySnapshot {
        EnemySnapshot {
            id: enemy.id,
            position: enemy.position,
            health: enemy.health,
            max_health: enemy.max_health,
            speed: enemy.speed,
            path_index: enemy.path_index,
        }
    }

    fn bullet_snapshot(bullet: &super::Bullet) -> BulletSnapshot {
        BulletSnapshot {
            id: bullet.id,
            kind: bullet.kind,
            position: bullet.position,
            target: bullet.target,
            damage: bullet.damage,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Running,
    Over(GameOver),
}

#[derive(Clone, Copy, Debug)]
struct Clock {
    start: Timestamp,
    now: Timestamp,
}

impl Clock {
    fn elapsed(&self) -> Duration {
        self.now.saturating_duration_since(self.start)
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    position: Vec2,
    speed: f32,
    health: Health,
    max_health: Health,
    path_index: usize,
}

#[derive(Clone, Debug)]
struct Bullet {
    id: BulletId,
    kind: TowerKind,
    position: Vec2,
    target: EnemyId,
    damage: Damage,
    spent: bool,
}
