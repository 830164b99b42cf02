#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order simulation loop for Path Defence.
//!
//! [`Simulation`] owns the authoritative world together with every system and
//! advances them only inside [`Simulation::tick`]. Each tick runs the same
//! phases in the same order: clock, difficulty and spawning, enemy movement,
//! tower targeting and firing, bullet flight, and finally the resolution of
//! queued removals. Identical configurations fed identical timestamps and
//! input therefore produce identical event streams.

mod config;

use log::info;
use path_defence_core::{
    CellCoord, Command, Event, GameOver, Grid, Path, PlacementError, Snapshot, Timestamp,
    TowerId, TowerKind, TowerTarget,
};
use path_defence_system_builder::Builder;
use path_defence_system_movement::Movement;
use path_defence_system_projectiles::Projectiles;
use path_defence_system_spawning::Spawning;
use path_defence_system_tower_combat::TowerCombat;
use path_defence_system_tower_targeting::TowerTargeting;
use path_defence_world::{self as world, query, Config as WorldConfig, World};

pub use path_defence_system_builder::{kind_for_hotkey, BuilderInput};

pub use config::{
    BulletConfig, ConfigError, EconomyConfig, EnemyConfig, GridConfig, PathConfig, SessionConfig,
};

/// A running Path Defence session.
#[derive(Debug)]
pub struct Simulation {
    config: SessionConfig,
    world_config: WorldConfig,
    world: World,
    systems: Systems,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    pending: Vec<Event>,
}

#[derive(Debug)]
struct Systems {
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    builder: Builder,
}

impl Systems {
    fn new(config: &SessionConfig, start: Timestamp) -> Self {
        Self {
            spawning: Spawning::new(config.spawning_config(start)),
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            projectiles: Projectiles::new(config.projectile_config()),
            builder: Builder::new(),
        }
    }
}

impl Simulation {
    /// Starts a session at host timestamp `start`.
    pub fn new(config: SessionConfig, start: Timestamp) -> Result<Self, ConfigError> {
        let world_config = config.world_config(start)?;
        let world = World::new(world_config.clone());
        let systems = Systems::new(&config, start);
        info!(
            "session started with {} lives and {} money",
            world_config.lives, world_config.money
        );

        Ok(Self {
            config,
            world_config,
            world,
            systems,
            targets: Vec::new(),
            commands: Vec::new(),
            pending: Vec::new(),
        })
    }

    /// Advances the session to host timestamp `now` and returns the resulting frame.
    ///
    /// Events broadcast during the tick are appended to `out_events`, preceded
    /// by any events produced by placement or selection requests made since the
    /// previous tick. Once the session is over the frame is frozen and no
    /// further simulation events are produced.
    pub fn tick(&mut self, now: Timestamp, out_events: &mut Vec<Event>) -> Snapshot {
        out_events.append(&mut self.pending);
        if query::game_over(&self.world).is_some() {
            return query::snapshot(&self.world);
        }

        let first = out_events.len();
        world::apply(&mut self.world, Command::Tick { now }, out_events);

        self.systems
            .spawning
            .handle(&out_events[first..], &mut self.commands);
        self.flush(out_events);

        self.systems.movement.handle(
            &out_events[first..],
            &query::enemy_view(&self.world),
            query::path(&self.world),
            &mut self.commands,
        );
        self.flush(out_events);

        let enemies = query::enemy_view(&self.world);
        let towers = query::tower_view(&self.world);
        self.systems
            .targeting
            .handle(&towers, &enemies, &mut self.targets);
        self.systems.combat.handle(
            query::now(&self.world),
            &towers,
            &self.targets,
            &mut self.commands,
        );
        self.flush(out_events);

        self.systems.projectiles.handle(
            &out_events[first..],
            &query::bullet_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.commands,
        );
        self.flush(out_events);

        world::apply(&mut self.world, Command::ResolveTick, out_events);
        query::snapshot(&self.world)
    }

    /// Places a tower of `kind` on `cell`, deducting its cost.
    ///
    /// Rejections leave the session untouched. The outcome is also broadcast
    /// with the next tick's events.
    pub fn place_tower(
        &mut self,
        cell: CellCoord,
        kind: TowerKind,
    ) -> Result<TowerId, PlacementError> {
        let verdict = query::placement_verdict(&self.world, cell, kind);
        world::apply(
            &mut self.world,
            Command::PlaceTower { cell, kind },
            &mut self.pending,
        );
        verdict?;

        query::tower_at(&self.world, cell).ok_or(PlacementError::OccupiedCell)
    }

    /// Selects the tower type used by subsequent confirmed clicks.
    pub fn select_tower_type(&mut self, kind: TowerKind) {
        let mut events = Vec::new();
        self.handle_input(BuilderInput::new(Some(kind), false, None), &mut events);
        self.pending.append(&mut events);
    }

    /// Forwards raw selection and click input to the session.
    ///
    /// A confirm places the currently selected tower type on the cursor cell.
    pub fn handle_input(&mut self, input: BuilderInput, out_events: &mut Vec<Event>) {
        self.systems.builder.handle(&[], input, &mut self.commands);
        self.flush(out_events);
    }

    /// Reports whether placing a tower of `kind` on `cell` would succeed right now.
    pub fn placement_verdict(
        &self,
        cell: CellCoord,
        kind: TowerKind,
    ) -> Result<(), PlacementError> {
        query::placement_verdict(&self.world, cell, kind)
    }

    /// Terminal outcome once the last life was lost.
    #[must_use]
    pub fn game_over(&self) -> Option<GameOver> {
        query::game_over(&self.world)
    }

    /// Captures the current frame without advancing time.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        query::snapshot(&self.world)
    }

    /// Placement grid, for converting pointer positions into cells.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        query::grid(&self.world)
    }

    /// Route enemies walk.
    #[must_use]
    pub fn path(&self) -> &Path {
        query::path(&self.world)
    }

    /// Banner shown when the session boots.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Configuration the session was started with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Discards the current session and starts a fresh one at `now` with the
    /// same configuration.
    pub fn restart(&mut self, now: Timestamp) {
        let world_config = WorldConfig {
            start: now,
            ..self.world_config.clone()
        };
        self.world = World::new(world_config);
        self.systems = Systems::new(&self.config, now);
        self.targets.clear();
        self.commands.clear();
        self.pending.clear();
        info!("session restarted at {} ms", now.as_millis());
    }

    fn flush(&mut self, out_events: &mut Vec<Event>) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, out_events);
        }
    }
}
