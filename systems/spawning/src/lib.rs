#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for difficulty and enemy spawn commands.

use std::time::Duration;

use path_defence_core::{Command, Event, Timestamp};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    difficulty_interval: Duration,
    start: Timestamp,
}

impl Config {
    /// Creates a new configuration using the provided cadences.
    ///
    /// Both timers start counting at `start`.
    #[must_use]
    pub const fn new(
        spawn_interval: Duration,
        difficulty_interval: Duration,
        start: Timestamp,
    ) -> Self {
        Self {
            spawn_interval,
            difficulty_interval,
            start,
        }
    }
}

/// Pure system that emits at most one difficulty increase and one spawn per tick.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    difficulty_interval: Duration,
    last_spawn: Timestamp,
    last_increase: Timestamp,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            difficulty_interval: config.difficulty_interval,
            last_spawn: config.start,
            last_increase: config.start,
        }
    }

    /// Consumes clock events to emit difficulty and spawn commands.
    ///
    /// A timer fires once strictly more than its interval elapsed since it last
    /// fired. Difficulty is raised before spawning so a spawn on the same tick
    /// already uses the raised stats.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let Some(now) = events.iter().rev().find_map(|event| match event {
            Event::TimeAdvanced { now, .. } => Some(*now),
            _ => None,
        }) else {
            return;
        };

        if now.saturating_duration_since(self.last_increase) > self.difficulty_interval {
            self.last_increase = now;
            out.push(Command::RaiseDifficulty);
        }

        if now.saturating_duration_since(self.last_spawn) > self.spawn_interval {
            self.last_spawn = now;
            out.push(Command::SpawnEnemy);
        }
    }
}
