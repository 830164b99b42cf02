#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks enemies along the path.

use glam::Vec2;
use path_defence_core::{Command, EnemyView, Event, Path};

/// Pure system that reacts to clock events and emits enemy movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    steps: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the enemy view to emit movement commands.
    ///
    /// Enemies only move on ticks that advanced the clock. Every live enemy
    /// produces one `Command::MoveEnemy`; enemies that arrived on the final
    /// waypoint additionally produce `Command::ReportReachedEnd`.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        path: &Path,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.steps.clear();
        for enemy in enemies.iter() {
            let step = advance(enemy.position, enemy.speed, enemy.path_index, path);
            self.steps.push(Command::MoveEnemy {
                enemy: enemy.id,
                position: step.position,
                path_index: step.path_index,
            });
            if step.reached_end {
                self.steps.push(Command::ReportReachedEnd { enemy: enemy.id });
            }
        }

        out.reserve(self.steps.len());
        out.append(&mut self.steps);
    }
}

/// Result of moving a single enemy for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Position after the step.
    pub position: Vec2,
    /// Index of the last waypoint reached after the step.
    pub path_index: usize,
    /// Whether the enemy now stands on the final waypoint.
    pub reached_end: bool,
}

/// Moves an enemy by `speed` toward the end of its current segment.
///
/// When the remaining distance is smaller than `speed` the enemy snaps onto
/// the waypoint and the index advances by exactly one.
#[must_use]
pub fn advance(position: Vec2, speed: f32, path_index: usize, path: &Path) -> Step {
    let Some(segment) = path.segment(path_index) else {
        return Step {
            position,
            path_index,
            reached_end: true,
        };
    };

    let offset = segment.end - position;
    let distance = offset.length();
    if distance < speed || distance <= f32::EPSILON {
        let path_index = path_index + 1;
        return Step {
            position: segment.end,
            path_index,
            reached_end: path.is_terminal(path_index),
        };
    }

    Step {
        position: position + offset / distance * speed,
        path_index,
        reached_end: false,
    }
}
