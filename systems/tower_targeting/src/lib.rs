#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use glam::Vec2;
use path_defence_core::{EnemyId, EnemyView, TowerId, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Every tower picks the nearest enemy strictly inside its range. Enemies
    /// are scanned in spawn order and only a strictly shorter distance
    /// replaces the current choice, so the earliest spawned enemy wins ties.
    /// The output buffer is cleared before populating it with the latest
    /// assignments.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);
        self.prepare_enemy_workspace(enemies);

        for tower in &self.tower_workspace {
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance = tower.position.distance(candidate.position);
                if distance >= tower.range {
                    continue;
                }

                let current = BestCandidate {
                    distance,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                    distance: best_candidate.distance,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range: snapshot.kind.range(),
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Vec2,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        self.distance < other.distance
    }
}

#[cfg(test)]
mod tests {
    use super::{TowerTarget, TowerTargeting};
    use glam::Vec2;
    use path_defence_core::{
        CellCoord, EnemyId, EnemySnapshot, EnemyView, Health, TowerId, TowerKind, TowerSnapshot,
        TowerView,
    };

    fn tower_snapshot(id: u32, kind: TowerKind, position: Vec2) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            cell: CellCoord::new(0, 0),
            position,
            last_shot: None,
        }
    }

    fn enemy_snapshot(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position,
            health: Health::new(10),
            max_health: Health::new(10),
            speed: 1.0,
            path_index: 0,
        }
    }

    #[test]
    fn nearest_enemy_within_range_is_chosen() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(
            1,
            TowerKind::Basic,
            Vec2::ZERO,
        )]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy_snapshot(1, Vec2::new(80.0, 0.0)),
            enemy_snapshot(2, Vec2::new(0.0, 50.0)),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(1),
                enemy: EnemyId::new(2),
                distance: 50.0,
            }]
        );
    }

    #[test]
    fn enemy_exactly_at_range_is_ignored() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(
            1,
            TowerKind::Basic,
            Vec2::ZERO,
        )]);
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(1, Vec2::new(100.0, 0.0))]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn advanced_towers_reach_further() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![
            tower_snapshot(1, TowerKind::Basic, Vec2::ZERO),
            tower_snapshot(2, TowerKind::Advanced, Vec2::ZERO),
        ]);
        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(7, Vec2::new(0.0, 110.0))]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tower, TowerId::new(2));
        assert_eq!(out[0].enemy, EnemyId::new(7));
    }

    #[test]
    fn earliest_enemy_wins_distance_ties() {
        let mut system = TowerTargeting::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(
            1,
            TowerKind::Basic,
            Vec2::ZERO,
        )]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy_snapshot(9, Vec2::new(-30.0, 0.0)),
            enemy_snapshot(4, Vec2::new(30.0, 0.0)),
        ]);

        let mut out = Vec::new();
        system.handle(&towers, &enemies, &mut out);

        assert_eq!(out[0].enemy, EnemyId::new(4));
    }

    #[test]
    fn empty_collections_clear_previous_targets() {
        let mut system = TowerTargeting::new();
        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
            distance: 1.0,
        }];

        let towers = TowerView::from_snapshots(vec![tower_snapshot(
            1,
            TowerKind::Basic,
            Vec2::ZERO,
        )]);
        system.handle(&towers, &EnemyView::default(), &mut out);
        assert!(out.is_empty());

        let enemies = EnemyView::from_snapshots(vec![enemy_snapshot(1, Vec2::ZERO)]);
        system.handle(&TowerView::default(), &enemies, &mut out);
        assert!(out.is_empty());
    }
}
