//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use glam::Vec2;
use path_defence_core::{CellCoord, Timestamp, TowerId, TowerKind, TowerSnapshot};

/// State of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
    /// World-space centre of the occupied cell.
    pub(crate) position: Vec2,
    /// Timestamp of the most recent shot, if any.
    pub(crate) last_shot: Option<Timestamp>,
}

impl TowerState {
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            last_shot: self.last_shot,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower that has never fired and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord, position: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                cell,
                position,
                last_shot: None,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&tower)
    }

    /// Towers in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(TowerKind::Basic, CellCoord::new(1, 1), Vec2::new(60.0, 60.0));
        let second = registry.insert(
            TowerKind::Advanced,
            CellCoord::new(2, 1),
            Vec2::new(100.0, 60.0),
        );

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        let ids: Vec<_> = registry.iter().map(|tower| tower.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn new_towers_can_fire_immediately() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Basic, CellCoord::new(0, 0), Vec2::new(20.0, 20.0));
        let snapshot = registry
            .iter()
            .find(|tower| tower.id == id)
            .expect("tower stored")
            .snapshot();

        assert_eq!(snapshot.last_shot, None);
        assert!(snapshot.ready_at(Timestamp::from_millis(0)));
    }
}
