//! Grid occupancy and the rules deciding where towers may be placed.

use path_defence_core::{CellCoord, Grid, Path, PlacementError, TowerId, TowerKind};

/// Dense map from grid cell to the tower standing on it.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<TowerId>>,
}

impl OccupancyGrid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    pub(crate) fn occupy(&mut self, tower: TowerId, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(tower);
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Checks whether a tower of `kind` may be placed on `cell` with `money` to spend.
///
/// Rejections are reported in a fixed order: cells outside the grid, cells on
/// the path, occupied cells, and finally missing funds. Returns the cost to
/// deduct on success.
pub(crate) fn validate(
    cell: CellCoord,
    kind: TowerKind,
    money: u32,
    grid: &Grid,
    path: &Path,
    occupancy: &OccupancyGrid,
) -> Result<u32, PlacementError> {
    if !grid.contains(cell) {
        return Err(PlacementError::OutOfBounds);
    }

    if path.covers(cell) {
        return Err(PlacementError::OnPath);
    }

    if occupancy.occupant(cell).is_some() {
        return Err(PlacementError::OccupiedCell);
    }

    let cost = kind.cost();
    if money < cost {
        return Err(PlacementError::InsufficientFunds {
            required: cost,
            available: money,
        });
    }

    Ok(cost)
}
