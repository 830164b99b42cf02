//! Placement grid geometry and the fixed route enemies walk.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCoord;

/// Describes the placement grid and the world size of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cell_size: f32,
}

impl Grid {
    /// Creates a new grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, cell_size: f32) -> Self {
        Self {
            columns,
            rows,
            cell_size,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell expressed in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Total width of the grid measured in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Total height of the grid measured in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Reports whether the cell lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// World-space centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        cell_center(cell, self.cell_size)
    }

    /// Converts a world-space point into the cell containing it.
    ///
    /// Returns `None` for points outside the grid, including non-finite input.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<CellCoord> {
        if !(point.x >= 0.0 && point.y >= 0.0) || self.cell_size <= 0.0 {
            return None;
        }

        let column = (point.x / self.cell_size).floor();
        let row = (point.y / self.cell_size).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }
}

/// Reasons a path description may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PathError {
    /// Fewer than two waypoints were supplied.
    #[error("a path needs at least two waypoints, got {0}")]
    TooShort(usize),
    /// The cell size is zero, negative or not finite.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
}

/// Start and end of the path segment an enemy is currently walking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// World-space position of the waypoint the segment leaves.
    pub start: Vec2,
    /// World-space position of the waypoint the segment leads to.
    pub end: Vec2,
}

/// Immutable ordered sequence of waypoints traversed by every enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<CellCoord>,
    cell_size: f32,
    cells: BTreeSet<CellCoord>,
}

impl Path {
    /// Creates a path from grid waypoints laid out with the provided cell size.
    pub fn new(waypoints: Vec<CellCoord>, cell_size: f32) -> Result<Self, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooShort(waypoints.len()));
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(PathError::InvalidCellSize(cell_size));
        }

        let cells = rasterize(&waypoints);
        Ok(Self {
            waypoints,
            cell_size,
            cells,
        })
    }

    /// Number of waypoints on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path holds no waypoints, which `Path::new` never allows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoints in traversal order.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Side length of a grid cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World-space position of the waypoint at `index`.
    #[must_use]
    pub fn waypoint_position(&self, index: usize) -> Option<Vec2> {
        self.waypoints
            .get(index)
            .map(|cell| cell_center(*cell, self.cell_size))
    }

    /// World-space position where enemies enter the path.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoint_position(0).unwrap_or(Vec2::ZERO)
    }

    /// Segment walked by an enemy whose last reached waypoint is `path_index`.
    ///
    /// Returns `None` once the index is terminal.
    #[must_use]
    pub fn segment(&self, path_index: usize) -> Option<Segment> {
        if self.is_terminal(path_index) {
            return None;
        }

        Some(Segment {
            start: self.waypoint_position(path_index)?,
            end: self.waypoint_position(path_index + 1)?,
        })
    }

    /// Reports whether `path_index` refers to the final waypoint (or beyond).
    #[must_use]
    pub fn is_terminal(&self, path_index: usize) -> bool {
        path_index >= self.waypoints.len().saturating_sub(1)
    }

    /// Reports whether the route passes through the provided cell.
    #[must_use]
    pub fn covers(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Every cell the route passes through, in ascending cell order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }
}

fn cell_center(cell: CellCoord, cell_size: f32) -> Vec2 {
    Vec2::new(
        cell.column() as f32 * cell_size + cell_size / 2.0,
        cell.row() as f32 * cell_size + cell_size / 2.0,
    )
}

fn rasterize(waypoints: &[CellCoord]) -> BTreeSet<CellCoord> {
    let mut cells = BTreeSet::new();
    for pair in waypoints.windows(2) {
        trace_line(pair[0], pair[1], &mut cells);
    }
    cells
}

// Bresenham; axis-aligned segments cover every cell between their endpoints.
fn trace_line(from: CellCoord, to: CellCoord, cells: &mut BTreeSet<CellCoord>) {
    let (mut column, mut row) = (i64::from(from.column()), i64::from(from.row()));
    let (end_column, end_row) = (i64::from(to.column()), i64::from(to.row()));

    let delta_column = (end_column - column).abs();
    let delta_row = -(end_row - row).abs();
    let step_column = if column < end_column { 1 } else { -1 };
    let step_row = if row < end_row { 1 } else { -1 };
    let mut error = delta_column + delta_row;

    loop {
        let _ = cells.insert(CellCoord::new(column as u32, row as u32));
        if column == end_column && row == end_row {
            break;
        }

        let doubled = error * 2;
        if doubled >= delta_row {
            error += delta_row;
            column += step_column;
        }
        if doubled <= delta_column {
            error += delta_column;
            row += step_row;
        }
    }
}
