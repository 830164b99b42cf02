#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system responsible for emitting tower selection and placement commands.

use path_defence_core::{CellCoord, Command, Event, TowerKind};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Tower type the player switched to on this frame, if any.
    pub select: Option<TowerKind>,
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Cell currently under the cursor.
    pub cursor_cell: Option<CellCoord>,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(
        select: Option<TowerKind>,
        confirm_action: bool,
        cursor_cell: Option<CellCoord>,
    ) -> Self {
        Self {
            select,
            confirm_action,
            cursor_cell,
        }
    }
}

/// Maps the number-row hotkeys to tower types: `1` is basic, `2` is advanced.
#[must_use]
pub const fn kind_for_hotkey(key: char) -> Option<TowerKind> {
    match key {
        '1' => Some(TowerKind::Basic),
        '2' => Some(TowerKind::Advanced),
        _ => None,
    }
}

/// Input system that translates selection and confirm input into commands.
#[derive(Debug, Clone)]
pub struct Builder {
    selected: TowerKind,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a new builder system with the basic tower selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: TowerKind::Basic,
        }
    }

    /// Tower type the next confirmed placement will request.
    #[must_use]
    pub const fn selected(&self) -> TowerKind {
        self.selected
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    ///
    /// A selection made on the same frame as a confirm applies to that confirm.
    pub fn handle(&mut self, events: &[Event], input: BuilderInput, out: &mut Vec<Command>) {
        for event in events {
            if let Event::TowerTypeSelected { kind } = event {
                self.selected = *kind;
            }
        }

        if let Some(kind) = input.select {
            self.selected = kind;
            out.push(Command::SelectTowerType { kind });
        }

        if input.confirm_action {
            if let Some(cell) = input.cursor_cell {
                out.push(Command::PlaceTower {
                    cell,
                    kind: self.selected,
                });
            }
        }
    }
}
