use path_defence_core::{CellCoord, Command, Event, TowerKind};
use path_defence_system_builder::{Builder, BuilderInput};

#[test]
fn confirm_places_the_selected_tower_under_the_cursor() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        BuilderInput {
            confirm_action: true,
            cursor_cell: Some(CellCoord::new(2, 2)),
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::PlaceTower {
            cell: CellCoord::new(2, 2),
            kind: TowerKind::Basic,
        }],
        "builder should place the default selection when confirming",
    );
}

#[test]
fn confirm_without_cursor_is_ignored() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        BuilderInput {
            confirm_action: true,
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert!(
        commands.is_empty(),
        "confirm outside the grid must not emit commands"
    );
}

#[test]
fn selection_applies_to_a_confirm_on_the_same_frame() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        BuilderInput::new(
            Some(TowerKind::Advanced),
            true,
            Some(CellCoord::new(4, 1)),
        ),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::SelectTowerType {
                kind: TowerKind::Advanced,
            },
            Command::PlaceTower {
                cell: CellCoord::new(4, 1),
                kind: TowerKind::Advanced,
            },
        ],
    );
    assert_eq!(builder.selected(), TowerKind::Advanced);
}

#[test]
fn selection_follows_world_events() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[Event::TowerTypeSelected {
            kind: TowerKind::Advanced,
        }],
        BuilderInput::default(),
        &mut commands,
    );

    assert!(commands.is_empty());
    assert_eq!(builder.selected(), TowerKind::Advanced);
}
