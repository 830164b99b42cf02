#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Path Defence session headlessly.

mod logging;
mod orders;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use log::{debug, info, warn};
use path_defence_core::{Event, Timestamp, TowerKind};
use path_defence_engine::{kind_for_hotkey, BuilderInput, SessionConfig, Simulation};

use crate::orders::{parse_click, parse_tower_order, TowerOrder};

/// Plays a Path Defence session without a window and reports how long the defence held.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// TOML file overriding the default session configuration.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = 3_600)]
    frames: u64,
    /// Milliseconds between two frames.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Tower type hotkey pressed before placing towers: 1 for basic, 2 for advanced.
    #[arg(long, value_name = "KEY")]
    select: Option<char>,
    /// Places a tower before the first frame. Repeatable.
    #[arg(long = "tower", value_name = "COLUMN,ROW[,KIND]", value_parser = parse_tower_order)]
    towers: Vec<TowerOrder>,
    /// Clicks a pointer position in world units before the first frame. Repeatable.
    #[arg(long = "click", value_name = "X,Y", value_parser = parse_click)]
    clicks: Vec<Vec2>,
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Path Defence command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init(args.verbose);

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load session config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let start = Timestamp::from_millis(0);
    let mut simulation = Simulation::new(config, start).context("failed to start session")?;
    println!("{}", simulation.welcome_banner());
    brief(&simulation);

    if let Some(key) = args.select {
        let kind = kind_for_hotkey(key)
            .with_context(|| format!("'{key}' is not a tower hotkey, expected 1 or 2"))?;
        simulation.select_tower_type(kind);
    }

    place_towers(&mut simulation, &args.towers);
    click(&mut simulation, &args.clicks);

    let mut events = Vec::new();
    let mut snapshot = simulation.snapshot();
    for frame in 1..=args.frames {
        events.clear();
        let offset = Duration::from_millis(args.frame_ms.saturating_mul(frame));
        snapshot = simulation.tick(start.saturating_add(offset), &mut events);
        for event in &events {
            report(event);
        }
        if snapshot.game_over.is_some() {
            break;
        }
    }

    match simulation.game_over() {
        Some(outcome) => println!(
            "Game over! You survived for {} seconds.",
            outcome.elapsed_seconds()
        ),
        None => println!(
            "Still defending after {} seconds with {} of {} lives, {} money and {} enemies on the path.",
            snapshot.elapsed_seconds(),
            snapshot.lives,
            simulation.config().economy.lives,
            snapshot.money,
            snapshot.enemies.len()
        ),
    }

    Ok(())
}

fn brief(simulation: &Simulation) {
    let grid = simulation.grid();
    let path = simulation.path();
    println!(
        "Field {}x{} ({} by {} units), path of {} waypoints over {} cells.",
        grid.columns(),
        grid.rows(),
        grid.width(),
        grid.height(),
        path.len(),
        path.cells().count()
    );

    let prices: Vec<String> = TowerKind::ALL
        .iter()
        .map(|kind| format!("{} {}", kind.label(), kind.cost()))
        .collect();
    println!(
        "Starting money {}, towers: {}.",
        simulation.config().economy.money,
        prices.join(", ")
    );
}

// Outcomes are reported with the first tick's events.
fn place_towers(simulation: &mut Simulation, towers: &[TowerOrder]) {
    for order in towers {
        let kind = order
            .kind
            .unwrap_or_else(|| simulation.snapshot().selected_tower_kind);
        let _ = simulation.place_tower(order.cell, kind);
    }
}

fn click(simulation: &mut Simulation, clicks: &[Vec2]) {
    let mut events = Vec::new();
    for &point in clicks {
        let Some(cell) = simulation.grid().cell_at(point) else {
            warn!("click at ({}, {}) lies outside the grid", point.x, point.y);
            continue;
        };
        simulation.handle_input(BuilderInput::new(None, true, Some(cell)), &mut events);
    }

    for event in &events {
        report(event);
    }
}

fn report(event: &Event) {
    match event {
        Event::TowerPlaced {
            tower, kind, cell, ..
        } => info!(
            "{} {} placed at ({}, {})",
            kind.label(),
            tower.get(),
            cell.column(),
            cell.row()
        ),
        Event::TowerPlacementRejected { kind, cell, reason } => warn!(
            "cannot place {} at ({}, {}): {reason}",
            kind.label(),
            cell.column(),
            cell.row()
        ),
        Event::EnemyReachedEnd { enemy, lives } => {
            info!("enemy {} got through, {lives} lives left", enemy.get());
        }
        Event::EnemyKilled { enemy, reward, .. } => {
            debug!("enemy {} killed for {reward} money", enemy.get());
        }
        _ => {}
    }
}
