//! Session configuration loaded from TOML.
//!
//! Every field has a default matching the classic single-lane session, so a
//! file only needs to mention the values it changes:
//!
//! ```toml
//! [economy]
//! money = 300
//!
//! [path]
//! waypoints = [{ column = 0, row = 2 }, { column = 9, row = 2 }, { column = 9, row = 8 }]
//! ```

use std::{
    fs,
    path::{Path as FsPath, PathBuf},
    time::Duration,
};

use log::debug;
use path_defence_core::{CellCoord, EnemyStats, Grid, Health, Path, PathError, Timestamp};
use path_defence_system_projectiles::Config as ProjectileConfig;
use path_defence_system_spawning::Config as SpawningConfig;
use path_defence_world::Config as WorldConfig;
use serde::Deserialize;
use thiserror::Error;

/// Reasons a session configuration cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read session config {}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or has unexpected fields.
    #[error("failed to parse session config")]
    Parse(#[from] toml::de::Error),
    /// The grid has no cells.
    #[error("grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The waypoints or cell size do not describe a walkable path.
    #[error("invalid path")]
    Path(#[from] PathError),
    /// A waypoint lies outside the grid.
    #[error("waypoint ({column}, {row}) lies outside the {columns}x{rows} grid")]
    WaypointOutsideGrid {
        /// Waypoint column.
        column: u32,
        /// Waypoint row.
        row: u32,
        /// Grid column count.
        columns: u32,
        /// Grid row count.
        rows: u32,
    },
    /// The session would start already lost.
    #[error("a session needs at least one life")]
    NoLives,
    /// Enemies would spawn dead.
    #[error("enemy base health must be positive, got {0}")]
    BaseHealth(i32),
    /// Difficulty increases would weaken enemies.
    #[error("enemy health step must not be negative, got {0}")]
    HealthStep(i32),
    /// A rate or distance is negative, zero where it must not be, or not finite.
    #[error("{name} must be {requirement}, got {value}")]
    OutOfRange {
        /// Setting that failed validation.
        name: &'static str,
        /// Constraint the setting must satisfy.
        requirement: &'static str,
        /// Offending value.
        value: f32,
    },
}

/// Complete description of a session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Placement grid.
    pub grid: GridConfig,
    /// Route enemies walk.
    pub path: PathConfig,
    /// Lives, starting money and rewards.
    pub economy: EconomyConfig,
    /// Enemy stats and spawn cadence.
    pub enemies: EnemyConfig,
    /// Bullet flight.
    pub bullets: BulletConfig,
}

/// Placement grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Side length of a cell in world units.
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 12,
            cell_size: 40.0,
        }
    }
}

/// Waypoints of the enemy route, in walking order.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    /// Grid cells the path passes through.
    pub waypoints: Vec<CellCoord>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            waypoints: vec![CellCoord::new(0, 6), CellCoord::new(15, 6)],
        }
    }
}

/// Lives and money.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomyConfig {
    /// Lives the player starts with.
    pub lives: u32,
    /// Money the player starts with.
    pub money: u32,
    /// Money paid per kill.
    pub kill_reward: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            lives: 10,
            money: 150,
            kill_reward: 10,
        }
    }
}

/// Enemy stats and the timers that spawn and strengthen them.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyConfig {
    /// Health of enemies spawned before the first difficulty increase.
    pub base_health: i32,
    /// Speed in world units per tick before the first difficulty increase.
    pub base_speed: f32,
    /// Health added on every difficulty increase.
    pub health_step: i32,
    /// Speed added on every difficulty increase.
    pub speed_step: f32,
    /// Milliseconds that must be exceeded between two spawns.
    pub spawn_interval_ms: u64,
    /// Milliseconds that must be exceeded between two difficulty increases.
    pub difficulty_interval_ms: u64,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            base_health: 10,
            base_speed: 1.0,
            health_step: 5,
            speed_step: 0.2,
            spawn_interval_ms: 2_000,
            difficulty_interval_ms: 30_000,
        }
    }
}

/// Bullet flight parameters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BulletConfig {
    /// Distance travelled per tick in world units.
    pub speed: f32,
    /// A bullet strikes once strictly closer than this to its target.
    pub impact_radius: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 4.0,
            impact_radius: 4.0,
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from TOML text; missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        let _ = config.world_config(Timestamp::default())?;
        Ok(config)
    }

    /// Reads and parses the configuration file at `path`.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!(
            "loaded session config from {}: {}x{} grid, {} waypoints",
            path.display(),
            config.grid.columns,
            config.grid.rows,
            config.path.waypoints.len()
        );
        Ok(config)
    }

    /// Validates the configuration and builds the world parameters for a session
    /// starting at `start`.
    pub(crate) fn world_config(&self, start: Timestamp) -> Result<WorldConfig, ConfigError> {
        let GridConfig {
            columns,
            rows,
            cell_size,
        } = self.grid;
        if columns == 0 || rows == 0 {
            return Err(ConfigError::EmptyGrid { columns, rows });
        }

        let grid = Grid::new(columns, rows, cell_size);
        let path = Path::new(self.path.waypoints.clone(), cell_size)?;
        if let Some(outside) = path.waypoints().iter().find(|cell| !grid.contains(**cell)) {
            return Err(ConfigError::WaypointOutsideGrid {
                column: outside.column(),
                row: outside.row(),
                columns,
                rows,
            });
        }

        if self.economy.lives == 0 {
            return Err(ConfigError::NoLives);
        }

        let enemies = self.enemies;
        if enemies.base_health <= 0 {
            return Err(ConfigError::BaseHealth(enemies.base_health));
        }
        if enemies.health_step < 0 {
            return Err(ConfigError::HealthStep(enemies.health_step));
        }
        non_negative("enemies.base_speed", enemies.base_speed)?;
        non_negative("enemies.speed_step", enemies.speed_step)?;
        positive("bullets.speed", self.bullets.speed)?;
        positive("bullets.impact_radius", self.bullets.impact_radius)?;

        Ok(WorldConfig {
            grid,
            path,
            lives: self.economy.lives,
            money: self.economy.money,
            kill_reward: self.economy.kill_reward,
            base_stats: EnemyStats::new(Health::new(enemies.base_health), enemies.base_speed),
            difficulty_step: EnemyStats::new(Health::new(enemies.health_step), enemies.speed_step),
            start,
        })
    }

    pub(crate) fn spawning_config(&self, start: Timestamp) -> SpawningConfig {
        SpawningConfig::new(
            Duration::from_millis(self.enemies.spawn_interval_ms),
            Duration::from_millis(self.enemies.difficulty_interval_ms),
            start,
        )
    }

    pub(crate) fn projectile_config(&self) -> ProjectileConfig {
        ProjectileConfig::new(self.bullets.speed, self.bullets.impact_radius)
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            requirement: "positive and finite",
            value,
        })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            requirement: "non-negative and finite",
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_the_classic_session() {
        let config = SessionConfig::from_toml_str("").expect("defaults are valid");

        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.grid.columns, 16);
        assert_eq!(config.grid.rows, 12);
        assert_eq!(config.economy.lives, 10);
        assert_eq!(config.economy.money, 150);
        assert_eq!(config.enemies.spawn_interval_ms, 2_000);
        assert_eq!(config.enemies.difficulty_interval_ms, 30_000);
        assert_eq!(
            config.path.waypoints,
            vec![CellCoord::new(0, 6), CellCoord::new(15, 6)]
        );
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            [economy]
            money = 300

            [path]
            waypoints = [{ column = 0, row = 2 }, { column = 9, row = 2 }, { column = 9, row = 8 }]
            "#,
        )
        .expect("valid config");

        assert_eq!(config.economy.money, 300);
        assert_eq!(config.economy.lives, 10);
        assert_eq!(config.path.waypoints.len(), 3);
        assert_eq!(config.bullets, BulletConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = SessionConfig::from_toml_str("[economy]\ngold = 5\n").expect_err("unknown key");

        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn waypoints_must_lie_on_the_grid() {
        let error = SessionConfig::from_toml_str(
            "[path]\nwaypoints = [{ column = 0, row = 0 }, { column = 16, row = 0 }]\n",
        )
        .expect_err("waypoint outside grid");

        assert_eq!(
            error.to_string(),
            "waypoint (16, 0) lies outside the 16x12 grid"
        );
    }

    #[test]
    fn single_waypoint_is_not_a_path() {
        let error = SessionConfig::from_toml_str("[path]\nwaypoints = [{ column = 0, row = 0 }]\n")
            .expect_err("too short");

        assert!(matches!(error, ConfigError::Path(PathError::TooShort(1))));
    }

    #[test]
    fn sessions_need_lives_and_live_enemies() {
        let error = SessionConfig::from_toml_str("[economy]\nlives = 0\n").expect_err("no lives");
        assert!(matches!(error, ConfigError::NoLives));

        let error =
            SessionConfig::from_toml_str("[enemies]\nbase_health = 0\n").expect_err("dead spawn");
        assert!(matches!(error, ConfigError::BaseHealth(0)));

        let error = SessionConfig::from_toml_str(
            "[enemies]\nhealth_step = -20\ndifficulty_interval_ms = 0\nspawn_interval_ms = 0\n",
        )
        .expect_err("weakening difficulty");
        assert!(matches!(error, ConfigError::HealthStep(-20)));

        let error = SessionConfig::from_toml_str("[enemies]\nspeed_step = -0.5\n")
            .expect_err("slowing difficulty");
        assert_eq!(
            error.to_string(),
            "enemies.speed_step must be non-negative and finite, got -0.5"
        );

        let error =
            SessionConfig::from_toml_str("[bullets]\nspeed = 0.0\n").expect_err("frozen bullets");
        assert_eq!(
            error.to_string(),
            "bullets.speed must be positive and finite, got 0"
        );
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = SessionConfig::load("/definitely/not/here.toml").expect_err("missing file");

        assert!(matches!(error, ConfigError::Io { .. }));
        assert!(error.to_string().contains("/definitely/not/here.toml"));
    }
}
