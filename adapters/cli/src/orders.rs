//! Parsers for the scripted placements and clicks accepted on the command line.

use glam::Vec2;
use path_defence_core::{CellCoord, TowerKind};
use thiserror::Error;

const FIELD_DELIMITER: char = ',';

/// Tower placement requested with `--tower COLUMN,ROW[,KIND]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerOrder {
    /// Cell the tower should occupy.
    pub(crate) cell: CellCoord,
    /// Requested tower type; the current selection when omitted.
    pub(crate) kind: Option<TowerKind>,
}

/// Errors that can occur while parsing command-line orders.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum OrderError {
    /// The value was empty or contained only whitespace.
    #[error("order was empty")]
    Empty,
    /// A coordinate could not be parsed.
    #[error("could not parse coordinates '{0}'")]
    InvalidCoordinates(String),
    /// The tower type is not known.
    #[error("tower type '{0}' is not supported, expected 'basic' or 'advanced'")]
    UnknownKind(String),
}

/// Parses `COLUMN,ROW[,KIND]`.
pub(crate) fn parse_tower_order(value: &str) -> Result<TowerOrder, OrderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OrderError::Empty);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let column = parts.next().unwrap_or_default();
    let row = parts
        .next()
        .ok_or_else(|| OrderError::InvalidCoordinates(trimmed.to_owned()))?;
    let column = parse_index(column, trimmed)?;
    let row = parse_index(row, trimmed)?;

    let kind = parts.next().map(parse_kind).transpose()?;

    Ok(TowerOrder {
        cell: CellCoord::new(column, row),
        kind,
    })
}

/// Parses a pointer position `X,Y` in world units.
pub(crate) fn parse_click(value: &str) -> Result<Vec2, OrderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OrderError::Empty);
    }

    let (x, y) = trimmed
        .split_once(FIELD_DELIMITER)
        .ok_or_else(|| OrderError::InvalidCoordinates(trimmed.to_owned()))?;
    let x = x
        .trim()
        .parse::<f32>()
        .map_err(|_| OrderError::InvalidCoordinates(trimmed.to_owned()))?;
    let y = y
        .trim()
        .parse::<f32>()
        .map_err(|_| OrderError::InvalidCoordinates(trimmed.to_owned()))?;

    Ok(Vec2::new(x, y))
}

fn parse_index(value: &str, order: &str) -> Result<u32, OrderError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| OrderError::InvalidCoordinates(order.to_owned()))
}

fn parse_kind(value: &str) -> Result<TowerKind, OrderError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "basic" | "1" => Ok(TowerKind::Basic),
        "advanced" | "2" => Ok(TowerKind::Advanced),
        other => Err(OrderError::UnknownKind(other.to_owned())),
    }
}
