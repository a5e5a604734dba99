//! JSON shape of the shared grid document.
//!
//! `{ "cells": [{ "x", "y", "char", "confirmed", "definition"? }], "updatedAt": RFC3339 }`

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;

use crate::domain::{Cell, Coord, Letter};
use crate::error::AppError;
use crate::errors::domain::{DomainError, InfraErrorKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub x: i32,
    pub y: i32,
    pub char: String,
    #[serde(default = "confirmed_by_default")]
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

fn confirmed_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDocument {
    #[serde(default)]
    pub cells: Vec<CellRecord>,
    #[serde(
        rename = "updatedAt",
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

impl From<&Cell> for CellRecord {
    fn from(cell: &Cell) -> Self {
        Self {
            x: cell.coord.x,
            y: cell.coord.y,
            char: cell.letter.as_char().to_string(),
            confirmed: cell.confirmed,
            definition: cell.definition.clone(),
        }
    }
}

impl TryFrom<CellRecord> for Cell {
    type Error = DomainError;

    fn try_from(record: CellRecord) -> Result<Self, Self::Error> {
        let mut chars = record.char.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::parse(c).ok(),
            _ => None,
        }
        .ok_or_else(|| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!(
                    "invalid char {:?} at {},{}",
                    record.char, record.x, record.y
                ),
            )
        })?;

        Ok(Cell {
            coord: Coord::new(record.x, record.y),
            letter,
            confirmed: record.confirmed,
            definition: record.definition,
        })
    }
}

/// Serialize the confirmed cells into a document stamped with `now`.
pub fn encode(cells: &[Cell], now: OffsetDateTime) -> Result<String, AppError> {
    let doc = GridDocument {
        cells: cells
            .iter()
            .filter(|c| c.confirmed)
            .map(CellRecord::from)
            .collect(),
        updated_at: Some(now),
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Parse a document. Unconfirmed and malformed entries are dropped with a
/// warning; a document that is not JSON at all is an error.
pub fn decode(raw: &str) -> Result<Vec<Cell>, AppError> {
    let doc: GridDocument = serde_json::from_str(raw)?;
    Ok(doc
        .cells
        .into_iter()
        .filter(|record| record.confirmed)
        .filter_map(|record| match Cell::try_from(record) {
            Ok(cell) => Some(cell),
            Err(err) => {
                warn!(error = %err, "Dropping malformed cell from grid document");
                None
            }
        })
        .collect())
}
