/**
 * HirReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::io;

use thiserror::Error;

use crate::types::ItemId;

/// Everything that can go wrong while building or persisting a model. Query-time gaps (unknown
/// candidates, candidates without informative neighbors) are never errors, they simply do not
/// show up in the score map.
#[derive(Debug, Error)]
pub enum HirError {
    #[error("Model is already built")]
    AlreadyBuilt,

    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("No feature vector for item {0}")]
    MissingFeatures(ItemId),

    #[error("Feature vector of item {0} contains a value that is not a finite number")]
    NonFiniteFeature(ItemId),

    #[error("Feature vector of item {item} has {found} dimensions, expected {expected}")]
    FeatureDimensionMismatch {
        item: ItemId,
        expected: usize,
        found: usize,
    },

    #[error("Matrix rows must all have {expected} columns, found a row with {found}")]
    MatrixShape { expected: usize, found: usize },

    #[error("Invalid preference domain [{min}, {max}]")]
    InvalidDomain { min: f64, max: f64 },

    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HirError>;
