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

use std::time::Instant;

use serde_derive::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::accumulator::{CoratingAccumulator, CoratingMatrix};
use crate::catalog::{ItemCatalog, ItemIndex};
use crate::error::{HirError, Result};
use crate::stats::RatingSource;
use crate::stochastic::DenseMatrix;
use crate::types::ItemId;
use crate::utils;
use crate::vectors::SparseVector;

/// Immutable snapshot of everything the scorer needs: the normalized co-rating matrix, the
/// row-stochastic `items x genres` matrix and the column-stochastic `genres x items` matrix.
/// There are no mutating methods, so a model can be shared by any number of concurrent readers.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct HirModel {
    index: ItemIndex,
    coratings: CoratingMatrix,
    row_stochastic: DenseMatrix,
    column_stochastic: DenseMatrix,
    #[serde(skip)]
    empty_row: SparseVector,
}

impl HirModel {

    pub fn new(
        index: ItemIndex,
        coratings: CoratingMatrix,
        row_stochastic: DenseMatrix,
        column_stochastic: DenseMatrix,
    ) -> Result<Self> {

        let model = HirModel {
            index,
            coratings,
            row_stochastic,
            column_stochastic,
            empty_row: SparseVector::empty(),
        };

        model.check_shapes()?;

        Ok(model)
    }

    /// The dense matrices must line up with the item index, and with each other.
    pub(crate) fn check_shapes(&self) -> Result<()> {
        let num_items = self.index.len();

        if self.row_stochastic.num_rows() != num_items {
            return Err(HirError::MatrixShape {
                expected: num_items,
                found: self.row_stochastic.num_rows(),
            });
        }

        if self.column_stochastic.num_cols() != num_items {
            return Err(HirError::MatrixShape {
                expected: num_items,
                found: self.column_stochastic.num_cols(),
            });
        }

        if self.column_stochastic.num_rows() != self.row_stochastic.num_cols() {
            return Err(HirError::MatrixShape {
                expected: self.row_stochastic.num_cols(),
                found: self.column_stochastic.num_rows(),
            });
        }

        Ok(())
    }

    pub fn items(&self) -> &[ItemId] {
        self.index.items()
    }

    pub fn index(&self) -> &ItemIndex {
        &self.index
    }

    pub fn num_items(&self) -> usize {
        self.index.len()
    }

    pub fn feature_dimension(&self) -> usize {
        self.row_stochastic.num_cols()
    }

    pub fn row_stochastic(&self) -> &DenseMatrix {
        &self.row_stochastic
    }

    pub fn column_stochastic(&self) -> &DenseMatrix {
        &self.column_stochastic
    }

    /// Normalized co-rating row of `item`. Items without co-ratings, and items we have never
    /// seen, get an empty row which reads as zero everywhere.
    pub fn coratings_vector(&self, item: ItemId) -> &SparseVector {
        self.coratings.row(item).unwrap_or(&self.empty_row)
    }

    /// Number of users who rated both items. Symmetric, and zero for self-pairs.
    pub fn get_coratings(&self, item_a: ItemId, item_b: ItemId) -> u32 {
        self.coratings.count(item_a, item_b)
    }

    pub fn num_corated_pairs(&self) -> usize {
        self.coratings.num_pairs()
    }

    /// Diffuses the genre row of `item` through the column-stochastic matrix and reads off the
    /// mass that lands on each of the `candidates`. Candidates outside of the model are skipped.
    pub fn proximity_vector(&self, item: ItemId, candidates: &[ItemId]) -> Result<SparseVector> {

        let position = self.index.position(item).ok_or(HirError::UnknownItem(item))?;

        let diffused = self.column_stochastic.pre_multiply(self.row_stochastic.row(position));

        let proximities = candidates.iter()
            .filter_map(|candidate| {
                self.index.position(*candidate).map(|column| (*candidate, diffused[column]))
            })
            .collect();

        Ok(proximities)
    }
}

/// Builds a `HirModel` from an item catalog and the users' rating histories in a single pass.
pub struct HirModelBuilder<'a, C: ?Sized, R: ?Sized> {
    catalog: &'a C,
    ratings: &'a R,
}

impl<'a, C, R> HirModelBuilder<'a, C, R>
    where C: ItemCatalog + ?Sized, R: RatingSource + ?Sized {

    pub fn new(catalog: &'a C, ratings: &'a R) -> Self {
        HirModelBuilder { catalog, ratings }
    }

    pub fn build(&self) -> Result<HirModel> {

        let build_start = Instant::now();

        let mut accumulator = CoratingAccumulator::new(self.catalog)?;

        debug!(
            "Prepared accumulator for {} items with {} genres",
            accumulator.index().len(),
            self.catalog.feature_dimension()
        );

        let mut num_users: usize = 0;
        for (_, history) in self.ratings.histories() {
            accumulator.put_user_history(history)?;
            num_users += 1;
        }

        let coratings = accumulator.build_matrix()?;
        let row_stochastic = accumulator.row_stochastic_features();
        let column_stochastic = accumulator.column_stochastic_features();

        let index = accumulator.index().clone();

        info!(
            "{} users, {} co-rated item pairs, {}ms model build time",
            num_users,
            coratings.num_pairs(),
            utils::to_millis(build_start.elapsed())
        );

        HirModel::new(index, coratings, row_stochastic, column_stochastic)
    }
}
