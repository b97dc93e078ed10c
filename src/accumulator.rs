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

use std::convert::TryFrom;

use serde_derive::{Deserialize, Serialize};

use crate::catalog::{ItemCatalog, ItemIndex};
use crate::error::{HirError, Result};
use crate::rows::{SparseRowStore, SymmetricCounts};
use crate::stochastic::{self, DenseMatrix};
use crate::types::ItemId;
use crate::vectors::{self, MutableSparseVector, SparseEntries, SparseVector};

/// Finalized co-rating data: the raw symmetric counts and, per item, the co-rating row scaled
/// to sum to one.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct CoratingMatrix {
    counts: SymmetricCounts,
    normalized: SparseRowStore<SparseVector>,
}

impl CoratingMatrix {

    pub fn count(&self, item_a: ItemId, item_b: ItemId) -> u32 {
        self.counts.count(item_a, item_b)
    }

    pub fn row(&self, item: ItemId) -> Option<&SparseVector> {
        self.normalized.get(item)
    }

    pub fn num_pairs(&self) -> usize {
        self.counts.num_pairs()
    }
}

/// Single-use accumulator for co-rating counts. It also holds the raw feature matrix, with one
/// row per known item in the order given by its `ItemIndex`.
pub struct CoratingAccumulator {
    index: ItemIndex,
    work: Option<SymmetricCounts>,
    features: DenseMatrix,
}

impl CoratingAccumulator {

    pub fn new<C>(catalog: &C) -> Result<Self> where C: ItemCatalog + ?Sized {

        let index = ItemIndex::new(catalog.item_ids());
        let feature_dimension = catalog.feature_dimension();

        let mut work = SymmetricCounts::with_capacity(index.len());
        let mut features = DenseMatrix::zeros(index.len(), feature_dimension);

        for (position, item) in index.items().iter().enumerate() {
            let vector = catalog.feature_vector(*item)?;

            if vector.iter().any(|value| !value.is_finite()) {
                return Err(HirError::NonFiniteFeature(*item));
            }

            if vector.len() != feature_dimension {
                return Err(HirError::FeatureDimensionMismatch {
                    item: *item,
                    expected: feature_dimension,
                    found: vector.len(),
                });
            }

            features.set_row(position, vector);
            work.preallocate(*item);
        }

        Ok(CoratingAccumulator { index, work: Some(work), features })
    }

    pub fn index(&self) -> &ItemIndex {
        &self.index
    }

    pub fn is_built(&self) -> bool {
        self.work.is_none()
    }

    /// Adds the number of keys both vectors share to the count of the pair. Only the call with
    /// `id_a < id_b` counts, the mirrored call is a no-op so that every pair is stored once.
    pub fn put_item_pair<A, B>(
        &mut self,
        id_a: ItemId,
        vector_a: &A,
        id_b: ItemId,
        vector_b: &B,
    ) -> Result<()>
        where A: SparseEntries + ?Sized, B: SparseEntries + ?Sized {

        let index = &self.index;
        let work = self.work.as_mut().ok_or(HirError::AlreadyBuilt)?;

        if id_a < id_b {
            for item in &[id_a, id_b] {
                if !index.contains(*item) {
                    return Err(HirError::UnknownItem(*item));
                }
            }

            let coratings = vectors::intersect(vector_a, vector_b).count();
            work.increment(id_a, id_b, u32::try_from(coratings).unwrap_or(u32::MAX));
        }

        Ok(())
    }

    /// Counts one co-rating for every unordered pair of items in a single user's history.
    pub fn put_user_history<H>(&mut self, history: &H) -> Result<()>
        where H: SparseEntries + ?Sized {

        let index = &self.index;
        let work = self.work.as_mut().ok_or(HirError::AlreadyBuilt)?;

        let mut items: Vec<ItemId> = history.keys().cloned().collect();
        items.sort_unstable();

        if let Some(unknown) = items.iter().find(|item| !index.contains(**item)) {
            return Err(HirError::UnknownItem(*unknown));
        }

        for (position, item) in items.iter().enumerate() {
            for other_item in &items[position + 1..] {
                work.increment(*item, *other_item, 1);
            }
        }

        Ok(())
    }

    /// Scales every item's co-rating row by the inverse of its sum (rows summing to zero are
    /// left alone) and freezes the result. The accumulator cannot be used for counting after
    /// this.
    pub fn build_matrix(&mut self) -> Result<CoratingMatrix> {

        let counts = self.work.take().ok_or(HirError::AlreadyBuilt)?;

        let mut rows: SparseRowStore<MutableSparseVector> =
            SparseRowStore::with_capacity(self.index.len());

        for item in self.index.items() {
            rows.put(*item, MutableSparseVector::new());
        }

        for (lower, upper, count) in counts.pairs() {
            rows.row_mut(lower).add(upper, f64::from(count));
            rows.row_mut(upper).add(lower, f64::from(count));
        }

        for (_, row) in rows.entries_mut() {
            let sum = row.sum();
            if sum != 0.0 {
                row.multiply(1.0 / sum);
            }
        }

        let normalized = rows.map_rows(|_, row| row.freeze());

        Ok(CoratingMatrix { counts, normalized })
    }

    pub fn row_stochastic_features(&self) -> DenseMatrix {
        stochastic::row_stochastic(&self.features)
    }

    pub fn column_stochastic_features(&self) -> DenseMatrix {
        stochastic::transpose_and_row_stochastic(&self.features)
    }
}
