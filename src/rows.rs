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

use std::collections::hash_map;

use fnv::FnvHashMap;
use serde_derive::{Deserialize, Serialize};

use crate::types::ItemId;

/// One sparse row per item. Whether a missing row means "all zero" or "error" is up to the
/// caller, `get` only reports absence.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct SparseRowStore<V> {
    rows: FnvHashMap<ItemId, V>,
}

impl<V> SparseRowStore<V> {

    pub fn with_capacity(num_rows: usize) -> Self {
        SparseRowStore { rows: FnvHashMap::with_capacity_and_hasher(num_rows, Default::default()) }
    }

    pub fn get(&self, item: ItemId) -> Option<&V> {
        self.rows.get(&item)
    }

    pub fn get_mut(&mut self, item: ItemId) -> Option<&mut V> {
        self.rows.get_mut(&item)
    }

    pub fn put(&mut self, item: ItemId, row: V) {
        self.rows.insert(item, row);
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.rows.contains_key(&item)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn entries(&self) -> hash_map::Iter<ItemId, V> {
        self.rows.iter()
    }

    pub fn entries_mut(&mut self) -> hash_map::IterMut<ItemId, V> {
        self.rows.iter_mut()
    }

    pub fn map_rows<W, F>(self, mut f: F) -> SparseRowStore<W>
        where F: FnMut(ItemId, V) -> W {

        let rows = self.rows.into_iter()
            .map(|(item, row)| (item, f(item, row)))
            .collect();

        SparseRowStore { rows }
    }
}

impl<V: Default> SparseRowStore<V> {

    /// Row for `item`, creating an empty one on first access.
    pub fn row_mut(&mut self, item: ItemId) -> &mut V {
        self.rows.entry(item).or_insert_with(V::default)
    }
}

/// Symmetric co-rating counts. A pair is only ever stored under the row of its smaller id, so
/// `count(a, b) == count(b, a)` holds by construction and the diagonal is always zero.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct SymmetricCounts {
    upper: SparseRowStore<FnvHashMap<ItemId, u32>>,
    num_pairs: usize,
}

/// Canonical `(smaller, larger)` key of an item pair, `None` for self-pairs.
pub fn canonical_pair(item_a: ItemId, item_b: ItemId) -> Option<(ItemId, ItemId)> {
    if item_a < item_b {
        Some((item_a, item_b))
    } else if item_b < item_a {
        Some((item_b, item_a))
    } else {
        None
    }
}

impl SymmetricCounts {

    pub fn with_capacity(num_items: usize) -> Self {
        SymmetricCounts { upper: SparseRowStore::with_capacity(num_items), num_pairs: 0 }
    }

    /// Makes sure `item` owns a (possibly empty) row.
    pub fn preallocate(&mut self, item: ItemId) {
        self.upper.row_mut(item);
    }

    /// Counts saturate at `u32::MAX`.
    pub fn increment(&mut self, item_a: ItemId, item_b: ItemId, by: u32) {
        if by == 0 {
            return;
        }

        if let Some((lower, upper)) = canonical_pair(item_a, item_b) {
            let count = self.upper.row_mut(lower).entry(upper).or_insert(0);
            if *count == 0 {
                self.num_pairs += 1;
            }
            *count = count.saturating_add(by);
        }
    }

    pub fn count(&self, item_a: ItemId, item_b: ItemId) -> u32 {
        canonical_pair(item_a, item_b)
            .and_then(|(lower, upper)| {
                self.upper.get(lower).and_then(|row| row.get(&upper).cloned())
            })
            .unwrap_or(0)
    }

    /// Number of distinct item pairs with a nonzero count.
    pub fn num_pairs(&self) -> usize {
        self.num_pairs
    }

    /// Every stored pair exactly once, as `(smaller, larger, count)`.
    pub fn pairs<'a>(&'a self) -> impl Iterator<Item=(ItemId, ItemId, u32)> + 'a {
        self.upper.entries().flat_map(|(lower, row)| {
            row.iter().map(move |(upper, count)| (*lower, *upper, *count))
        })
    }
}
