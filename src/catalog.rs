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

use fnv::FnvHashMap;
use serde_derive::{Deserialize, Serialize};

use crate::error::{HirError, Result};
use crate::types::ItemId;

/// Source of the known items and their genre/feature vectors.
pub trait ItemCatalog {

    fn item_ids(&self) -> &[ItemId];

    /// Fails with `MissingFeatures` for items the catalog has no vector for.
    fn feature_vector(&self, item: ItemId) -> Result<&[f64]>;

    fn feature_dimension(&self) -> usize;
}

/// In-memory catalog. The feature dimension is fixed by the first vector added and every other
/// vector has to agree with it.
#[derive(Clone, Debug, Default)]
pub struct MapItemCatalog {
    features: FnvHashMap<ItemId, Vec<f64>>,
    item_ids: Vec<ItemId>,
    feature_dimension: usize,
}

impl MapItemCatalog {

    pub fn from_features<I>(features: I) -> Result<Self>
        where I: IntoIterator<Item=(ItemId, Vec<f64>)> {

        let mut catalog = MapItemCatalog::default();
        for (item, vector) in features {
            catalog.insert(item, vector)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, item: ItemId, vector: Vec<f64>) -> Result<()> {
        if vector.iter().any(|value| !value.is_finite()) {
            return Err(HirError::NonFiniteFeature(item));
        }

        if self.features.is_empty() {
            self.feature_dimension = vector.len();
        } else if vector.len() != self.feature_dimension {
            return Err(HirError::FeatureDimensionMismatch {
                item,
                expected: self.feature_dimension,
                found: vector.len(),
            });
        }

        if self.features.insert(item, vector).is_none() {
            let position = self.item_ids.binary_search(&item).unwrap_or_else(|pos| pos);
            self.item_ids.insert(position, item);
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

impl ItemCatalog for MapItemCatalog {

    fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    fn feature_vector(&self, item: ItemId) -> Result<&[f64]> {
        self.features.get(&item)
            .map(|vector| vector.as_slice())
            .ok_or(HirError::MissingFeatures(item))
    }

    fn feature_dimension(&self) -> usize {
        self.feature_dimension
    }
}

/// Bijection between item ids and the row/column positions of the dense feature matrices.
/// Built once from the sorted item ids and shared by model building and querying. Only the
/// sorted ids are persisted, the positions are rebuilt on load.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<ItemId>", into = "Vec<ItemId>")]
pub struct ItemIndex {
    items: Vec<ItemId>,
    positions: FnvHashMap<ItemId, usize>,
}

impl ItemIndex {

    pub fn new(item_ids: &[ItemId]) -> Self {
        let mut items = item_ids.to_vec();
        items.sort_unstable();
        items.dedup();

        let positions = items.iter()
            .enumerate()
            .map(|(position, item)| (*item, position))
            .collect();

        ItemIndex { items, positions }
    }

    pub fn position(&self, item: ItemId) -> Option<usize> {
        self.positions.get(&item).cloned()
    }

    pub fn item(&self, position: usize) -> ItemId {
        self.items[position]
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.positions.contains_key(&item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TryFrom<Vec<ItemId>> for ItemIndex {
    type Error = String;

    fn try_from(items: Vec<ItemId>) -> std::result::Result<Self, Self::Error> {
        if let Some(pair) = items.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(format!("item ids must be strictly ascending, found {} before {}",
                pair[0], pair[1]));
        }
        Ok(ItemIndex::new(&items))
    }
}

impl From<ItemIndex> for Vec<ItemId> {
    fn from(index: ItemIndex) -> Self {
        index.items
    }
}
