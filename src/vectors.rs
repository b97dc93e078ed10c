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

type Entries = FnvHashMap<ItemId, f64>;

/// Read access shared by the mutable and the frozen sparse vector. Absent keys read as zero.
pub trait SparseEntries {

    fn entries(&self) -> &FnvHashMap<ItemId, f64>;

    fn get(&self, key: ItemId) -> f64 {
        self.entries().get(&key).cloned().unwrap_or(0.0)
    }

    fn contains_key(&self, key: ItemId) -> bool {
        self.entries().contains_key(&key)
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn sum(&self) -> f64 {
        self.entries().values().sum()
    }

    fn iter(&self) -> hash_map::Iter<ItemId, f64> {
        self.entries().iter()
    }

    fn keys(&self) -> hash_map::Keys<ItemId, f64> {
        self.entries().keys()
    }
}

/// Sparse vector under construction.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct MutableSparseVector {
    entries: Entries,
}

/// Frozen sparse vector, safe to share between any number of readers.
#[derive(PartialEq, Clone, Debug, Default, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Entries,
}

impl SparseEntries for MutableSparseVector {
    fn entries(&self) -> &Entries {
        &self.entries
    }
}

impl SparseEntries for SparseVector {
    fn entries(&self) -> &Entries {
        &self.entries
    }
}

impl MutableSparseVector {

    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MutableSparseVector {
            entries: FnvHashMap::with_capacity_and_hasher(capacity, Default::default())
        }
    }

    pub fn set(&mut self, key: ItemId, value: f64) {
        self.entries.insert(key, value);
    }

    pub fn add(&mut self, key: ItemId, delta: f64) {
        *self.entries.entry(key).or_insert(0.0) += delta;
    }

    pub fn remove(&mut self, key: ItemId) -> Option<f64> {
        self.entries.remove(&key)
    }

    pub fn multiply(&mut self, factor: f64) {
        for value in self.entries.values_mut() {
            *value *= factor;
        }
    }

    pub fn freeze(self) -> SparseVector {
        SparseVector { entries: self.entries }
    }
}

impl SparseVector {

    pub fn empty() -> Self {
        SparseVector::default()
    }

    /// Copy of this vector with every entry multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> SparseVector {
        let entries = self.entries.iter()
            .map(|(key, value)| (*key, value * factor))
            .collect();

        SparseVector { entries }
    }

    pub fn mutable_copy(&self) -> MutableSparseVector {
        MutableSparseVector { entries: self.entries.clone() }
    }
}

impl std::iter::FromIterator<(ItemId, f64)> for MutableSparseVector {
    fn from_iter<T: IntoIterator<Item=(ItemId, f64)>>(iter: T) -> Self {
        MutableSparseVector { entries: iter.into_iter().collect() }
    }
}

impl std::iter::FromIterator<(ItemId, f64)> for SparseVector {
    fn from_iter<T: IntoIterator<Item=(ItemId, f64)>>(iter: T) -> Self {
        SparseVector { entries: iter.into_iter().collect() }
    }
}

/// Iterates over the keys present in both vectors, yielding `(key, left value, right value)`.
pub struct Intersection<'a> {
    smaller: hash_map::Iter<'a, ItemId, f64>,
    larger: &'a Entries,
    swapped: bool,
}

impl<'a> Iterator for Intersection<'a> {
    type Item = (ItemId, f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((key, value)) = self.smaller.next() {
            if let Some(other_value) = self.larger.get(key) {
                return if self.swapped {
                    Some((*key, *other_value, *value))
                } else {
                    Some((*key, *value, *other_value))
                };
            }
        }
        None
    }
}

/// We always probe the larger vector with the keys of the smaller one.
pub fn intersect<'a, L, R>(left: &'a L, right: &'a R) -> Intersection<'a>
    where L: SparseEntries + ?Sized, R: SparseEntries + ?Sized {

    let (left, right) = (left.entries(), right.entries());

    if left.len() <= right.len() {
        Intersection { smaller: left.iter(), larger: right, swapped: false }
    } else {
        Intersection { smaller: right.iter(), larger: left, swapped: true }
    }
}


#[cfg(test)]
mod tests {

    use crate::vectors::{intersect, MutableSparseVector, SparseEntries, SparseVector};

    #[test]
    fn absent_keys_read_as_zero() {
        let mut vector = MutableSparseVector::new();
        vector.set(3, 1.5);

        assert_eq!(vector.get(3), 1.5);
        assert_eq!(vector.get(4), 0.0);
        assert!(!vector.contains_key(4));
    }

    #[test]
    fn in_place_and_copy_scaling() {
        let mut vector: MutableSparseVector = vec![(1, 2.0), (2, 6.0)].into_iter().collect();
        vector.add(1, 2.0);
        assert_eq!(vector.sum(), 10.0);

        vector.multiply(0.1);
        let frozen = vector.freeze();
        assert!((frozen.get(1) - 0.4).abs() < 1e-12);
        assert!((frozen.get(2) - 0.6).abs() < 1e-12);

        let doubled = frozen.scaled(2.0);
        assert!((doubled.get(2) - 1.2).abs() < 1e-12);
        assert!((frozen.get(2) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn intersection_keeps_sides_apart() {
        let small: SparseVector = vec![(1, 1.0), (5, 5.0)].into_iter().collect();
        let large: SparseVector = vec![(1, 10.0), (2, 20.0), (3, 30.0)].into_iter().collect();

        let left_to_right: Vec<_> = intersect(&small, &large).collect();
        assert_eq!(left_to_right, vec![(1, 1.0, 10.0)]);

        let right_to_left: Vec<_> = intersect(&large, &small).collect();
        assert_eq!(right_to_left, vec![(1, 10.0, 1.0)]);

        let empty = SparseVector::empty();
        assert_eq!(intersect(&large, &empty).count(), 0);
    }
}
