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

use fnv::{FnvHashMap, FnvHashSet};

use crate::types::{ItemId, Rating, UserId};
use crate::vectors::{MutableSparseVector, SparseVector};

/// Source of per-user rating histories. Neither the order of users nor the order of items
/// within a history carries any meaning.
pub trait RatingSource {

    fn histories<'a>(&'a self) -> Box<dyn Iterator<Item=(UserId, &'a SparseVector)> + 'a>;

    fn user_history(&self, user: UserId) -> Option<&SparseVector>;
}

/// Ratings grouped by user, plus the basic statistics of the data.
pub struct RatingHistories {
    histories: FnvHashMap<UserId, SparseVector>,
    num_items: usize,
    num_ratings: u64,
}

impl RatingHistories {

    pub fn num_users(&self) -> usize {
        self.histories.len()
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn num_ratings(&self) -> u64 {
        self.num_ratings
    }

    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.histories.keys().cloned().collect();
        users.sort_unstable();
        users
    }
}

impl RatingHistories {

    /// Later ratings of the same item replace earlier ones, unless the earlier rating carries a
    /// newer timestamp.
    pub fn from_ratings<I>(ratings: I) -> Self where I: IntoIterator<Item=Rating> {

        let mut working: FnvHashMap<UserId, (MutableSparseVector, FnvHashMap<ItemId, u64>)> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut items: FnvHashSet<ItemId> =
            FnvHashSet::with_capacity_and_hasher(100, Default::default());

        let mut num_ratings: u64 = 0;

        for rating in ratings {
            let (history, timestamps) = working.entry(rating.user)
                .or_insert_with(|| (MutableSparseVector::with_capacity(10), FnvHashMap::default()));

            let superseded = match (timestamps.get(&rating.item), rating.timestamp) {
                (Some(previous), Some(current)) => *previous > current,
                _ => false,
            };

            if !superseded {
                history.set(rating.item, rating.value);
                match rating.timestamp {
                    Some(timestamp) => { timestamps.insert(rating.item, timestamp); },
                    None => { timestamps.remove(&rating.item); },
                }
            }

            items.insert(rating.item);
            num_ratings += 1;
        }

        let histories = working.into_iter()
            .map(|(user, (history, _))| (user, history.freeze()))
            .collect();

        RatingHistories { histories, num_items: items.len(), num_ratings }
    }
}

impl RatingSource for RatingHistories {

    fn histories<'a>(&'a self) -> Box<dyn Iterator<Item=(UserId, &'a SparseVector)> + 'a> {
        Box::new(self.histories.iter().map(|(user, history)| (*user, history)))
    }

    fn user_history(&self, user: UserId) -> Option<&SparseVector> {
        self.histories.get(&user)
    }
}


#[cfg(test)]
mod tests {

    use crate::stats::{RatingHistories, RatingSource};
    use crate::types::Rating;
    use crate::vectors::SparseEntries;

    #[test]
    fn grouped_by_user() {
        let histories = RatingHistories::from_ratings(vec![
            Rating::new(1, 318, 5.0),
            Rating::new(2, 318, 4.0),
            Rating::new(1, 117444, 3.0),
        ]);

        assert_eq!(histories.num_users(), 2);
        assert_eq!(histories.num_items(), 2);
        assert_eq!(histories.num_ratings(), 3);
        assert_eq!(histories.users(), vec![1, 2]);

        let alice = histories.user_history(1).unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice.get(117444), 3.0);

        assert!(histories.user_history(3).is_none());
        assert_eq!(histories.histories().count(), 2);
    }

    #[test]
    fn newest_rating_wins() {
        let histories = RatingHistories::from_ratings(vec![
            Rating::with_timestamp(1, 10, 2.0, 200),
            Rating::with_timestamp(1, 10, 5.0, 100),
            Rating::new(1, 20, 1.0),
            Rating::new(1, 20, 4.0),
        ]);

        let history = histories.user_history(1).unwrap();
        assert_eq!(history.get(10), 2.0);
        assert_eq!(history.get(20), 4.0);
    }
}
