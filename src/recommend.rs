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

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use scoped_pool::Pool;
use serde_derive::Serialize;
use tracing::info;

use crate::scorer::{HirScorer, ScoreMap};
use crate::stats::RatingSource;
use crate::types::{ItemId, UserId};
use crate::utils;
use crate::vectors::SparseVector;

/// Result type used to find the top-n items per user via a binary heap
#[derive(PartialEq, Clone, Copy, Debug, Serialize)]
pub struct ScoredItem {
    pub item: ItemId,
    pub score: f64,
}

/// Ordering for our max-heap, the worst item has to end up on top. Floating point numbers have
/// no total order, so incomparable scores fall through to the item id like equal ones do.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        _ => scored_item_a.item.cmp(&scored_item_b.item),
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// The `n` highest scores, best first. Equal scores are ordered by ascending item id.
pub fn top_n(scores: &ScoreMap, n: usize) -> Vec<ScoredItem> {

    if n == 0 {
        return Vec::new();
    }

    let mut heap = BinaryHeap::with_capacity(n);

    for (item, score) in scores.iter() {
        let scored_item = ScoredItem { item: *item, score: *score };

        if heap.len() < n {
            heap.push(scored_item);
        } else if let Some(mut top) = heap.peek_mut() {
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }

    heap.into_sorted_vec()
}

pub fn recommend(
    scorer: &HirScorer,
    history: &SparseVector,
    candidates: &[ItemId],
    n: usize,
) -> Vec<ScoredItem> {
    top_n(&scorer.score(history, candidates), n)
}

/// Recommends `n` items to each of the `users`, using every item of the model as a candidate.
/// Users are split into one chunk per worker, all workers read the same model.
pub fn recommend_all<R>(
    scorer: &HirScorer,
    ratings: &R,
    users: &[UserId],
    n: usize,
    pool_size: usize,
) -> Vec<(UserId, Vec<ScoredItem>)>
    where R: RatingSource + Sync + ?Sized {

    let batch_start = Instant::now();

    let pool_size = pool_size.max(1);
    let chunk_size = ((users.len() + pool_size - 1) / pool_size).max(1);
    let candidates = scorer.model().items();

    let mut recommendations: Vec<Vec<ScoredItem>> = vec![Vec::new(); users.len()];

    let pool = Pool::new(pool_size);

    pool.scoped(|scope| {
        for (users_chunk, recommendations_chunk) in
            users.chunks(chunk_size).zip(recommendations.chunks_mut(chunk_size)) {

            let scorer = *scorer;

            scope.execute(move || {
                for (user, slot) in users_chunk.iter().zip(recommendations_chunk.iter_mut()) {
                    if let Some(history) = ratings.user_history(*user) {
                        *slot = recommend(&scorer, history, candidates, n);
                    }
                }
            });
        }
    });

    pool.shutdown();

    info!(
        "Computed recommendations for {} users, {}ms",
        users.len(),
        utils::to_millis(batch_start.elapsed())
    );

    users.iter().cloned().zip(recommendations.into_iter()).collect()
}


#[cfg(test)]
mod tests {

    use std::collections::BinaryHeap;
    use std::f64::EPSILON;

    use crate::catalog::MapItemCatalog;
    use crate::model::HirModelBuilder;
    use crate::recommend::{self, ScoredItem};
    use crate::scorer::{HirScorer, ScoreMap};
    use crate::stats::{RatingHistories, RatingSource};
    use crate::types::Rating;

    fn within_epsilon(value: f64, expected: f64) -> bool {
        (value - expected).abs() < EPSILON
    }

    #[test]
    fn scored_item_ordering_reversed() {
        let item_a = ScoredItem { item: 1, score: 0.5 };
        let item_b = ScoredItem { item: 2, score: 1.5 };
        let item_c = ScoredItem { item: 3, score: 0.3 };
        let item_d = ScoredItem { item: 4, score: 0.5 };

        assert!(item_a > item_b);
        assert!(item_a < item_c);
        assert!(item_b < item_c);
        assert!(item_a < item_d);
    }

    #[test]
    fn topn() {
        let mut heap = BinaryHeap::new();
        heap.push(ScoredItem { item: 1, score: 0.1 });
        heap.push(ScoredItem { item: 2, score: 0.9 });
        assert_eq!(heap.peek().map(|top| top.item), Some(1));

        let scores: ScoreMap = vec![(1, 0.5), (2, 1.5), (3, 0.3), (4, 3.5), (5, 2.5), (6, 1.5)]
            .into_iter()
            .collect();

        let top = recommend::top_n(&scores, 3);

        assert_eq!(top.len(), 3);

        assert_eq!(top[0].item, 4);
        assert!(within_epsilon(top[0].score, 3.5));

        assert_eq!(top[1].item, 5);
        assert!(within_epsilon(top[1].score, 2.5));

        assert_eq!(top[2].item, 2);
        assert!(within_epsilon(top[2].score, 1.5));

        assert!(recommend::top_n(&scores, 0).is_empty());
        assert_eq!(recommend::top_n(&scores, 10).len(), 6);
    }

    #[test]
    fn batch_matches_sequential() {
        let mut ratings = Vec::new();
        for user in 0..40_u64 {
            for item in 0..8_u64 {
                if (user + item) % 3 != 0 {
                    ratings.push(Rating::new(user, item, 1.0 + (item % 5) as f64));
                }
            }
        }
        let histories = RatingHistories::from_ratings(ratings);

        let catalog = MapItemCatalog::from_features(
            (0..8_u64).map(|item| (item, vec![(item % 2) as f64, 1.0]))).unwrap();
        let model = HirModelBuilder::new(&catalog, &histories).build().unwrap();
        let scorer = HirScorer::new(&model, None);

        let mut users = histories.users();
        users.push(1000);

        let batch = recommend::recommend_all(&scorer, &histories, &users, 3, 4);

        assert_eq!(batch.len(), users.len());

        for (user, recommended) in batch {
            match histories.user_history(user) {
                Some(history) => {
                    let sequential = recommend::recommend(&scorer, history, model.items(), 3);
                    assert_eq!(recommended, sequential);
                },
                None => assert!(recommended.is_empty()),
            }
        }
    }
}
