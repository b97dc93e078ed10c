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

use fnv::FnvHashMap;

use crate::model::HirModel;
use crate::stats::RatingSource;
use crate::types::{ItemId, PreferenceDomain, UserId};
use crate::vectors::{SparseEntries, SparseVector};

/// Predicted scores per candidate. Candidates without a prediction are simply absent, which is
/// not the same as a predicted score of zero.
pub type ScoreMap = FnvHashMap<ItemId, f64>;

/// Scores unseen items for a user from the co-ratings between the candidate and the items in
/// the user's history. Holds nothing but a reference to the shared model and the optional
/// preference domain, so it is cheap to copy into worker threads.
#[derive(Clone, Copy)]
pub struct HirScorer<'a> {
    model: &'a HirModel,
    domain: Option<PreferenceDomain>,
}

impl<'a> HirScorer<'a> {

    pub fn new(model: &'a HirModel, domain: Option<PreferenceDomain>) -> Self {
        HirScorer { model, domain }
    }

    pub fn model(&self) -> &'a HirModel {
        self.model
    }

    pub fn domain(&self) -> Option<PreferenceDomain> {
        self.domain
    }

    /// For every candidate the user has not rated, averages the co-rating counts over those
    /// rated items that share at least one co-rating with the candidate. Rated items without
    /// co-ratings do not count towards the average, and a candidate without any such neighbor
    /// gets no score at all.
    pub fn score(&self, history: &SparseVector, candidates: &[ItemId]) -> ScoreMap {

        let mut scores = ScoreMap::with_capacity_and_hasher(candidates.len(), Default::default());

        for candidate in candidates {

            if history.contains_key(*candidate) || scores.contains_key(candidate) {
                continue;
            }

            let mut total = 0.0;
            let mut num_neighbors: usize = 0;

            for rated_item in history.keys() {
                let coratings = self.model.get_coratings(*candidate, *rated_item);
                if coratings != 0 {
                    total += f64::from(coratings);
                    num_neighbors += 1;
                }
            }

            if num_neighbors != 0 {
                let mut prediction = total / num_neighbors as f64;
                if let Some(domain) = self.domain {
                    prediction = domain.clamp(prediction);
                }
                scores.insert(*candidate, prediction);
            }
        }

        scores
    }

    /// Looks up the user's history first. Users without a history get no scores.
    pub fn score_user<R>(&self, ratings: &R, user: UserId, candidates: &[ItemId]) -> ScoreMap
        where R: RatingSource + ?Sized {

        match ratings.user_history(user) {
            Some(history) => self.score(history, candidates),
            None => ScoreMap::default(),
        }
    }
}


#[cfg(test)]
mod tests {

    use crate::catalog::MapItemCatalog;
    use crate::model::{HirModel, HirModelBuilder};
    use crate::scorer::HirScorer;
    use crate::stats::RatingHistories;
    use crate::types::{PreferenceDomain, Rating};
    use crate::vectors::SparseVector;

    const A: u64 = 1;
    const B: u64 = 2;
    const C: u64 = 3;
    const D: u64 = 4;

    /// C is co-rated with A by four users and with B by two users, D is never co-rated.
    fn model() -> HirModel {
        let mut ratings = Vec::new();
        for user in 1..=4 {
            ratings.push(Rating::new(user, A, 5.0));
            ratings.push(Rating::new(user, C, 3.0));
        }
        for user in 5..=6 {
            ratings.push(Rating::new(user, B, 2.0));
            ratings.push(Rating::new(user, C, 1.0));
        }
        ratings.push(Rating::new(7, D, 4.0));

        let catalog = MapItemCatalog::from_features(
            vec![(A, vec![1.0]), (B, vec![1.0]), (C, vec![0.0]), (D, vec![1.0])]).unwrap();
        let histories = RatingHistories::from_ratings(ratings);

        HirModelBuilder::new(&catalog, &histories).build().unwrap()
    }

    fn history(entries: &[(u64, f64)]) -> SparseVector {
        entries.iter().cloned().collect()
    }

    #[test]
    fn averages_informative_neighbors() {
        let model = model();
        let scorer = HirScorer::new(&model, None);

        let scores = scorer.score(&history(&[(A, 5.0), (B, 4.0)]), &[C]);
        assert_eq!(scores.get(&C), Some(&3.0));

        let scores = scorer.score(&history(&[(A, 5.0), (D, 4.0)]), &[C]);
        assert_eq!(scores.get(&C), Some(&4.0));
    }

    #[test]
    fn clamped_into_domain() {
        let model = model();
        let domain = PreferenceDomain::new(0.0, 1.0).unwrap();
        let scorer = HirScorer::new(&model, Some(domain));

        let scores = scorer.score(&history(&[(A, 5.0), (B, 4.0)]), &[C]);
        assert_eq!(scores.get(&C), Some(&1.0));
    }

    #[test]
    fn no_evidence_means_no_score() {
        let model = model();
        let scorer = HirScorer::new(&model, None);

        let scores = scorer.score(&history(&[(A, 5.0), (B, 4.0)]), &[D, 99]);
        assert!(scores.is_empty());

        let scores = scorer.score(&SparseVector::empty(), &[A, B, C, D]);
        assert!(scores.is_empty());
    }

    #[test]
    fn rated_items_not_scored() {
        let model = model();
        let scorer = HirScorer::new(&model, None);

        let scores = scorer.score(&history(&[(A, 5.0), (C, 4.0)]), &[A, B, C, D]);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get(&B), Some(&2.0));
    }

    #[test]
    fn unknown_users_get_nothing() {
        let model = model();
        let scorer = HirScorer::new(&model, None);
        let histories = RatingHistories::from_ratings(vec![Rating::new(1, A, 5.0)]);

        assert!(scorer.score_user(&histories, 2, &[C]).is_empty());
        assert_eq!(scorer.score_user(&histories, 1, &[C, D]).get(&C), Some(&4.0));
    }
}
