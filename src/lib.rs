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

extern crate csv;
extern crate fnv;
extern crate ndarray;
extern crate num_cpus;
extern crate scoped_pool;
extern crate serde;
extern crate serde_derive;
extern crate serde_json;
extern crate thiserror;
extern crate tracing;

pub mod types;
pub mod error;
pub mod vectors;
pub mod rows;
pub mod stochastic;
pub mod catalog;
pub mod stats;
pub mod accumulator;
pub mod model;
pub mod scorer;
pub mod recommend;
pub mod config;
pub mod io;
pub mod utils;


pub use catalog::{ItemCatalog, MapItemCatalog};
pub use error::{HirError, Result};
pub use model::{HirModel, HirModelBuilder};
pub use scorer::{HirScorer, ScoreMap};
pub use stats::{RatingHistories, RatingSource};
pub use types::{ItemId, PreferenceDomain, Rating, UserId};

/// Builds a model from a stream of ratings and the item catalog in one go. All rated items have
/// to be known to the catalog, and the catalog needs a feature vector for every item.
pub fn build_model<I, C>(ratings: I, catalog: &C) -> Result<HirModel>
    where I: IntoIterator<Item=Rating>, C: ItemCatalog + ?Sized {

    let histories = RatingHistories::from_ratings(ratings);

    tracing::info!(
        "Found {} ratings by {} users on {} items.",
        histories.num_ratings(),
        histories.num_users(),
        histories.num_items()
    );

    HirModelBuilder::new(catalog, &histories).build()
}
