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

use serde_derive::{Deserialize, Serialize};

use crate::error::{HirError, Result};

pub type ItemId = u64;
pub type UserId = u64;

/// A single observed rating, as handed to us by the data source.
#[derive(PartialEq, Clone, Debug)]
pub struct Rating {
    pub user: UserId,
    pub item: ItemId,
    pub value: f64,
    pub timestamp: Option<u64>,
}

impl Rating {

    pub fn new(user: UserId, item: ItemId, value: f64) -> Self {
        Rating { user, item, value, timestamp: None }
    }

    pub fn with_timestamp(user: UserId, item: ItemId, value: f64, timestamp: u64) -> Self {
        Rating { user, item, value, timestamp: Some(timestamp) }
    }
}

/// Valid range of predicted scores, used to clamp the output of the scorer.
#[derive(PartialEq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PreferenceDomain {
    min: f64,
    max: f64,
}

impl PreferenceDomain {

    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(HirError::InvalidDomain { min, max });
        }
        Ok(PreferenceDomain { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Deserialized domains bypass `new`, so configuration loading re-checks them here.
    pub fn validate(&self) -> Result<()> {
        PreferenceDomain::new(self.min, self.max).map(|_| ())
    }
}


#[cfg(test)]
mod tests {

    use crate::types::PreferenceDomain;

    #[test]
    fn clamping() {
        let domain = PreferenceDomain::new(0.0, 1.0).unwrap();

        assert_eq!(domain.clamp(3.0), 1.0);
        assert_eq!(domain.clamp(-0.5), 0.0);
        assert_eq!(domain.clamp(0.25), 0.25);
    }

    #[test]
    fn inverted_domain_rejected() {
        assert!(PreferenceDomain::new(5.0, 1.0).is_err());
        assert!(PreferenceDomain::new(std::f64::NAN, 1.0).is_err());
        assert!(PreferenceDomain::new(2.0, 2.0).is_ok());
    }
}
