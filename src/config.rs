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

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_derive::Deserialize;

use crate::error::{HirError, Result};
use crate::types::PreferenceDomain;

/// Layout of a delimited input file.
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct CsvFormat {
    pub delimiter: char,
    pub has_headers: bool,
}

impl CsvFormat {

    /// MovieLens "latest" ratings: `userId,movieId,rating,timestamp` with a header line.
    pub fn ratings() -> Self {
        CsvFormat { delimiter: ',', has_headers: true }
    }

    /// `item,title,g1|g2|...` without a header line.
    pub fn genres() -> Self {
        CsvFormat { delimiter: ',', has_headers: false }
    }
}

fn default_ratings_format() -> CsvFormat {
    CsvFormat::ratings()
}

fn default_genres_format() -> CsvFormat {
    CsvFormat::genres()
}

fn default_num_recommendations() -> usize {
    10
}

#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct HirConfig {
    #[serde(default = "default_num_recommendations")]
    pub num_recommendations: usize,
    /// Number of worker threads for batch recommendation, one per CPU if unset.
    #[serde(default)]
    pub pool_size: Option<usize>,
    #[serde(default)]
    pub preference_domain: Option<PreferenceDomain>,
    #[serde(default = "default_ratings_format")]
    pub ratings: CsvFormat,
    #[serde(default = "default_genres_format")]
    pub genres: CsvFormat,
}

impl Default for HirConfig {
    fn default() -> Self {
        HirConfig {
            num_recommendations: default_num_recommendations(),
            pool_size: None,
            preference_domain: None,
            ratings: default_ratings_format(),
            genres: default_genres_format(),
        }
    }
}

impl HirConfig {

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: HirConfig = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HirConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_recommendations == 0 {
            return Err(HirError::Config(String::from("num_recommendations must be positive")));
        }

        if self.pool_size == Some(0) {
            return Err(HirError::Config(String::from("pool_size must be positive")));
        }

        for format in &[&self.ratings, &self.genres] {
            if !format.delimiter.is_ascii() {
                return Err(HirError::Config(
                    format!("delimiter '{}' is not a single byte", format.delimiter)));
            }
        }

        if let Some(domain) = self.preference_domain {
            domain.validate()?;
        }

        Ok(())
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size.unwrap_or_else(num_cpus::get)
    }
}


#[cfg(test)]
mod tests {

    use crate::config::{CsvFormat, HirConfig};
    use crate::error::HirError;

    #[test]
    fn defaults_for_missing_fields() {
        let config = HirConfig::from_json_str("{}").unwrap();

        assert_eq!(config, HirConfig::default());
        assert_eq!(config.num_recommendations, 10);
        assert_eq!(config.ratings, CsvFormat::ratings());
        assert!(config.pool_size() >= 1);
    }

    #[test]
    fn overrides() {
        let config = HirConfig::from_json_str(r#"{
            "num_recommendations": 5,
            "pool_size": 2,
            "preference_domain": { "min": 0.5, "max": 5.0 },
            "genres": { "delimiter": "\t", "has_headers": true }
        }"#).unwrap();

        assert_eq!(config.num_recommendations, 5);
        assert_eq!(config.pool_size(), 2);
        assert_eq!(config.preference_domain.map(|domain| domain.max()), Some(5.0));
        assert_eq!(config.genres.delimiter, '\t');
    }

    #[test]
    fn invalid_values_rejected() {
        match HirConfig::from_json_str(r#"{ "pool_size": 0 }"#) {
            Err(HirError::Config(_)) => {},
            other => panic!("unexpected result {:?}", other),
        }

        match HirConfig::from_json_str(r#"{ "preference_domain": { "min": 5, "max": 1 } }"#) {
            Err(HirError::InvalidDomain { .. }) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }
}
