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
use std::io::{self, stdout, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde_derive::Serialize;
use tracing::warn;

use crate::catalog::MapItemCatalog;
use crate::config::CsvFormat;
use crate::error::{HirError, Result};
use crate::model::HirModel;
use crate::recommend::ScoredItem;
use crate::types::{ItemId, Rating, UserId};

/// Opens a CSV input file with the delimiter and header setting of the given format. Quoted
/// fields may contain the delimiter, and records may differ in their number of fields.
pub fn csv_reader<P: AsRef<Path>>(path: P, format: &CsvFormat) -> Result<csv::Reader<File>> {
    let reader = reader_builder(format).from_path(path)?;
    Ok(reader)
}

pub fn csv_reader_from<R: Read>(input: R, format: &CsvFormat) -> csv::Reader<R> {
    reader_builder(format).from_reader(input)
}

fn reader_builder(format: &CsvFormat) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(format.has_headers)
        .delimiter(format.delimiter as u8)
        .flexible(true);
    builder
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|position| position.line()).unwrap_or(0)
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T> {

    let field = record.get(index).ok_or_else(|| HirError::Parse {
        line: line_of(record),
        message: format!("not enough columns, {} is missing", name),
    })?;

    field.trim().parse().map_err(|_| HirError::Parse {
        line: line_of(record),
        message: format!("{} '{}' is not a number", name, field),
    })
}

/// Ratings in the `user,item,rating[,timestamp]` layout.
pub fn read_ratings<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<Rating>> {

    let mut ratings = Vec::new();

    for result in reader.records() {
        let record = result?;

        let user: UserId = parse_field(&record, 0, "user id")?;
        let item: ItemId = parse_field(&record, 1, "item id")?;
        let value: f64 = parse_field(&record, 2, "rating")?;

        let timestamp = match record.get(3) {
            Some(field) if !field.trim().is_empty() => Some(parse_field(&record, 3, "timestamp")?),
            _ => None,
        };

        ratings.push(Rating { user, item, value, timestamp });
    }

    Ok(ratings)
}

/// Genre vectors in the `item,title,g1|g2|...|gN` layout. Titles may be quoted and contain the
/// delimiter. Items without a genre column are skipped.
pub fn read_genres<R: Read>(reader: &mut csv::Reader<R>) -> Result<MapItemCatalog> {

    let mut catalog = MapItemCatalog::default();

    for result in reader.records() {
        let record = result?;

        if record.len() < 2 {
            return Err(HirError::Parse {
                line: line_of(&record),
                message: String::from("not enough columns"),
            });
        }

        let item: ItemId = parse_field(&record, 0, "item id")?;

        let genres = match record.get(2) {
            Some(genres) if !genres.trim().is_empty() => genres,
            _ => {
                warn!("Skipping item {} on line {} without genres", item, line_of(&record));
                continue;
            },
        };

        let mut vector = Vec::new();
        for genre in genres.split('|') {
            let value = match genre.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => value,
                _ => return Err(HirError::Parse {
                    line: line_of(&record),
                    message: format!("genre value '{}' is not a finite number", genre),
                }),
            };
            vector.push(value);
        }

        catalog.insert(item, vector)?;
    }

    Ok(catalog)
}

/// Struct used for JSON serialization of computed recommendations. Field names will be used in
/// JSON.
#[derive(Serialize)]
struct Recommendations<'a> {
    for_user: UserId,
    recommended_items: &'a [ScoredItem],
}

/// Outputs one JSON object per user. If an `output_path` is supplied, we write to a file at the
/// specified path, otherwise, we output to stdout.
pub fn write_recommendations(
    recommendations: &[(UserId, Vec<ScoredItem>)],
    output_path: Option<String>,
) -> Result<()> {

    let out: Box<dyn Write> = match output_path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    write_recommendations_to(recommendations, out)
}

pub fn write_recommendations_to<W: Write>(
    recommendations: &[(UserId, Vec<ScoredItem>)],
    out: W,
) -> Result<()> {

    let mut out = BufWriter::new(out);

    for (user, recommended_items) in recommendations {
        let line = serde_json::to_string(&Recommendations {
            for_user: *user,
            recommended_items,
        })?;

        writeln!(out, "{}", line)?;
    }

    out.flush()?;

    Ok(())
}

/// Persists a built model as JSON, so that it can be reloaded without another pass over the
/// ratings.
pub fn write_model<P: AsRef<Path>>(model: &HirModel, path: P) -> Result<()> {
    let out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(out, model)?;
    Ok(())
}

pub fn read_model<P: AsRef<Path>>(path: P) -> Result<HirModel> {
    read_model_from(BufReader::new(File::open(path)?))
}

pub fn read_model_from<R: io::Read>(input: R) -> Result<HirModel> {
    let model: HirModel = serde_json::from_reader(input)?;
    model.check_shapes()?;
    Ok(model)
}


#[cfg(test)]
mod tests {

    use crate::catalog::ItemCatalog;
    use crate::config::CsvFormat;
    use crate::error::HirError;
    use crate::io;
    use crate::recommend::ScoredItem;

    const GENRES: &str = "\
318,\"Shawshank Redemption, The (1994)\",0|0|0|0|0|1|0|1|0|0|0|0|0|0|0|0|0|0|0|0
2329,American History X (1998),0|0|0|0|0|1|0|1|0|0|0|0|0|0|0|0|0|0|0|0
5475,Z (1969)
117444,Song of the Sea (2014),0|0|1|1|0|0|0|0|1|0|0|0|0|0|0|0|0|0|0|0
";

    #[test]
    fn genres_with_quoted_titles() {
        let mut reader = io::csv_reader_from(GENRES.as_bytes(), &CsvFormat::genres());
        let catalog = io::read_genres(&mut reader).unwrap();

        assert_eq!(catalog.item_ids(), &[318, 2329, 117444]);
        assert_eq!(catalog.feature_dimension(), 20);
        assert_eq!(catalog.feature_vector(117444).unwrap()[2], 1.0);
    }

    #[test]
    fn broken_genres_report_line() {
        let input = "1,Title,0|1\n2,Other,0|x\n";
        let mut reader = io::csv_reader_from(input.as_bytes(), &CsvFormat::genres());

        match io::read_genres(&mut reader) {
            Err(HirError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result {:?}", other.map(|catalog| catalog.len())),
        }
    }

    #[test]
    fn non_finite_genres_rejected() {
        for input in &["1,A,NaN|1\n2,B,0|1\n", "1,A,0|1\n2,B,inf|1\n"] {
            let mut reader = io::csv_reader_from(input.as_bytes(), &CsvFormat::genres());

            match io::read_genres(&mut reader) {
                Err(HirError::Parse { .. }) => {},
                other => panic!("unexpected result {:?}", other.map(|catalog| catalog.len())),
            }
        }

        let input = "1,A,NaN|1\n";
        let mut reader = io::csv_reader_from(input.as_bytes(), &CsvFormat::genres());
        match io::read_genres(&mut reader) {
            Err(HirError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("unexpected result {:?}", other.map(|catalog| catalog.len())),
        }
    }

    #[test]
    fn ratings_with_and_without_timestamps() {
        let input = "userId,movieId,rating,timestamp\n1,318,5.0,1260759144\n2,318,3.5\n";
        let mut reader = io::csv_reader_from(input.as_bytes(), &CsvFormat::ratings());
        let ratings = io::read_ratings(&mut reader).unwrap();

        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].timestamp, Some(1260759144));
        assert_eq!(ratings[1].user, 2);
        assert_eq!(ratings[1].value, 3.5);
        assert_eq!(ratings[1].timestamp, None);
    }

    #[test]
    fn unparseable_ratings_rejected() {
        let input = "userId,movieId,rating\n1,abc,5.0\n";
        let mut reader = io::csv_reader_from(input.as_bytes(), &CsvFormat::ratings());

        assert!(io::read_ratings(&mut reader).is_err());
    }

    #[test]
    fn json_lines_per_user() {
        let recommendations = vec![
            (7, vec![ScoredItem { item: 318, score: 0.5 }]),
            (8, Vec::new()),
        ];

        let mut out: Vec<u8> = Vec::new();
        io::write_recommendations_to(&recommendations, &mut out).unwrap();

        let written = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = written.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"for_user":7,"recommended_items":[{"item":318,"score":0.5}]}"#);
        assert_eq!(lines[1], r#"{"for_user":8,"recommended_items":[]}"#);
    }
}
