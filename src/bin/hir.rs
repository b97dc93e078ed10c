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

use std::env;
use std::error::Error;
use std::process;

use getopts::Options;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hirreco::config::HirConfig;
use hirreco::io;
use hirreco::recommend;
use hirreco::{HirModel, HirModelBuilder, HirScorer, PreferenceDomain, RatingHistories, UserId};

fn main() {

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("r", "ratings", "Ratings file name (required). One user, item, rating and \
        optional timestamp per line.", "PATH");
    opts.optopt("g", "genres", "Genres file name (required unless --model is given). One item, \
        title and '|'-separated genre vector per line.", "PATH");
    opts.optopt("c", "config", "JSON configuration file (optional).", "PATH");
    opts.optopt("m", "model", "Load a previously saved model instead of building one.", "PATH");
    opts.optopt("s", "save-model", "Save the built model to this path (optional).", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("n", "num-recommendations", "Number of items to recommend per user (optional, \
        defaults to 10).", "NUMBER");
    opts.optmulti("u", "user", "User to recommend for (optional, repeatable, defaults to all \
        users).", "ID");
    opts.optopt("", "min", "Lower bound of the preference domain (optional).", "NUMBER");
    opts.optopt("", "max", "Upper bound of the preference domain (optional).", "NUMBER");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    let ratings_path = match matches.opt_str("r") {
        Some(path) => path,
        None => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify a ratings file via --ratings."),
        ),
    };

    let genres_path = matches.opt_str("g");
    let model_path = matches.opt_str("m");

    if genres_path.is_none() && model_path.is_none() {
        return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify a genres file via --genres or a saved model via --model."),
        );
    }

    let mut config = match matches.opt_str("c") {
        Some(path) => match HirConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(failure) => {
                let hint = format!("Problem with config file {}: {}", path, failure);
                return print_usage_and_exit(&program, opts, Some(&hint))
            },
        },
        None => HirConfig::default(),
    };

    match matches.opt_get("n") {
        Ok(Some(n)) => config.num_recommendations = n,
        Ok(None) => {},
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    }

    let min = matches.opt_get::<f64>("min");
    let max = matches.opt_get::<f64>("max");

    let bounds = match (min, max) {
        (Ok(min), Ok(max)) => (min, max),
        _ => return print_usage_and_exit(
            &program,
            opts,
            Some("Problem with options 'min'/'max': not a number"),
        ),
    };

    match bounds {
        (Some(min), Some(max)) => match PreferenceDomain::new(min, max) {
            Ok(domain) => config.preference_domain = Some(domain),
            Err(failure) => {
                let hint = failure.to_string();
                return print_usage_and_exit(&program, opts, Some(&hint))
            },
        },
        (None, None) => {},
        _ => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify both --min and --max."),
        ),
    }

    let parsed_users = matches.opt_strs("u").iter()
        .map(|user| user.parse::<UserId>())
        .collect::<Result<Vec<_>, _>>();

    let users = match parsed_users {
        Ok(users) => users,
        Err(failure) => {
            let hint = format!("Problem with option 'u': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if let Err(failure) = config.validate() {
        let hint = failure.to_string();
        return print_usage_and_exit(&program, opts, Some(&hint));
    }

    let run = Run {
        ratings_path,
        genres_path,
        model_path,
        save_model_path: matches.opt_str("s"),
        output_path: matches.opt_str("o"),
        users,
    };

    if let Err(failure) = run.execute(&config) {
        eprintln!("{}", failure);
        process::exit(1);
    }
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    if hint.is_some() {
        process::exit(1);
    }
}

struct Run {
    ratings_path: String,
    genres_path: Option<String>,
    model_path: Option<String>,
    save_model_path: Option<String>,
    output_path: Option<String>,
    users: Vec<UserId>,
}

impl Run {

    fn execute(self, config: &HirConfig) -> Result<(), Box<dyn Error>> {

        info!("Reading ratings from {}", self.ratings_path);

        let mut ratings_reader = io::csv_reader(&self.ratings_path, &config.ratings)?;
        let ratings = io::read_ratings(&mut ratings_reader)?;
        let histories = RatingHistories::from_ratings(ratings);

        info!(
            "Found {} ratings by {} users on {} items.",
            histories.num_ratings(),
            histories.num_users(),
            histories.num_items()
        );

        let model: HirModel = match (&self.model_path, &self.genres_path) {
            (Some(model_path), _) => {
                info!("Loading model from {}", model_path);
                io::read_model(model_path)?
            },
            (None, Some(genres_path)) => {
                info!("Reading genres from {}", genres_path);
                let mut genres_reader = io::csv_reader(genres_path, &config.genres)?;
                let catalog = io::read_genres(&mut genres_reader)?;
                HirModelBuilder::new(&catalog, &histories).build()?
            },
            (None, None) => return Err("neither a genres file nor a model given".into()),
        };

        if let Some(path) = &self.save_model_path {
            info!("Saving model to {}", path);
            io::write_model(&model, path)?;
        }

        let users = if self.users.is_empty() { histories.users() } else { self.users };

        let scorer = HirScorer::new(&model, config.preference_domain);

        info!("Computing {} recommendations for {} users", config.num_recommendations, users.len());

        let recommendations = recommend::recommend_all(
            &scorer,
            &histories,
            &users,
            config.num_recommendations,
            config.pool_size()
        );

        info!("Writing recommendations...");
        io::write_recommendations(&recommendations, self.output_path)?;

        Ok(())
    }
}
