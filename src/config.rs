use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;

use crate::data::filter::FilterParams;
use crate::data::model::{PassengerDataset, Pclass, Port, Sex};

/// Looked up in the working directory when no path is given.
pub const DEFAULT_DATA_FILE: &str = "titanic.csv";

/// Titanic survival dashboard.
///
/// Category flags take comma-separated lists; leaving one out (or passing an
/// empty list) means no restriction on that column.
#[derive(Debug, Parser)]
#[command(name = "titanic-dash", version, about)]
pub struct Cli {
    /// Passenger table (.csv, .tsv or .parquet).
    #[arg(env = "TITANIC_DATA", value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Print every summary table as JSON and exit instead of opening the window.
    #[arg(long)]
    pub summary: bool,

    #[arg(long, value_delimiter = ',')]
    pub sex: Vec<Sex>,

    /// Ticket classes (1, 2, 3).
    #[arg(long, value_delimiter = ',')]
    pub pclass: Vec<Pclass>,

    /// Ports of embarkation (C, Q, S).
    #[arg(long, value_delimiter = ',')]
    pub embarked: Vec<Port>,

    /// Keep passengers without a port when `--embarked` is given.
    #[arg(long)]
    pub include_missing_port: bool,

    #[arg(long)]
    pub age_min: Option<f64>,

    #[arg(long)]
    pub age_max: Option<f64>,

    /// Drop passengers whose age is unknown.
    #[arg(long)]
    pub exclude_missing_age: bool,

    #[arg(long)]
    pub fare_min: Option<f64>,

    #[arg(long)]
    pub fare_max: Option<f64>,
}

impl Cli {
    /// The file to load: explicit path or `$TITANIC_DATA`, then
    /// [`DEFAULT_DATA_FILE`], then (window mode only) a file dialog.
    pub fn resolve_data_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.data {
            return Ok(path.clone());
        }
        let default = Path::new(DEFAULT_DATA_FILE);
        if default.exists() {
            return Ok(default.to_path_buf());
        }
        if self.summary {
            bail!("no passenger table given and {DEFAULT_DATA_FILE} not found");
        }
        match rfd::FileDialog::new()
            .set_title("Open passenger table")
            .add_filter("Supported files", &["csv", "tsv", "tab", "parquet", "pq"])
            .pick_file()
        {
            Some(path) => Ok(path),
            None => bail!("no passenger table selected"),
        }
    }

    /// Whether any filter flag was given.
    pub fn has_filter_flags(&self) -> bool {
        !self.sex.is_empty()
            || !self.pclass.is_empty()
            || !self.embarked.is_empty()
            || self.include_missing_port
            || self.exclude_missing_age
            || self.age_min.is_some()
            || self.age_max.is_some()
            || self.fare_min.is_some()
            || self.fare_max.is_some()
    }

    /// Turn the flags into filter parameters, starting from no restriction and
    /// the dataset's observed ranges.
    pub fn filter_params(&self, dataset: &PassengerDataset) -> Result<FilterParams> {
        let mut params = FilterParams::unrestricted(dataset);
        params.set_sexes(self.sex.iter().copied());
        params.set_classes(self.pclass.iter().copied());
        params.set_ports(self.embarked.iter().copied());
        params.set_include_missing_port(self.include_missing_port);

        let age = dataset.age_bounds;
        params.set_age_range(
            self.age_min.unwrap_or(age.min()),
            self.age_max.unwrap_or(age.max()),
            !self.exclude_missing_age,
        )?;
        let fare = dataset.fare_bounds;
        params.set_fare_range(
            self.fare_min.unwrap_or(fare.min()),
            self.fare_max.unwrap_or(fare.max()),
        )?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::apply;
    use crate::data::test_support::sample_dataset;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("titanic-dash").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_select_everything() {
        let ds = sample_dataset();
        let cli = parse(&["titanic.csv"]);
        assert_eq!(cli.data.as_deref(), Some(Path::new("titanic.csv")));
        assert!(!cli.has_filter_flags());
        let params = cli.filter_params(&ds).unwrap();
        assert_eq!(params, FilterParams::unrestricted(&ds));
        assert_eq!(apply(&ds, &params).len(), ds.len());
    }

    #[test]
    fn category_lists_and_ranges_are_parsed() {
        let ds = sample_dataset();
        let cli = parse(&[
            "--sex", "female", "--pclass", "1,2", "--embarked", "c,s", "--fare-max", "60",
            "--exclude-missing-age", "--summary",
        ]);
        assert!(cli.summary);
        assert!(cli.has_filter_flags());
        let params = cli.filter_params(&ds).unwrap();
        assert_eq!(params.sexes().iter().copied().collect::<Vec<_>>(), vec![Sex::Female]);
        assert_eq!(params.classes().len(), 2);
        assert_eq!(params.ports().iter().copied().collect::<Vec<_>>(), vec![Port::C, Port::S]);
        assert_eq!(params.fare().max(), 60.0);
        assert!(!params.include_missing_age());
        let view = apply(&ds, &params);
        // Futrelle (53.1), Nasser (30.07); Cumings is over the fare cap
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Cli::try_parse_from(["titanic-dash", "--pclass", "4"]).is_err());
        assert!(Cli::try_parse_from(["titanic-dash", "--sex", "robot"]).is_err());

        let ds = sample_dataset();
        let cli = parse(&["--age-min", "50", "--age-max", "10"]);
        assert!(cli.filter_params(&ds).is_err());
    }
}
