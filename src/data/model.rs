use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::filter::NumericRange;

/// Age range used when no passenger has a known age.
pub const DEFAULT_AGE_BOUNDS: (f64, f64) = (0.0, 80.0);
/// Fare range used when the dataset has no rows.
pub const DEFAULT_FARE_BOUNDS: (f64, f64) = (0.0, 600.0);

/// Text that does not name a known category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseCategoryError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseCategoryError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Categorical columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Female, Sex::Male];

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }
}

impl FromStr for Sex {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Sex::Female),
            "male" => Ok(Sex::Male),
            _ => Err(ParseCategoryError::new("sex", s)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket class. Ordering follows the class number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Pclass {
    First,
    Second,
    Third,
}

impl Pclass {
    pub const ALL: [Pclass; 3] = [Pclass::First, Pclass::Second, Pclass::Third];

    pub fn number(self) -> u8 {
        match self {
            Pclass::First => 1,
            Pclass::Second => 2,
            Pclass::Third => 3,
        }
    }

    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Pclass::First),
            2 => Some(Pclass::Second),
            3 => Some(Pclass::Third),
            _ => None,
        }
    }

    /// Short label used in captions and chart legends.
    pub fn label(self) -> &'static str {
        match self {
            Pclass::First => "1st class",
            Pclass::Second => "2nd class",
            Pclass::Third => "3rd class",
        }
    }
}

impl From<Pclass> for u8 {
    fn from(value: Pclass) -> Self {
        value.number()
    }
}

impl FromStr for Pclass {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(Pclass::from_number)
            .ok_or_else(|| ParseCategoryError::new("class", s))
    }
}

impl fmt::Display for Pclass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Port of embarkation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Port {
    C,
    Q,
    S,
}

impl Port {
    pub const ALL: [Port; 3] = [Port::C, Port::Q, Port::S];

    pub fn code(self) -> &'static str {
        match self {
            Port::C => "C",
            Port::Q => "Q",
            Port::S => "S",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Port::C => "Cherbourg (C)",
            Port::Q => "Queenstown (Q)",
            Port::S => "Southampton (S)",
        }
    }
}

impl FromStr for Port {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Ok(Port::C),
            "Q" => Ok(Port::Q),
            "S" => Ok(Port::S),
            _ => Err(ParseCategoryError::new("port", s)),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Passenger – one row of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Passenger {
    pub id: u32,
    pub survived: bool,
    pub pclass: Pclass,
    pub name: String,
    pub sex: Sex,
    /// Unknown for a sizeable share of the passengers.
    pub age: Option<f64>,
    pub sib_sp: u32,
    pub parch: u32,
    pub ticket: String,
    pub fare: f64,
    pub cabin: Option<String>,
    pub embarked: Option<Port>,
}

impl Passenger {
    /// Family name: everything before the first comma of `name`.
    ///
    /// `"Braund, Mr. Owen Harris"` → `"Braund"`.
    pub fn last_name(&self) -> &str {
        last_name(&self.name)
    }
}

pub fn last_name(name: &str) -> &str {
    name.split(',').next().unwrap_or(name)
}

// ---------------------------------------------------------------------------
// PassengerDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded table with bounds and category sets observed at load time.
/// Never mutated after construction.
#[derive(Debug, Clone)]
pub struct PassengerDataset {
    pub passengers: Vec<Passenger>,
    /// Observed age span, or [`DEFAULT_AGE_BOUNDS`] when no age is known.
    pub age_bounds: NumericRange,
    /// Observed fare span, or [`DEFAULT_FARE_BOUNDS`] for an empty table.
    pub fare_bounds: NumericRange,
    /// Sexes present, sorted.
    pub sexes: BTreeSet<Sex>,
    /// Ports present (missing ports are not listed), in C, Q, S order.
    pub ports: BTreeSet<Port>,
}

impl PassengerDataset {
    pub fn from_passengers(passengers: Vec<Passenger>) -> Self {
        let age_bounds = observed_range(passengers.iter().filter_map(|p| p.age))
            .unwrap_or(NumericRange::from_bounds(DEFAULT_AGE_BOUNDS));
        let fare_bounds = observed_range(passengers.iter().map(|p| p.fare))
            .unwrap_or(NumericRange::from_bounds(DEFAULT_FARE_BOUNDS));
        let sexes = passengers.iter().map(|p| p.sex).collect();
        let ports = passengers.iter().filter_map(|p| p.embarked).collect();

        PassengerDataset {
            passengers,
            age_bounds,
            fare_bounds,
            sexes,
            ports,
        }
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }
}

fn observed_range(values: impl Iterator<Item = f64>) -> Option<NumericRange> {
    values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
    .map(NumericRange::from_bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::passenger;

    #[test]
    fn last_name_is_text_before_first_comma() {
        assert_eq!(last_name("Braund, Mr. Owen Harris"), "Braund");
        assert_eq!(last_name("Smith, Jr., Mr. John"), "Smith");
        assert_eq!(last_name("Nobody"), "Nobody");
        assert_eq!(last_name("Braund , Mr. Owen"), "Braund ");
    }

    #[test]
    fn categories_parse_case_insensitively() {
        assert_eq!("Male".parse::<Sex>(), Ok(Sex::Male));
        assert_eq!(" female ".parse::<Sex>(), Ok(Sex::Female));
        assert_eq!("2".parse::<Pclass>(), Ok(Pclass::Second));
        assert_eq!("q".parse::<Port>(), Ok(Port::Q));
        assert!("4".parse::<Pclass>().is_err());
        assert!("X".parse::<Port>().is_err());
        assert!("".parse::<Sex>().is_err());
    }

    #[test]
    fn bounds_come_from_observed_values() {
        let ds = PassengerDataset::from_passengers(vec![
            passenger(1, true, Pclass::First, Sex::Female, Some(0.42), 71.28, Some(Port::C)),
            passenger(2, false, Pclass::Third, Sex::Male, None, 7.25, None),
            passenger(3, false, Pclass::Third, Sex::Male, Some(70.5), 512.33, Some(Port::S)),
        ]);
        assert_eq!(ds.age_bounds, NumericRange::from_bounds((0.42, 70.5)));
        assert_eq!(ds.fare_bounds, NumericRange::from_bounds((7.25, 512.33)));
        assert_eq!(ds.ports.iter().copied().collect::<Vec<_>>(), vec![Port::C, Port::S]);
        assert_eq!(ds.sexes.len(), 2);
    }

    #[test]
    fn bounds_fall_back_when_values_are_missing() {
        let ds = PassengerDataset::from_passengers(vec![passenger(
            1,
            true,
            Pclass::Second,
            Sex::Female,
            None,
            13.0,
            Some(Port::S),
        )]);
        assert_eq!(ds.age_bounds, NumericRange::from_bounds(DEFAULT_AGE_BOUNDS));

        let empty = PassengerDataset::from_passengers(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.fare_bounds, NumericRange::from_bounds(DEFAULT_FARE_BOUNDS));
    }
}
