use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use super::model::{Passenger, PassengerDataset, Pclass, Port, Sex};

/// Rejected filter input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("range minimum {min} is greater than maximum {max}")]
    InvertedRange { min: f64, max: f64 },
    #[error("range bound is not a number")]
    NotANumber,
}

// ---------------------------------------------------------------------------
// NumericRange – inclusive [min, max]
// ---------------------------------------------------------------------------

/// Inclusive numeric interval. Construction guarantees `min <= max` and no NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    min: f64,
    max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Result<Self, FilterError> {
        if min.is_nan() || max.is_nan() {
            return Err(FilterError::NotANumber);
        }
        if min > max {
            return Err(FilterError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Build from bounds already known to be ordered (observed min/max, constants).
    pub(crate) fn from_bounds((min, max): (f64, f64)) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Clamp both ends into `outer`, swapping them if they arrive inverted.
    /// Used for raw slider input before it reaches [`FilterParams`].
    pub fn clamped_to(min: f64, max: f64, outer: &NumericRange) -> Self {
        let clamp = |v: f64| {
            if v.is_nan() {
                outer.min
            } else {
                v.clamp(outer.min, outer.max)
            }
        };
        let (a, b) = (clamp(min), clamp(max));
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterParams – the full predicate conjunction
// ---------------------------------------------------------------------------

/// The current filter selection. An empty category set means "no restriction"
/// for that column, never "nothing selected".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    sexes: BTreeSet<Sex>,
    classes: BTreeSet<Pclass>,
    ports: BTreeSet<Port>,
    age: NumericRange,
    include_missing_age: bool,
    include_missing_port: bool,
    fare: NumericRange,
}

impl FilterParams {
    /// Everything present in the dataset selected, full observed ranges,
    /// passengers without an age included.
    pub fn for_dataset(dataset: &PassengerDataset) -> Self {
        let mut params = Self::unrestricted(dataset);
        params.sexes = dataset.sexes.clone();
        params.classes = Pclass::ALL.into_iter().collect();
        params.ports = dataset.ports.clone();
        params
    }

    /// Empty category sets and full observed ranges: passes every row.
    pub fn unrestricted(dataset: &PassengerDataset) -> Self {
        Self {
            sexes: BTreeSet::new(),
            classes: BTreeSet::new(),
            ports: BTreeSet::new(),
            age: dataset.age_bounds,
            include_missing_age: true,
            include_missing_port: false,
            fare: dataset.fare_bounds,
        }
    }

    pub fn sexes(&self) -> &BTreeSet<Sex> {
        &self.sexes
    }

    pub fn classes(&self) -> &BTreeSet<Pclass> {
        &self.classes
    }

    pub fn ports(&self) -> &BTreeSet<Port> {
        &self.ports
    }

    pub fn age(&self) -> NumericRange {
        self.age
    }

    pub fn include_missing_age(&self) -> bool {
        self.include_missing_age
    }

    pub fn include_missing_port(&self) -> bool {
        self.include_missing_port
    }

    pub fn fare(&self) -> NumericRange {
        self.fare
    }

    pub fn set_sexes(&mut self, sexes: impl IntoIterator<Item = Sex>) {
        self.sexes = sexes.into_iter().collect();
    }

    pub fn set_classes(&mut self, classes: impl IntoIterator<Item = Pclass>) {
        self.classes = classes.into_iter().collect();
    }

    pub fn set_ports(&mut self, ports: impl IntoIterator<Item = Port>) {
        self.ports = ports.into_iter().collect();
    }

    /// Replace the age range. On error the previous range is kept.
    pub fn set_age_range(
        &mut self,
        min: f64,
        max: f64,
        include_missing: bool,
    ) -> Result<(), FilterError> {
        self.age = NumericRange::new(min, max)?;
        self.include_missing_age = include_missing;
        Ok(())
    }

    /// Replace the fare range. On error the previous range is kept.
    pub fn set_fare_range(&mut self, min: f64, max: f64) -> Result<(), FilterError> {
        self.fare = NumericRange::new(min, max)?;
        Ok(())
    }

    /// Whether passengers without a port pass a non-empty port selection.
    pub fn set_include_missing_port(&mut self, include: bool) {
        self.include_missing_port = include;
    }

    /// Whether a single passenger satisfies every predicate.
    pub fn matches(&self, p: &Passenger) -> bool {
        if !self.sexes.is_empty() && !self.sexes.contains(&p.sex) {
            return false;
        }
        if !self.classes.is_empty() && !self.classes.contains(&p.pclass) {
            return false;
        }
        if !self.ports.is_empty() {
            let port_ok = match p.embarked {
                Some(port) => self.ports.contains(&port),
                None => self.include_missing_port,
            };
            if !port_ok {
                return false;
            }
        }
        let age_ok = match p.age {
            Some(age) => self.age.contains(age),
            None => self.include_missing_age,
        };
        age_ok && self.fare.contains(p.fare)
    }
}

/// Selection summary caption, e.g. `Sex: female | Class: All | Embarked: C, S`.
impl fmt::Display for FilterParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T>(set: &BTreeSet<T>, label: impl Fn(&T) -> String) -> String {
            if set.is_empty() {
                "All".to_string()
            } else {
                set.iter().map(label).collect::<Vec<_>>().join(", ")
            }
        }
        write!(
            f,
            "Sex: {} | Class: {} | Embarked: {}",
            join(&self.sexes, |s| s.to_string()),
            join(&self.classes, |c| c.label().to_string()),
            join(&self.ports, |p| p.label().to_string()),
        )
    }
}

// ---------------------------------------------------------------------------
// FilteredView – read-only subset of the dataset
// ---------------------------------------------------------------------------

/// Rows of a dataset passing a [`FilterParams`], in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a PassengerDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Rebuild a view from indices computed earlier against the same dataset.
    pub fn from_indices(dataset: &'a PassengerDataset, indices: Vec<usize>) -> Self {
        debug_assert!(indices.iter().all(|&i| i < dataset.len()));
        Self { dataset, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Passenger> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.passengers[i])
    }
}

impl<'v, 'a> IntoIterator for &'v FilteredView<'a> {
    type Item = &'a Passenger;
    type IntoIter = Box<dyn Iterator<Item = &'a Passenger> + 'v>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Return indices of passengers that pass all active filters.
pub fn filtered_indices(dataset: &PassengerDataset, params: &FilterParams) -> Vec<usize> {
    dataset
        .passengers
        .iter()
        .enumerate()
        .filter(|(_, p)| params.matches(p))
        .map(|(i, _)| i)
        .collect()
}

/// Compute the filtered view. Pure: the dataset is only read.
pub fn apply<'a>(dataset: &'a PassengerDataset, params: &FilterParams) -> FilteredView<'a> {
    FilteredView::from_indices(dataset, filtered_indices(dataset, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{passenger, sample_dataset};

    #[test]
    fn range_rejects_inverted_and_nan_bounds() {
        assert_eq!(
            NumericRange::new(10.0, 5.0),
            Err(FilterError::InvertedRange { min: 10.0, max: 5.0 })
        );
        assert_eq!(NumericRange::new(f64::NAN, 5.0), Err(FilterError::NotANumber));
        assert!(NumericRange::new(5.0, 5.0).is_ok());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let r = NumericRange::new(7.25, 30.0).unwrap();
        assert!(r.contains(7.25));
        assert!(r.contains(30.0));
        assert!(!r.contains(30.0001));
    }

    #[test]
    fn clamping_orders_and_bounds_slider_input() {
        let outer = NumericRange::new(0.0, 80.0).unwrap();
        let r = NumericRange::clamped_to(95.0, -3.0, &outer);
        assert_eq!((r.min(), r.max()), (0.0, 80.0));
        let r = NumericRange::clamped_to(f64::NAN, 20.0, &outer);
        assert_eq!((r.min(), r.max()), (0.0, 20.0));
    }

    #[test]
    fn rejected_range_keeps_previous_value() {
        let ds = sample_dataset();
        let mut params = FilterParams::for_dataset(&ds);
        let before = params.fare();
        assert!(params.set_fare_range(100.0, 1.0).is_err());
        assert_eq!(params.fare(), before);
        assert!(params.set_age_range(50.0, 10.0, false).is_err());
        assert!(params.include_missing_age());
    }

    #[test]
    fn view_is_subset_with_unmodified_rows() {
        let ds = sample_dataset();
        let mut params = FilterParams::for_dataset(&ds);
        params.set_sexes([Sex::Female]);
        params.set_fare_range(0.0, 30.0).unwrap();
        let view = apply(&ds, &params);
        assert!(!view.is_empty());
        for (&i, p) in view.indices().iter().zip(view.iter()) {
            assert_eq!(p, &ds.passengers[i]);
            assert_eq!(p.sex, Sex::Female);
            assert!(p.fare <= 30.0);
        }
        assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_selection_means_all() {
        let ds = sample_dataset();
        let unrestricted = FilterParams::unrestricted(&ds);
        assert_eq!(apply(&ds, &unrestricted).len(), ds.len());

        let mut params = FilterParams::unrestricted(&ds);
        params.set_classes([Pclass::First]);
        let only_first = apply(&ds, &params).len();
        params.set_sexes([]);
        params.set_ports([]);
        assert_eq!(apply(&ds, &params).len(), only_first);
        params.set_classes([]);
        assert_eq!(apply(&ds, &params).len(), ds.len());
    }

    #[test]
    fn full_ranges_without_restrictions_round_trip() {
        let ds = sample_dataset();
        let mut params = FilterParams::unrestricted(&ds);
        params
            .set_age_range(ds.age_bounds.min(), ds.age_bounds.max(), true)
            .unwrap();
        params
            .set_fare_range(ds.fare_bounds.min(), ds.fare_bounds.max())
            .unwrap();
        let view = apply(&ds, &params);
        let rows: Vec<&Passenger> = view.iter().collect();
        let base: Vec<&Passenger> = ds.passengers.iter().collect();
        assert_eq!(rows, base);
    }

    #[test]
    fn missing_port_excluded_by_port_selection_unless_requested() {
        let ds = PassengerDataset::from_passengers(vec![
            passenger(1, true, Pclass::First, Sex::Female, Some(38.0), 80.0, None),
            passenger(2, true, Pclass::First, Sex::Female, Some(62.0), 80.0, Some(Port::S)),
        ]);
        let mut params = FilterParams::for_dataset(&ds);
        assert_eq!(apply(&ds, &params).indices(), &[1]);

        params.set_include_missing_port(true);
        assert_eq!(apply(&ds, &params).indices(), &[0, 1]);

        params.set_include_missing_port(false);
        params.set_ports([]);
        assert_eq!(apply(&ds, &params).indices(), &[0, 1]);
    }

    #[test]
    fn missing_age_follows_toggle() {
        let ds = PassengerDataset::from_passengers(vec![
            passenger(1, false, Pclass::Third, Sex::Male, None, 8.05, Some(Port::S)),
            passenger(2, false, Pclass::Third, Sex::Male, Some(35.0), 8.05, Some(Port::S)),
            passenger(3, true, Pclass::Third, Sex::Male, Some(4.0), 8.05, Some(Port::S)),
        ]);
        let mut params = FilterParams::for_dataset(&ds);
        params.set_age_range(10.0, 40.0, true).unwrap();
        assert_eq!(apply(&ds, &params).indices(), &[0, 1]);
        params.set_age_range(10.0, 40.0, false).unwrap();
        assert_eq!(apply(&ds, &params).indices(), &[1]);
    }

    #[test]
    fn setters_are_idempotent() {
        let ds = sample_dataset();
        let mut once = FilterParams::for_dataset(&ds);
        once.set_ports([Port::C, Port::Q]);
        once.set_fare_range(5.0, 50.0).unwrap();
        let mut twice = once.clone();
        twice.set_ports([Port::C, Port::Q]);
        twice.set_fare_range(5.0, 50.0).unwrap();
        assert_eq!(once, twice);
        assert_eq!(apply(&ds, &once).indices(), apply(&ds, &twice).indices());
    }

    #[test]
    fn caption_lists_selection_or_all() {
        let ds = sample_dataset();
        let mut params = FilterParams::unrestricted(&ds);
        params.set_sexes([Sex::Male, Sex::Female]);
        params.set_ports([Port::S]);
        assert_eq!(
            params.to_string(),
            "Sex: female, male | Class: All | Embarked: Southampton (S)"
        );
    }
}
