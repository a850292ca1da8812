use std::collections::BTreeSet;

use crate::color::Theme;
use crate::data::aggregate::DashboardSummary;
use crate::data::filter::{self, FilterError, FilterParams, FilteredView, NumericRange};
use crate::data::model::{PassengerDataset, Pclass, Port, Sex};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. One per window; the dataset
/// is never modified after it is handed over.
pub struct AppState {
    pub dataset: PassengerDataset,

    /// Current filter selection.
    pub filters: FilterParams,

    /// Indices of passengers passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Every table for the current filters (cached).
    pub summary: DashboardSummary,

    pub theme: Theme,

    /// Draw every fare as a point over the box plot.
    pub show_outliers: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: PassengerDataset, filters: FilterParams) -> Self {
        let view = filter::apply(&dataset, &filters);
        let summary = DashboardSummary::compute(&view);
        let visible_indices = view.into_indices();
        Self {
            dataset,
            filters,
            visible_indices,
            summary,
            theme: Theme::default(),
            show_outliers: false,
            status_message: None,
        }
    }

    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::from_indices(&self.dataset, self.visible_indices.clone())
    }

    /// Recompute the view and every summary after a filter change.
    pub fn refilter(&mut self) {
        let view = filter::apply(&self.dataset, &self.filters);
        self.summary = DashboardSummary::compute(&view);
        self.visible_indices = view.into_indices();
        log::debug!(
            "{} of {} passengers visible",
            self.visible_indices.len(),
            self.dataset.len()
        );
    }

    /// Back to the initial selection: every category, full ranges.
    pub fn reset_filters(&mut self) {
        self.filters = FilterParams::for_dataset(&self.dataset);
        self.status_message = None;
        self.refilter();
    }

    pub fn toggle_sex(&mut self, sex: Sex) {
        let sexes = toggled(self.filters.sexes(), sex);
        self.filters.set_sexes(sexes);
        self.refilter();
    }

    pub fn toggle_class(&mut self, pclass: Pclass) {
        let classes = toggled(self.filters.classes(), pclass);
        self.filters.set_classes(classes);
        self.refilter();
    }

    pub fn toggle_port(&mut self, port: Port) {
        let ports = toggled(self.filters.ports(), port);
        self.filters.set_ports(ports);
        self.refilter();
    }

    pub fn set_include_missing_port(&mut self, include: bool) {
        self.filters.set_include_missing_port(include);
        self.refilter();
    }

    /// Apply raw slider input, clamped into the observed age span.
    pub fn set_age_range(&mut self, min: f64, max: f64, include_missing: bool) {
        let range = NumericRange::clamped_to(min, max, &self.dataset.age_bounds);
        let result = self
            .filters
            .set_age_range(range.min(), range.max(), include_missing);
        self.after_range_change(result);
    }

    /// Apply raw slider input, clamped into the observed fare span.
    pub fn set_fare_range(&mut self, min: f64, max: f64) {
        let range = NumericRange::clamped_to(min, max, &self.dataset.fare_bounds);
        let result = self.filters.set_fare_range(range.min(), range.max());
        self.after_range_change(result);
    }

    fn after_range_change(&mut self, result: Result<(), FilterError>) {
        match result {
            Ok(()) => self.refilter(),
            Err(e) => {
                log::warn!("ignoring filter input: {e}");
                self.status_message = Some(format!("Invalid filter: {e}"));
            }
        }
    }
}

fn toggled<T: Ord + Copy>(set: &BTreeSet<T>, value: T) -> BTreeSet<T> {
    let mut set = set.clone();
    if !set.remove(&value) {
        set.insert(value);
    }
    set
}
