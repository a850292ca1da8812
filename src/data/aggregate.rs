//! Summary tables computed from a filtered view.
//!
//! Every function here accepts any iterator of passengers, is total over the
//! empty input and reports empty groups as missing rows (or `None` cells)
//! rather than dividing by zero.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::filter::FilteredView;
use super::model::{Passenger, Pclass, Port, Sex};

/// Maximum rows kept by the ranked tables.
pub const TOP_N: usize = 5;
/// Bins in the age histogram.
pub const AGE_HISTOGRAM_BINS: usize = 30;

// ---------------------------------------------------------------------------
// Tally – survivors / total for one group
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    survivors: usize,
    total: usize,
}

impl Tally {
    fn add(&mut self, survived: bool) {
        self.total += 1;
        if survived {
            self.survivors += 1;
        }
    }

    fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.survivors as f64 / self.total as f64
        }
    }
}

fn tally_by<'a, K: Ord>(
    rows: impl IntoIterator<Item = &'a Passenger>,
    key: impl Fn(&Passenger) -> Option<K>,
) -> BTreeMap<K, Tally> {
    let mut groups: BTreeMap<K, Tally> = BTreeMap::new();
    for p in rows {
        if let Some(k) = key(p) {
            groups.entry(k).or_default().add(p.survived);
        }
    }
    groups
}

/// Stable sort, highest first, then truncate.
fn top_by<T>(mut items: Vec<T>, n: usize, metric: impl Fn(&T) -> f64) -> Vec<T> {
    items.sort_by(|a, b| metric(b).total_cmp(&metric(a)));
    items.truncate(n);
    items
}

// ---------------------------------------------------------------------------
// 1. Survival counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SurvivalCounts {
    pub survived: usize,
    pub died: usize,
    pub total: usize,
    /// Fraction in `[0, 1]`; `0` for an empty view.
    pub rate: f64,
}

impl SurvivalCounts {
    pub fn rate_percent(&self) -> f64 {
        self.rate * 100.0
    }
}

pub fn survival_counts<'a>(rows: impl IntoIterator<Item = &'a Passenger>) -> SurvivalCounts {
    let mut tally = Tally::default();
    for p in rows {
        tally.add(p.survived);
    }
    SurvivalCounts {
        survived: tally.survivors,
        died: tally.total - tally.survivors,
        total: tally.total,
        rate: tally.rate(),
    }
}

// ---------------------------------------------------------------------------
// 2. Survival by class
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassRate {
    pub pclass: Pclass,
    pub survivors: usize,
    pub total: usize,
    pub rate: f64,
}

/// Mean survival per class present, ascending by class.
pub fn class_survival<'a>(rows: impl IntoIterator<Item = &'a Passenger>) -> Vec<ClassRate> {
    tally_by(rows, |p| Some(p.pclass))
        .into_iter()
        .map(|(pclass, t)| ClassRate {
            pclass,
            survivors: t.survivors,
            total: t.total,
            rate: t.rate(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// 3. Age band × class
// ---------------------------------------------------------------------------

/// Half-open age interval used by the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeBand {
    Under10,
    Teens,
    Twenties,
    Thirties,
    Forties,
    Fifties,
    SixtyTo80,
}

impl AgeBand {
    pub const ALL: [AgeBand; 7] = [
        AgeBand::Under10,
        AgeBand::Teens,
        AgeBand::Twenties,
        AgeBand::Thirties,
        AgeBand::Forties,
        AgeBand::Fifties,
        AgeBand::SixtyTo80,
    ];

    pub fn bounds(self) -> (f64, f64) {
        match self {
            AgeBand::Under10 => (0.0, 10.0),
            AgeBand::Teens => (10.0, 20.0),
            AgeBand::Twenties => (20.0, 30.0),
            AgeBand::Thirties => (30.0, 40.0),
            AgeBand::Forties => (40.0, 50.0),
            AgeBand::Fifties => (50.0, 60.0),
            AgeBand::SixtyTo80 => (60.0, 80.0),
        }
    }

    /// Band containing `age`; `None` below 0 or from 80 up.
    pub fn for_age(age: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|band| {
            let (lo, hi) = band.bounds();
            lo <= age && age < hi
        })
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.bounds();
        write!(f, "[{lo}, {hi})")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgeBandRate {
    pub band: AgeBand,
    pub pclass: Pclass,
    pub survivors: usize,
    pub total: usize,
    pub rate: f64,
}

/// Mean survival per (age band, class) pair present. Passengers without an
/// age, or aged 80 and over, fall in no band and are skipped.
pub fn age_class_survival<'a>(rows: impl IntoIterator<Item = &'a Passenger>) -> Vec<AgeBandRate> {
    tally_by(rows, |p| {
        let band = AgeBand::for_age(p.age?)?;
        Some((band, p.pclass))
    })
    .into_iter()
    .map(|((band, pclass), t)| AgeBandRate {
        band,
        pclass,
        survivors: t.survivors,
        total: t.total,
        rate: t.rate(),
    })
    .collect()
}

// ---------------------------------------------------------------------------
// 4. Class × port pivot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub pclass: Pclass,
    /// Aligned with [`PortPivot::ports`]; `None` where the group is empty.
    pub cells: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortPivot {
    /// Ports seen in the view, in C, Q, S order.
    pub ports: Vec<Port>,
    /// Always one row per class, 1 to 3.
    pub rows: Vec<PivotRow>,
}

impl PortPivot {
    pub fn cell(&self, pclass: Pclass, port: Port) -> Option<f64> {
        let col = self.ports.iter().position(|&p| p == port)?;
        let row = self.rows.iter().find(|r| r.pclass == pclass)?;
        row.cells[col]
    }
}

/// Mean survival by class (rows) and port (columns). Passengers without a
/// port are left out.
pub fn class_port_pivot<'a>(rows: impl IntoIterator<Item = &'a Passenger>) -> PortPivot {
    let groups = tally_by(rows, |p| Some((p.pclass, p.embarked?)));
    let ports: Vec<Port> = Port::ALL
        .into_iter()
        .filter(|port| groups.keys().any(|(_, p)| p == port))
        .collect();
    let rows = Pclass::ALL
        .into_iter()
        .map(|pclass| PivotRow {
            pclass,
            cells: ports
                .iter()
                .map(|&port| groups.get(&(pclass, port)).map(Tally::rate))
                .collect(),
        })
        .collect();
    PortPivot { ports, rows }
}

// ---------------------------------------------------------------------------
// 5. Survivors by port
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortCount {
    pub port: Port,
    pub survivors: usize,
}

/// Survivor count per port, most survivors first.
pub fn survivors_by_port<'a>(rows: impl IntoIterator<Item = &'a Passenger>) -> Vec<PortCount> {
    let counts = tally_by(rows.into_iter().filter(|p| p.survived), |p| p.embarked);
    let items = counts
        .into_iter()
        .map(|(port, t)| PortCount {
            port,
            survivors: t.total,
        })
        .collect();
    top_by(items, usize::MAX, |c| c.survivors as f64)
}

// ---------------------------------------------------------------------------
// 6. Sex × class, top 5
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SexClassRate {
    pub sex: Sex,
    pub pclass: Pclass,
    pub survivors: usize,
    pub total: usize,
    pub rate: f64,
}

/// The five (sex, class) groups with the highest survival rate.
pub fn top_sex_class<'a>(rows: impl IntoIterator<Item = &'a Passenger>) -> Vec<SexClassRate> {
    let items = tally_by(rows, |p| Some((p.sex, p.pclass)))
        .into_iter()
        .map(|((sex, pclass), t)| SexClassRate {
            sex,
            pclass,
            survivors: t.survivors,
            total: t.total,
            rate: t.rate(),
        })
        .collect();
    top_by(items, TOP_N, |r| r.rate)
}

// ---------------------------------------------------------------------------
// 7. Surnames with most survivors, top 5
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurnameCount {
    pub last_name: String,
    pub survivors: usize,
}

/// Surnames ranked by survivor count; ties keep alphabetical order.
pub fn top_surnames<'a>(rows: impl IntoIterator<Item = &'a Passenger>) -> Vec<SurnameCount> {
    let counts = tally_by(rows.into_iter().filter(|p| p.survived), |p| {
        Some(p.last_name().to_string())
    });
    let items = counts
        .into_iter()
        .map(|(last_name, t)| SurnameCount {
            last_name,
            survivors: t.total,
        })
        .collect();
    top_by(items, TOP_N, |c| c.survivors as f64)
}

// ---------------------------------------------------------------------------
// Age histogram (survived vs died)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AgeHistogram {
    pub start: f64,
    pub bin_width: f64,
    pub survived: Vec<usize>,
    pub died: Vec<usize>,
}

impl AgeHistogram {
    pub fn bins(&self) -> usize {
        self.survived.len()
    }

    pub fn bin_center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bin_width
    }
}

/// Equal-width bins spanning the known ages in `rows`. Empty when no age is
/// known.
pub fn age_histogram<'a>(
    rows: impl IntoIterator<Item = &'a Passenger>,
    bins: usize,
) -> AgeHistogram {
    let aged: Vec<(f64, bool)> = rows
        .into_iter()
        .filter_map(|p| p.age.map(|a| (a, p.survived)))
        .collect();
    if aged.is_empty() || bins == 0 {
        return AgeHistogram::default();
    }
    let lo = aged.iter().map(|(a, _)| *a).fold(f64::INFINITY, f64::min);
    let hi = aged.iter().map(|(a, _)| *a).fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    let bin_width = if span > 0.0 { span / bins as f64 } else { 1.0 };

    let mut hist = AgeHistogram {
        start: lo,
        bin_width,
        survived: vec![0; bins],
        died: vec![0; bins],
    };
    for (age, survived) in aged {
        let idx = (((age - lo) / bin_width).floor() as usize).min(bins - 1);
        if survived {
            hist.survived[idx] += 1;
        } else {
            hist.died[idx] += 1;
        }
    }
    hist
}

// ---------------------------------------------------------------------------
// Fare box plots per class × survival
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareBox {
    pub pclass: Pclass,
    pub survived: bool,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Fares beyond 1.5 × IQR from the box.
    pub outliers: Vec<f64>,
    /// Every fare in the group, ascending.
    pub fares: Vec<f64>,
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Box statistics per (class, survived) group present, ordered by class with
/// non-survivors first.
pub fn fare_boxes<'a>(rows: impl IntoIterator<Item = &'a Passenger>) -> Vec<FareBox> {
    let mut groups: BTreeMap<(Pclass, bool), Vec<f64>> = BTreeMap::new();
    for p in rows {
        groups.entry((p.pclass, p.survived)).or_default().push(p.fare);
    }
    groups
        .into_iter()
        .map(|((pclass, survived), mut fares)| {
            fares.sort_by(f64::total_cmp);
            let q1 = quantile(&fares, 0.25);
            let median = quantile(&fares, 0.5);
            let q3 = quantile(&fares, 0.75);
            let iqr = q3 - q1;
            let (fence_lo, fence_hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
            let inside = fares.iter().copied().filter(|f| (fence_lo..=fence_hi).contains(f));
            let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
            let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
            let outliers = fares
                .iter()
                .copied()
                .filter(|f| !(fence_lo..=fence_hi).contains(f))
                .collect();
            FareBox {
                pclass,
                survived,
                lower_whisker,
                q1,
                median,
                q3,
                upper_whisker,
                outliers,
                fares,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// DashboardSummary – every table for one render pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub rows: usize,
    pub counts: SurvivalCounts,
    pub by_class: Vec<ClassRate>,
    pub age_class: Vec<AgeBandRate>,
    pub class_port: PortPivot,
    pub port_survivors: Vec<PortCount>,
    pub top_sex_class: Vec<SexClassRate>,
    pub top_surnames: Vec<SurnameCount>,
    pub age_histogram: AgeHistogram,
    pub fare_boxes: Vec<FareBox>,
}

impl DashboardSummary {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let rows: Vec<&Passenger> = view.iter().collect();
        let it = || rows.iter().copied();
        DashboardSummary {
            rows: rows.len(),
            counts: survival_counts(it()),
            by_class: class_survival(it()),
            age_class: age_class_survival(it()),
            class_port: class_port_pivot(it()),
            port_survivors: survivors_by_port(it()),
            top_sex_class: top_sex_class(it()),
            top_surnames: top_surnames(it()),
            age_histogram: age_histogram(it(), AGE_HISTOGRAM_BINS),
            fare_boxes: fare_boxes(it()),
        }
    }
}
