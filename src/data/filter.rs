use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{RentalDataset, RentalRecord, Season, Weather};

// ---------------------------------------------------------------------------
// Filter inputs
// ---------------------------------------------------------------------------

/// Working-day tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingDayFilter {
    #[default]
    All,
    WorkingOnly,
    NonWorkingOnly,
}

impl WorkingDayFilter {
    pub const ALL: [WorkingDayFilter; 3] = [
        WorkingDayFilter::All,
        WorkingDayFilter::WorkingOnly,
        WorkingDayFilter::NonWorkingOnly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkingDayFilter::All => "All",
            WorkingDayFilter::WorkingOnly => "Working days only",
            WorkingDayFilter::NonWorkingOnly => "Non-working days only",
        }
    }

    fn accepts(self, working_day: bool) -> bool {
        match self {
            WorkingDayFilter::All => true,
            WorkingDayFilter::WorkingOnly => working_day,
            WorkingDayFilter::NonWorkingOnly => !working_day,
        }
    }
}

/// Which count column feeds every aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMetric {
    #[default]
    Total,
    Registered,
}

impl TargetMetric {
    pub const ALL: [TargetMetric; 2] = [TargetMetric::Total, TargetMetric::Registered];

    pub fn label(self) -> &'static str {
        match self {
            TargetMetric::Total => "Total rentals",
            TargetMetric::Registered => "Registered users",
        }
    }

    /// Source column name.
    pub fn column(self) -> &'static str {
        match self {
            TargetMetric::Total => "count",
            TargetMetric::Registered => "registered",
        }
    }

    pub fn value(self, rec: &RentalRecord) -> u32 {
        match self {
            TargetMetric::Total => rec.count,
            TargetMetric::Registered => rec.registered,
        }
    }
}

pub const MIN_HOUR: u32 = 0;
pub const MAX_HOUR: u32 = 23;

/// Everything the sidebar controls.
///
/// An empty `seasons` / `weathers` set means "no constraint", the same as a
/// set holding every value. `hour_min..=hour_max` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub year: Option<i32>,
    pub seasons: BTreeSet<Season>,
    pub weathers: BTreeSet<Weather>,
    pub working_day: WorkingDayFilter,
    pub hour_min: u32,
    pub hour_max: u32,
    pub target: TargetMetric,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            year: None,
            seasons: BTreeSet::new(),
            weathers: BTreeSet::new(),
            working_day: WorkingDayFilter::All,
            hour_min: MIN_HOUR,
            hour_max: MAX_HOUR,
            target: TargetMetric::Total,
        }
    }
}

impl FilterState {
    /// Set the lower hour bound, pushing the upper bound up if needed.
    pub fn set_hour_min(&mut self, hour: u32) {
        self.hour_min = hour.min(MAX_HOUR);
        if self.hour_max < self.hour_min {
            self.hour_max = self.hour_min;
        }
    }

    /// Set the upper hour bound, pulling the lower bound down if needed.
    pub fn set_hour_max(&mut self, hour: u32) {
        self.hour_max = hour.min(MAX_HOUR);
        if self.hour_min > self.hour_max {
            self.hour_min = self.hour_max;
        }
    }

    /// Whether a record satisfies every active predicate.
    pub fn matches(&self, rec: &RentalRecord) -> bool {
        if let Some(year) = self.year {
            if rec.year != year {
                return false;
            }
        }
        if !self.seasons.is_empty() && !self.seasons.contains(&rec.season) {
            return false;
        }
        if !self.weathers.is_empty() && !self.weathers.contains(&rec.weather) {
            return false;
        }
        if !self.working_day.accepts(rec.working_day) {
            return false;
        }
        rec.hour >= self.hour_min && rec.hour <= self.hour_max
    }

    /// True when no predicate can exclude a row of `dataset`.
    pub fn is_unconstrained(&self, dataset: &RentalDataset) -> bool {
        self.year.is_none()
            && (self.seasons.is_empty() || dataset.seasons.is_subset(&self.seasons))
            && (self.weathers.is_empty() || dataset.weathers.is_subset(&self.weathers))
            && self.working_day == WorkingDayFilter::All
            && self.hour_min == MIN_HOUR
            && self.hour_max == MAX_HOUR
    }
}

/// Apply a checkbox toggle to a multi-select where the empty set means
/// "everything". Selecting the last missing value, or deselecting the last
/// selected one, collapses back to the empty set.
pub fn toggle_selection<T: Ord + Copy>(selected: &mut BTreeSet<T>, available: &BTreeSet<T>, value: T, on: bool) {
    if selected.is_empty() {
        if on {
            return;
        }
        *selected = available.clone();
    }
    if on {
        selected.insert(value);
    } else {
        selected.remove(&value);
    }
    if available.is_subset(selected) {
        selected.clear();
    }
}

/// Whether `value` shows as checked in a multi-select.
pub fn is_selected<T: Ord>(selected: &BTreeSet<T>, value: &T) -> bool {
    selected.is_empty() || selected.contains(value)
}

/// Return indices of records that pass all active filters, ascending.
pub fn filtered_indices(dataset: &RentalDataset, filters: &FilterState) -> Vec<usize> {
    if filters.is_unconstrained(dataset) {
        return (0..dataset.len()).collect();
    }
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| filters.matches(rec))
        .map(|(i, _)| i)
        .collect()
}
