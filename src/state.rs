use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::aggregate::DashboardSummary;
use crate::data::filter::{FilterState, filtered_indices};
use crate::data::model::RentalDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    TimePatterns,
    SeasonWeather,
    Correlations,
    Statistics,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::TimePatterns, Tab::SeasonWeather, Tab::Correlations, Tab::Statistics];

    pub fn title(self) -> &'static str {
        match self {
            Tab::TimePatterns => "Time patterns",
            Tab::SeasonWeather => "Season & Weather",
            Tab::Correlations => "Correlations",
            Tab::Statistics => "Statistics",
        }
    }
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset, shared read-only for the life of the file.
    pub dataset: Option<Arc<RentalDataset>>,

    /// Where `dataset` came from.
    pub source: Option<PathBuf>,

    /// Sidebar selections.
    pub filters: FilterState,

    /// Indices of records passing `filters` (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates for `visible_indices` (cached).
    pub summary: Option<DashboardSummary>,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset and reset filters.
    pub fn set_dataset(&mut self, dataset: RentalDataset, source: &Path) {
        self.dataset = Some(Arc::new(dataset));
        self.source = Some(source.to_path_buf());
        self.filters = FilterState::default();
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and `summary` from `filters`.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.filters);
        self.summary = Some(DashboardSummary::compute(
            ds,
            &self.visible_indices,
            self.filters.target,
        ));
        log::debug!(
            "Recomputed summary: {} of {} rows visible ({:?})",
            self.visible_indices.len(),
            ds.len(),
            self.filters
        );
    }

    /// Recompute only if the filters differ from `before`. Returns whether
    /// anything was recomputed.
    pub fn refilter_if_changed(&mut self, before: &FilterState) -> bool {
        if &self.filters == before {
            return false;
        }
        self.refilter();
        true
    }

    pub fn source_name(&self) -> Option<String> {
        self.source.as_ref().map(|p| p.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::data::filter::TargetMetric;
    use crate::data::model::{RentalRecord, Season, Weather};

    fn dataset() -> RentalDataset {
        let ts = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        RentalDataset::from_records(vec![
            RentalRecord::new(ts("2011-01-03 08:00:00"), Season::Spring, Weather::Clear, true).with_counts(5, 95, 100),
            RentalRecord::new(ts("2012-01-03 08:00:00"), Season::Spring, Weather::Clear, true).with_counts(10, 190, 200),
        ])
    }

    #[test]
    fn test_set_dataset_computes_summary() {
        let mut state = AppState::default();
        state.filters.year = Some(2012);
        state.set_dataset(dataset(), Path::new("train.csv"));

        assert_eq!(state.filters, FilterState::default());
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.summary.as_ref().map(|s| s.total), Some(300));
        assert_eq!(state.source_name().as_deref(), Some("train.csv"));
    }

    #[test]
    fn test_refilter_only_on_change() {
        let mut state = AppState::default();
        state.set_dataset(dataset(), Path::new("train.csv"));

        let before = state.filters.clone();
        assert!(!state.refilter_if_changed(&before));

        state.filters.year = Some(2012);
        state.filters.target = TargetMetric::Registered;
        assert!(state.refilter_if_changed(&before));
        assert_eq!(state.visible_indices, vec![1]);
        assert_eq!(state.summary.as_ref().map(|s| s.total), Some(190));
    }
}
