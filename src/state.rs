use crate::dashboard::Dashboard;
use crate::data::aggregate::ChartSet;
use crate::data::filter::Selection;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded tables and derived orderings (read-only).
    pub dashboard: Dashboard,

    /// Current year range + basin.
    pub selection: Selection,

    /// Charts for `selection` (cached until the selection changes).
    pub charts: ChartSet,

    /// Number of records passing the current filter.
    pub visible_records: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        let selection = dashboard.default_selection();
        let status_message = dashboard
            .is_empty()
            .then(|| "No emissions records loaded; check the log for fetch errors.".to_string());
        let mut state = Self {
            dashboard,
            selection,
            charts: ChartSet::default(),
            visible_records: 0,
            status_message,
        };
        state.refresh();
        state
    }

    /// Recompute all charts for the current selection.
    pub fn refresh(&mut self) {
        self.charts = self.dashboard.update(&self.selection);
        self.visible_records = self
            .dashboard
            .emissions
            .iter()
            .filter(|r| self.selection.matches(r))
            .count();
    }

    /// Replace the selection; recomputes only when it actually changed.
    pub fn set_selection(&mut self, selection: Selection) {
        if selection != self.selection {
            self.selection = selection;
            self.refresh();
        }
    }

    /// Back to every year and every basin.
    pub fn reset_filters(&mut self) {
        self.set_selection(self.dashboard.default_selection());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::ALL_BASINS;
    use crate::data::model::{EmissionRecord, FacilityIndex};

    fn dashboard() -> Dashboard {
        let rec = |year: i32, basin: &str| EmissionRecord {
            facility_id: Some(1),
            reporting_year: year,
            industry_segment: "Production".into(),
            reporting_category: Some("Fugitive".into()),
            ch4_emissions: 2.0,
            basin: basin.into(),
        };
        Dashboard::new(
            vec![rec(2018, "Permian"), rec(2019, "Anadarko"), rec(2020, "Permian")],
            FacilityIndex::new(),
        )
    }

    #[test]
    fn starts_unfiltered() {
        let state = AppState::new(dashboard());
        assert_eq!(state.selection, Selection::new(2018, 2020, ALL_BASINS));
        assert_eq!(state.visible_records, 3);
        assert_eq!(state.charts.segments.years, vec![2018, 2019, 2020]);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn selection_change_recomputes_everything() {
        let mut state = AppState::new(dashboard());
        state.set_selection(Selection::new(2019, 2020, "Permian"));
        assert_eq!(state.visible_records, 1);
        assert_eq!(state.charts.segments.years, vec![2020]);
        assert_eq!(state.charts.heatmap.z, vec![vec![2.0f64.ln_1p()]]);

        state.reset_filters();
        assert_eq!(state.visible_records, 3);
    }

    #[test]
    fn empty_dashboard_reports_status() {
        let state = AppState::new(Dashboard::new(Vec::new(), FacilityIndex::new()));
        assert!(state.status_message.is_some());
        assert_eq!(state.visible_records, 0);
    }
}
