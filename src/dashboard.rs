use std::collections::BTreeSet;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::data::aggregate::{ChartSet, company_by_source, segment_by_year, state_heatmap};
use crate::data::filter::{ALL_BASINS, Selection, filter_emissions};
use crate::data::cache::load_update_table;
use crate::data::fetch::PageSource;
use crate::data::loader::{UNKNOWN_BASIN, emissions_from_table, facilities_from_table};
use crate::data::model::{EmissionRecord, FacilityIndex};

// ---------------------------------------------------------------------------
// Dashboard – immutable tables plus the orderings derived from them
// ---------------------------------------------------------------------------

/// An entry of the basin selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasinOption {
    pub label: String,
    pub value: String,
}

/// Everything the charts are computed from. Built once at start-up and only
/// read afterwards.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub emissions: Vec<EmissionRecord>,
    pub facilities: FacilityIndex,
    /// Sorted industry segments of the whole dataset.
    pub segments: Vec<String>,
    /// Sorted reporting categories of the whole dataset.
    pub categories: Vec<String>,
    pub basin_options: Vec<BasinOption>,
    /// Observed (min, max) reporting year; `None` when there are no records.
    pub year_bounds: Option<(i32, i32)>,
}

impl Dashboard {
    pub fn new(emissions: Vec<EmissionRecord>, facilities: FacilityIndex) -> Self {
        let segments: BTreeSet<&str> = emissions.iter().map(|r| r.industry_segment.as_str()).collect();
        let categories: BTreeSet<&str> = emissions
            .iter()
            .filter_map(|r| r.reporting_category.as_deref())
            .collect();
        let basins: BTreeSet<&str> = emissions
            .iter()
            .map(|r| r.basin.as_str())
            .filter(|b| *b != UNKNOWN_BASIN)
            .collect();

        let mut basin_options = vec![BasinOption {
            label: "All Basins".to_string(),
            value: ALL_BASINS.to_string(),
        }];
        basin_options.extend(basins.iter().map(|b| BasinOption {
            label: b.to_string(),
            value: b.to_string(),
        }));
        basin_options.push(BasinOption {
            label: UNKNOWN_BASIN.to_string(),
            value: UNKNOWN_BASIN.to_string(),
        });

        let year_bounds = emissions
            .iter()
            .map(|r| r.reporting_year)
            .fold(None, |acc: Option<(i32, i32)>, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            });

        let segments = segments.into_iter().map(str::to_string).collect();
        let categories = categories.into_iter().map(str::to_string).collect();

        Dashboard {
            emissions,
            facilities,
            segments,
            categories,
            basin_options,
            year_bounds,
        }
    }

    /// Selection covering every year and basin.
    pub fn default_selection(&self) -> Selection {
        let (lo, hi) = self.year_bounds.unwrap_or((0, 0));
        Selection::new(lo, hi, ALL_BASINS)
    }

    /// Recompute all three charts from scratch for one selection.
    pub fn update(&self, selection: &Selection) -> ChartSet {
        let filtered = filter_emissions(&self.emissions, selection);
        log::debug!(
            "Recomputing charts for {}..={} / {}: {} records",
            selection.year_from,
            selection.year_to,
            selection.basin,
            filtered.len()
        );
        ChartSet {
            segments: segment_by_year(&filtered, &self.segments),
            companies: company_by_source(&filtered, &self.facilities, &self.categories),
            heatmap: state_heatmap(&filtered, &self.facilities),
        }
    }

    pub fn len(&self) -> usize {
        self.emissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty()
    }
}

/// Load both tables (cache or remote), clean them and build the dashboard.
pub fn load_dashboard<S: PageSource + ?Sized>(source: &S, config: &Config) -> Result<Dashboard> {
    let options = config.fetch_options();

    let emissions_table = load_update_table(
        source,
        &config.emissions_table,
        &config.cache_folder,
        config.force_refresh,
        &options,
    )?;
    let facilities_table = load_update_table(
        source,
        &config.facilities_table,
        &config.cache_folder,
        config.force_refresh,
        &options,
    )?;

    let emissions = emissions_from_table(&emissions_table)
        .with_context(|| format!("loading {}", config.emissions_table))?;
    let facilities = facilities_from_table(&facilities_table)
        .with_context(|| format!("loading {}", config.facilities_table))?;

    log::info!(
        "Loaded {} emissions records ({} raw rows) and {} facilities",
        emissions.len(),
        emissions_table.len(),
        facilities.len()
    );
    Ok(Dashboard::new(emissions, facilities))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, segment: &str, category: Option<&str>, basin: &str) -> EmissionRecord {
        EmissionRecord {
            facility_id: Some(1),
            reporting_year: year,
            industry_segment: segment.into(),
            reporting_category: category.map(str::to_string),
            ch4_emissions: 1.0,
            basin: basin.into(),
        }
    }

    #[test]
    fn basin_options_wrap_observed_basins_with_all_and_unknown() {
        let dash = Dashboard::new(
            vec![
                rec(2020, "Production", None, "Permian"),
                rec(2020, "Production", None, "Unknown"),
                rec(2020, "Production", None, "Anadarko"),
            ],
            FacilityIndex::new(),
        );
        let values: Vec<&str> = dash.basin_options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["All", "Anadarko", "Permian", "Unknown"]);
        assert_eq!(dash.basin_options[0].label, "All Basins");
    }

    #[test]
    fn unknown_option_is_offered_even_when_unobserved() {
        let dash = Dashboard::new(vec![rec(2020, "Production", None, "Permian")], FacilityIndex::new());
        assert_eq!(dash.basin_options.last().map(|o| o.value.as_str()), Some("Unknown"));
    }

    #[test]
    fn global_orderings_and_year_bounds() {
        let dash = Dashboard::new(
            vec![
                rec(2021, "Processing", Some("Venting"), "Permian"),
                rec(2011, "Production", Some("Fugitive"), "Permian"),
                rec(2016, "Gathering", None, "Permian"),
            ],
            FacilityIndex::new(),
        );
        assert_eq!(dash.segments, vec!["Gathering", "Processing", "Production"]);
        assert_eq!(dash.categories, vec!["Fugitive", "Venting"]);
        assert_eq!(dash.year_bounds, Some((2011, 2021)));
        assert_eq!(dash.default_selection(), Selection::new(2011, 2021, ALL_BASINS));
    }

    #[test]
    fn series_identity_is_stable_across_filters() {
        let dash = Dashboard::new(
            vec![
                rec(2019, "Processing", Some("Venting"), "Anadarko"),
                rec(2020, "Production", Some("Fugitive"), "Permian"),
            ],
            FacilityIndex::new(),
        );
        let narrowed = dash.update(&Selection::new(2020, 2020, "Permian"));
        let names: Vec<&str> = narrowed.segments.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Processing", "Production"]);
        assert_eq!(narrowed.segments.value(2020, "Processing"), Some(0.0));
    }

    #[test]
    fn empty_dashboard_yields_empty_charts() {
        let dash = Dashboard::new(Vec::new(), FacilityIndex::new());
        assert_eq!(dash.year_bounds, None);
        assert_eq!(dash.update(&dash.default_selection()), ChartSet::default());
    }
}
