use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{Value as JsonValue, json};

use methane_dash::config::{Config, EMISSIONS_TABLE, FACILITIES_TABLE};
use methane_dash::dashboard::load_dashboard;
use methane_dash::data::cache::{cache_path, read_cache};
use methane_dash::data::fetch::{FetchError, PageSource};
use methane_dash::data::filter::{ALL_BASINS, Selection};
use methane_dash::data::model::JsonRow;

/// Serves each table from memory, `page_size` rows at a time, and counts
/// the requests it receives.
struct InMemorySource {
    tables: HashMap<String, Vec<JsonRow>>,
    calls: RefCell<usize>,
}

impl InMemorySource {
    fn new(emissions: JsonValue, facilities: JsonValue) -> Self {
        let mut tables = HashMap::new();
        tables.insert(EMISSIONS_TABLE.to_string(), serde_json::from_value(emissions).unwrap());
        tables.insert(FACILITIES_TABLE.to_string(), serde_json::from_value(facilities).unwrap());
        Self {
            tables,
            calls: RefCell::new(0),
        }
    }
}

impl PageSource for InMemorySource {
    fn fetch_page(&self, table: &str, start: usize, end: usize) -> Result<Vec<JsonRow>, FetchError> {
        *self.calls.borrow_mut() += 1;
        let rows = self.tables.get(table).cloned().unwrap_or_default();
        Ok(rows
            .into_iter()
            .skip(start - 1)
            .take(end + 1 - start)
            .collect())
    }
}

fn test_config(folder: &std::path::Path) -> Config {
    Config {
        cache_folder: folder.to_path_buf(),
        page_size: 2,
        pause_ms: 0,
        ..Config::default()
    }
}

fn two_permian_rows() -> InMemorySource {
    InMemorySource::new(
        json!([
            {"facility_id": 1, "reporting_year": 2020, "industry_segment": "Production",
             "reporting_category": "Fugitive", "total_reported_ch4_emissions": 10.0,
             "basin_associated_with_facility": "Permian"},
            {"facility_id": 2, "reporting_year": 2020, "industry_segment": "Production",
             "reporting_category": "Venting", "total_reported_ch4_emissions": 5.0,
             "basin_associated_with_facility": "Permian"}
        ]),
        json!([
            {"facility_id": 1, "parent_company": "Acme Energy", "state": "TX"}
        ]),
    )
}

#[test]
fn two_row_example_stacks_to_fifteen() {
    let dir = tempfile::tempdir().unwrap();
    let source = two_permian_rows();
    let dashboard = load_dashboard(&source, &test_config(dir.path())).unwrap();

    let charts = dashboard.update(&Selection::new(2020, 2020, ALL_BASINS));
    assert_eq!(charts.segments.years, vec![2020]);
    assert_eq!(charts.segments.series.len(), 1);
    assert_eq!(charts.segments.value(2020, "Production"), Some(15.0));

    // facility 2 has no facility row: left out of the company chart,
    // counted under the empty state in the heat map
    assert_eq!(charts.companies.companies, vec!["Acme Energy".to_string()]);
    assert_eq!(charts.companies.series.len(), 1);
    assert_eq!(charts.companies.series[0].values, vec![10.0]);
    assert_eq!(charts.heatmap.states, vec![String::new(), "TX".to_string()]);
    assert_eq!(charts.heatmap.categories, vec!["Fugitive".to_string(), "Venting".to_string()]);
}

#[test]
fn second_start_reads_the_cache_instead_of_the_api() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let source = two_permian_rows();
    let first = load_dashboard(&source, &config).unwrap();
    let calls_after_first = *source.calls.borrow();
    assert!(calls_after_first > 0);
    assert!(cache_path(dir.path(), EMISSIONS_TABLE).exists());
    assert!(cache_path(dir.path(), FACILITIES_TABLE).exists());

    let second = load_dashboard(&source, &config).unwrap();
    assert_eq!(*source.calls.borrow(), calls_after_first);
    assert_eq!(second.emissions, first.emissions);
    assert_eq!(second.basin_options, first.basin_options);

    let refreshed = load_dashboard(&source, &Config { force_refresh: true, ..config }).unwrap();
    assert!(*source.calls.borrow() > calls_after_first);
    assert_eq!(refreshed.emissions, first.emissions);
}

#[test]
fn messy_rows_are_cleaned_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let source = InMemorySource::new(
        json!([
            {"facility_id": 1, "reporting_year": 2018, "industry_segment": "Production",
             "reporting_category": "Fugitive", "total_reported_ch4_emissions": 1.5,
             "basin_associated_with_facility": "  permian basin "},
            {"facility_id": 1, "reporting_year": null, "industry_segment": "Production",
             "reporting_category": "Fugitive", "total_reported_ch4_emissions": 100.0,
             "basin_associated_with_facility": "Permian Basin"},
            {"facility_id": 3, "reporting_year": 2019, "industry_segment": "Processing",
             "reporting_category": null, "total_reported_ch4_emissions": 2.5,
             "basin_associated_with_facility": null},
            {"facility_id": 4, "reporting_year": 2019, "industry_segment": "Processing",
             "reporting_category": "Venting", "total_reported_ch4_emissions": null,
             "basin_associated_with_facility": "San Juan"}
        ]),
        json!([]),
    );

    let dashboard = load_dashboard(&source, &test_config(dir.path())).unwrap();
    assert_eq!(dashboard.len(), 2);
    assert_eq!(dashboard.year_bounds, Some((2018, 2019)));

    let basins: Vec<&str> = dashboard.basin_options.iter().map(|o| o.value.as_str()).collect();
    assert_eq!(basins, vec!["All", "Permian Basin", "Unknown"]);

    let unknown = dashboard.update(&Selection::new(2018, 2019, "Unknown"));
    assert_eq!(unknown.segments.years, vec![2019]);
    assert_eq!(unknown.segments.value(2019, "Processing"), Some(2.5));
    assert_eq!(unknown.segments.value(2019, "Production"), Some(0.0));
    // no reporting category: counted per year, absent from the category charts
    assert!(unknown.companies.series.is_empty());
    assert!(unknown.heatmap.is_empty());
}

#[test]
fn cached_table_matches_what_was_fetched() {
    let dir = tempfile::tempdir().unwrap();
    let source = two_permian_rows();
    load_dashboard(&source, &test_config(dir.path())).unwrap();

    let cached = read_cache(&cache_path(dir.path(), EMISSIONS_TABLE)).unwrap();
    let expected: Vec<JsonRow> = source.tables[EMISSIONS_TABLE].clone();
    assert_eq!(cached, methane_dash::data::model::Table::from_json_rows(&expected));
}

#[test]
fn empty_remote_tables_give_an_empty_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let source = InMemorySource::new(json!([]), json!([]));

    let dashboard = load_dashboard(&source, &test_config(dir.path())).unwrap();
    assert!(dashboard.is_empty());
    assert_eq!(dashboard.year_bounds, None);

    let charts = dashboard.update(&dashboard.default_selection());
    assert!(charts.segments.years.is_empty());
    assert!(charts.companies.companies.is_empty());
    assert!(charts.heatmap.is_empty());
}
