use std::collections::{BTreeMap, BTreeSet};

use super::model::{EmissionRecord, FacilityIndex, FacilityRecord};

/// Companies kept in the company-by-source chart.
pub const TOP_COMPANIES: usize = 20;
/// Reporting categories kept in the state heat map.
pub const TOP_CATEGORIES: usize = 15;

// ---------------------------------------------------------------------------
// Chart inputs
// ---------------------------------------------------------------------------

/// One stacked bar series, aligned with the chart's x labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Emissions per year, one series per industry segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentChart {
    pub years: Vec<i32>,
    pub series: Vec<Series>,
}

impl SegmentChart {
    /// Value of `segment` in `year`, if both are present.
    pub fn value(&self, year: i32, segment: &str) -> Option<f64> {
        let row = self.years.iter().position(|&y| y == year)?;
        let series = self.series.iter().find(|s| s.name == segment)?;
        series.values.get(row).copied()
    }
}

/// Emissions per parent company, one series per reporting category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyChart {
    /// Ordered by descending total.
    pub companies: Vec<String>,
    pub series: Vec<Series>,
}

/// State × category matrix of `ln(1 + sum)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heatmap {
    pub states: Vec<String>,
    pub categories: Vec<String>,
    /// `z[state][category]`
    pub z: Vec<Vec<f64>>,
}

impl Heatmap {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() || self.categories.is_empty()
    }

    pub fn max(&self) -> f64 {
        self.z.iter().flatten().copied().fold(0.0, f64::max)
    }
}

/// The three chart inputs, always recomputed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSet {
    pub segments: SegmentChart,
    pub companies: CompanyChart,
    pub heatmap: Heatmap,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The `n` largest totals, in descending order. Equal totals keep the key
/// order of the map, so ties resolve to the lexically smaller key.
fn top_n(totals: &BTreeMap<String, f64>, n: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = totals.iter().map(|(k, v)| (k.clone(), *v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Left-join attribute lookup; a miss yields the empty key.
fn joined<'a>(
    facilities: &'a FacilityIndex,
    record: &EmissionRecord,
    attr: impl Fn(&'a FacilityRecord) -> Option<&'a String>,
) -> String {
    record
        .facility_id
        .and_then(|id| facilities.get(&id))
        .and_then(attr)
        .cloned()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// Sum emissions per (year, segment). Columns follow `segments`, the sorted
/// segment list of the whole dataset, so series identity does not change
/// with the filter.
pub fn segment_by_year(records: &[&EmissionRecord], segments: &[String]) -> SegmentChart {
    let mut sums: BTreeMap<i32, BTreeMap<&str, f64>> = BTreeMap::new();
    for r in records {
        *sums
            .entry(r.reporting_year)
            .or_default()
            .entry(r.industry_segment.as_str())
            .or_default() += r.ch4_emissions;
    }

    let years: Vec<i32> = sums.keys().copied().collect();
    let series = segments
        .iter()
        .map(|segment| Series {
            name: segment.clone(),
            values: sums
                .values()
                .map(|by_segment| by_segment.get(segment.as_str()).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();

    SegmentChart { years, series }
}

/// Top companies by total emissions, stacked by reporting category.
///
/// Selection counts every record of a company; the stacks only count records
/// with a reporting category. Records whose facility has no parent company
/// are not charted. Columns are the entries of `categories` (the
/// dataset's sorted category list) that occur among the kept companies.
pub fn company_by_source(
    records: &[&EmissionRecord],
    facilities: &FacilityIndex,
    categories: &[String],
) -> CompanyChart {
    // records without a parent company (join miss or blank) are left out
    let matched: Vec<(&EmissionRecord, &str)> = records
        .iter()
        .filter_map(|r| {
            r.facility_id
                .and_then(|id| facilities.get(&id))
                .and_then(|f| f.parent_company.as_deref())
                .map(|company| (*r, company))
        })
        .collect();

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for (r, company) in &matched {
        *totals.entry(company.to_string()).or_default() += r.ch4_emissions;
    }
    let kept: BTreeSet<String> = top_n(&totals, TOP_COMPANIES)
        .into_iter()
        .map(|(company, _)| company)
        .collect();

    let mut sums: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for (r, company) in &matched {
        let Some(category) = r.reporting_category.as_deref() else {
            continue;
        };
        if kept.contains(*company) {
            *sums
                .entry(*company)
                .or_default()
                .entry(category)
                .or_default() += r.ch4_emissions;
        }
    }

    let mut rows: Vec<(&str, f64)> = sums
        .iter()
        .map(|(company, by_cat)| (*company, by_cat.values().sum()))
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));

    let present: BTreeSet<&str> = sums.values().flat_map(|by_cat| by_cat.keys().copied()).collect();
    let series = categories
        .iter()
        .filter(|c| present.contains(c.as_str()))
        .map(|category| Series {
            name: category.clone(),
            values: rows
                .iter()
                .map(|(company, _)| sums[company].get(category.as_str()).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();

    CompanyChart {
        companies: rows.into_iter().map(|(c, _)| c.to_string()).collect(),
        series,
    }
}

/// State × category heat map of the top categories, `ln(1 + sum)`.
///
/// Records whose facility has no state (including join misses) are counted
/// under the empty state key.
pub fn state_heatmap(records: &[&EmissionRecord], facilities: &FacilityIndex) -> Heatmap {
    let mut sums: BTreeMap<(String, String), f64> = BTreeMap::new();
    for r in records {
        let Some(category) = &r.reporting_category else {
            continue;
        };
        let state = joined(facilities, r, |f| f.state.as_ref());
        *sums.entry((state, category.clone())).or_default() += r.ch4_emissions;
    }

    let mut category_totals: BTreeMap<String, f64> = BTreeMap::new();
    for ((_, category), v) in &sums {
        *category_totals.entry(category.clone()).or_default() += v;
    }
    let categories: Vec<String> = top_n(&category_totals, TOP_CATEGORIES)
        .into_iter()
        .map(|(c, _)| c)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let states: Vec<String> = sums
        .keys()
        .filter(|(_, c)| categories.contains(c))
        .map(|(s, _)| s.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let z = states
        .iter()
        .map(|state| {
            categories
                .iter()
                .map(|category| {
                    let key = (state.clone(), category.clone());
                    sums.get(&key).copied().unwrap_or(0.0).ln_1p()
                })
                .collect()
        })
        .collect();

    Heatmap { states, categories, z }
}
