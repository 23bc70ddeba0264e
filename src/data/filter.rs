use super::model::EmissionRecord;

/// Basin selector value meaning "no basin filter".
pub const ALL_BASINS: &str = "All";

// ---------------------------------------------------------------------------
// Filter predicate: year range + basin
// ---------------------------------------------------------------------------

/// The current state of the dashboard's filter widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Inclusive lower bound on the reporting year.
    pub year_from: i32,
    /// Inclusive upper bound on the reporting year.
    pub year_to: i32,
    /// Basin to keep, or [`ALL_BASINS`].
    pub basin: String,
}

impl Selection {
    pub fn new(year_from: i32, year_to: i32, basin: impl Into<String>) -> Self {
        Self {
            year_from,
            year_to,
            basin: basin.into(),
        }
    }

    /// Whether a single record passes the filter.
    pub fn matches(&self, record: &EmissionRecord) -> bool {
        (self.year_from..=self.year_to).contains(&record.reporting_year)
            && (self.basin == ALL_BASINS || record.basin == self.basin)
    }
}

/// Records passing the filter, in their original order. An inverted year
/// range (`year_from > year_to`) selects nothing.
pub fn filter_emissions<'a>(records: &'a [EmissionRecord], selection: &Selection) -> Vec<&'a EmissionRecord> {
    records.iter().filter(|r| selection.matches(r)).collect()
}
