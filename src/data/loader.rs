use std::collections::hash_map::Entry;

use anyhow::{Result, bail};

use super::model::{EmissionRecord, FacilityIndex, FacilityRecord, Table, Value};

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

pub const FACILITY_ID: &str = "facility_id";
pub const REPORTING_YEAR: &str = "reporting_year";
pub const INDUSTRY_SEGMENT: &str = "industry_segment";
pub const REPORTING_CATEGORY: &str = "reporting_category";
pub const CH4_EMISSIONS: &str = "total_reported_ch4_emissions";
pub const BASIN: &str = "basin_associated_with_facility";
pub const PARENT_COMPANY: &str = "parent_company";
pub const STATE: &str = "state";

/// Basin used when a record reports none.
pub const UNKNOWN_BASIN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Emissions
// ---------------------------------------------------------------------------

/// Clean the raw emissions table into typed records.
///
/// Rows without a numeric year, a segment, or a numeric emissions quantity
/// are dropped. A table with no rows (e.g. a fetch that failed on its first
/// page) yields no records; a non-empty table missing a required column is
/// an error.
pub fn emissions_from_table(table: &Table) -> Result<Vec<EmissionRecord>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let cols = [
        FACILITY_ID,
        REPORTING_YEAR,
        INDUSTRY_SEGMENT,
        REPORTING_CATEGORY,
        CH4_EMISSIONS,
        BASIN,
    ]
    .map(|name| table.column_index(name));
    let [facility, year, segment, category, ch4, basin] = match cols {
        [Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)] => [a, b, c, d, e, f],
        _ => bail!(
            "emissions table is missing required columns (has {:?})",
            table.columns
        ),
    };

    let records: Vec<EmissionRecord> = table
        .rows
        .iter()
        .filter_map(|row| {
            let reporting_year = row[year].as_i64().and_then(|y| i32::try_from(y).ok())?;
            let industry_segment = row[segment].as_text()?;
            let ch4_emissions = row[ch4].as_f64()?;
            Some(EmissionRecord {
                facility_id: row[facility].as_i64(),
                reporting_year,
                industry_segment,
                reporting_category: row[category].as_text(),
                ch4_emissions,
                basin: normalize_basin(&row[basin]),
            })
        })
        .collect();

    let dropped = table.len() - records.len();
    if dropped > 0 {
        log::debug!("Dropped {dropped} emissions rows with missing year, segment or quantity");
    }
    Ok(records)
}

/// Trim, map missing/blank to `"Unknown"`, then title-case.
pub fn normalize_basin(value: &Value) -> String {
    let raw = value.as_text();
    let trimmed = raw.as_deref().map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        UNKNOWN_BASIN.to_string()
    } else {
        title_case(trimmed)
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Facilities
// ---------------------------------------------------------------------------

/// Index the facilities table by id. When an id repeats (the table has one
/// row per reporting year), the first row wins.
pub fn facilities_from_table(table: &Table) -> Result<FacilityIndex> {
    let mut index = FacilityIndex::new();
    if table.is_empty() {
        return Ok(index);
    }

    let Some(id_col) = table.column_index(FACILITY_ID) else {
        bail!("facilities table has no '{FACILITY_ID}' column (has {:?})", table.columns);
    };
    let company_col = table.column_index(PARENT_COMPANY);
    let state_col = table.column_index(STATE);

    for row in &table.rows {
        let Some(facility_id) = row[id_col].as_i64() else {
            continue;
        };
        if let Entry::Vacant(slot) = index.entry(facility_id) {
            slot.insert(FacilityRecord {
                facility_id,
                parent_company: company_col.and_then(|c| row[c].as_text()),
                state: state_col.and_then(|c| row[c].as_text()),
            });
        }
    }

    Ok(index)
}
