use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::fetch::{FetchOptions, PageSource, fetch_table};
use super::model::{Table, Value};

/// Cache file for a table: `{folder}/{table}.csv`.
pub fn cache_path(folder: &Path, table: &str) -> PathBuf {
    folder.join(format!("{table}.csv"))
}

/// Return the table from its cache file, or fetch it and refresh the cache.
///
/// An existing cache is trusted as-is (no staleness or schema check) unless
/// `force_refresh` is set. A fetch that aborts part-way still writes what it
/// got, so the partial table is what later runs will read.
pub fn load_update_table<S: PageSource + ?Sized>(
    source: &S,
    table: &str,
    folder: &Path,
    force_refresh: bool,
    options: &FetchOptions,
) -> Result<Table> {
    fs::create_dir_all(folder)
        .with_context(|| format!("creating cache folder {}", folder.display()))?;
    let path = cache_path(folder, table);

    if path.exists() && !force_refresh {
        log::info!("Reading from cache: {}", path.display());
        return read_cache(&path);
    }

    log::info!("Downloading data from API for: {table}");
    let data = fetch_table(source, table, options);

    log::info!("Saving local cache to: {} ({} rows)", path.display(), data.len());
    write_cache(&path, &data)?;
    Ok(data)
}

/// Write a table as CSV with a header row. A table without columns produces
/// an empty file.
pub fn write_cache(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating cache file {}", path.display()))?;

    if !table.columns.is_empty() {
        writer
            .write_record(&table.columns)
            .context("writing CSV header")?;
        for (row_no, row) in table.rows.iter().enumerate() {
            writer
                .write_record(row.iter().map(Value::to_csv_field))
                .with_context(|| format!("writing CSV row {row_no}"))?;
        }
    }

    writer.flush().context("flushing cache file")?;
    Ok(())
}

/// Read a cache file written by [`write_cache`].
pub fn read_cache(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening cache file {}", path.display()))?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(Value::from_csv_field).collect());
    }

    Ok(Table { columns, rows })
}
