use std::thread;
use std::time::Duration;

use thiserror::Error;

use super::model::{JsonRow, Table};

/// Default EPA Envirofacts REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://data.epa.gov/efservice";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single page request failed. Any of these ends the fetch loop.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Page sources
// ---------------------------------------------------------------------------

/// Something that can hand out rows `start..=end` (1-based) of a table.
pub trait PageSource {
    fn fetch_page(&self, table: &str, start: usize, end: usize) -> Result<Vec<JsonRow>, FetchError>;
}

/// Envirofacts client: `GET {base}/{table}/{start}:{end}/JSON`.
pub struct HttpPageSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpPageSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn page_url(&self, table: &str, start: usize, end: usize) -> String {
        format!("{}/{}/{}:{}/JSON", self.base_url, table, start, end)
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&self, table: &str, start: usize, end: usize) -> Result<Vec<JsonRow>, FetchError> {
        let url = self.page_url(table, start, end);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

// ---------------------------------------------------------------------------
// Paged fetch loop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Rows requested per page.
    pub page_size: usize,
    /// Sleep between successful pages.
    pub pause: Duration,
    /// Stop after this many non-empty pages. `Some(0)` means no limit.
    pub max_pages: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 1000,
            pause: Duration::from_millis(500),
            max_pages: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    EndOfData,
    PageLimit,
    /// A request failed; the message is the logged error.
    Failed(String),
}

/// Everything accumulated by one run of the fetch loop.
#[derive(Debug)]
pub struct FetchReport {
    pub rows: Vec<JsonRow>,
    pub pages: usize,
    pub stop: StopReason,
}

/// Page through `table` sequentially until an empty page, the page limit,
/// or the first failed request. Never fails: errors are logged and end the
/// loop with whatever has been accumulated.
pub fn fetch_pages<S: PageSource + ?Sized>(source: &S, table: &str, options: &FetchOptions) -> FetchReport {
    let page_size = options.page_size.max(1);
    let max_pages = options.max_pages.filter(|&max| max > 0);
    let mut rows = Vec::new();
    let mut start = 1;
    let mut pages = 0;

    let stop = loop {
        let end = start + page_size - 1;
        log::info!("Downloading: {table} [{start}:{end}]");

        let page = match source.fetch_page(table, start, end) {
            Ok(page) => page,
            Err(e) => {
                log::error!("Request error for {table} [{start}:{end}]: {e}");
                break StopReason::Failed(e.to_string());
            }
        };

        if page.is_empty() {
            log::info!("End of data for {table} after {pages} pages");
            break StopReason::EndOfData;
        }

        rows.extend(page);
        start += page_size;
        pages += 1;

        if max_pages.is_some_and(|max| pages >= max) {
            log::warn!("Page limit reached ({pages}) for {table}");
            break StopReason::PageLimit;
        }

        if !options.pause.is_zero() {
            thread::sleep(options.pause);
        }
    };

    FetchReport { rows, pages, stop }
}

/// Fetch a whole table. The caller always gets a table, possibly partial or
/// empty when the remote source failed.
pub fn fetch_table<S: PageSource + ?Sized>(source: &S, table: &str, options: &FetchOptions) -> Table {
    let report = fetch_pages(source, table, options);
    if let StopReason::Failed(reason) = &report.stop {
        log::warn!(
            "Fetch of {table} aborted ({reason}); keeping {} rows from {} pages",
            report.rows.len(),
            report.pages
        );
    }
    Table::from_json_rows(&report.rows)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde_json::json;

    use super::*;

    /// Scripted page source: hands out queued responses in order and
    /// records the requested ranges.
    pub(crate) struct ScriptedSource {
        responses: RefCell<VecDeque<Result<Vec<JsonRow>, FetchError>>>,
        pub requests: RefCell<Vec<(String, usize, usize)>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(responses: Vec<Result<Vec<JsonRow>, FetchError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for ScriptedSource {
        fn fetch_page(&self, table: &str, start: usize, end: usize) -> Result<Vec<JsonRow>, FetchError> {
            self.requests.borrow_mut().push((table.to_string(), start, end));
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    pub(crate) fn page(ids: &[i64]) -> Vec<JsonRow> {
        ids.iter()
            .map(|id| serde_json::from_value(json!({"facility_id": id})).unwrap())
            .collect()
    }

    fn no_pause(max_pages: Option<usize>) -> FetchOptions {
        FetchOptions {
            page_size: 2,
            pause: Duration::ZERO,
            max_pages,
        }
    }

    fn malformed() -> FetchError {
        FetchError::Decode(serde_json::from_str::<Vec<JsonRow>>("{").unwrap_err())
    }

    #[test]
    fn stops_at_first_empty_page() {
        for max_pages in [None, Some(3), Some(10)] {
            let source = ScriptedSource::new(vec![
                Ok(page(&[1, 2])),
                Ok(page(&[3, 4])),
                Ok(Vec::new()),
                Ok(page(&[5])),
            ]);
            let report = fetch_pages(&source, "t", &no_pause(max_pages));
            assert_eq!(report.pages, 2);
            assert_eq!(report.rows.len(), 4);
            assert_eq!(report.stop, StopReason::EndOfData);
            assert_eq!(source.requests.borrow().len(), 3);
        }
    }

    #[test]
    fn requests_consecutive_one_based_ranges() {
        let source = ScriptedSource::new(vec![Ok(page(&[1, 2])), Ok(page(&[3, 4]))]);
        fetch_pages(&source, "ghg.t", &no_pause(None));
        let requests = source.requests.borrow();
        assert_eq!(
            *requests,
            vec![
                ("ghg.t".to_string(), 1, 2),
                ("ghg.t".to_string(), 3, 4),
                ("ghg.t".to_string(), 5, 6),
            ]
        );
    }

    #[test]
    fn page_limit_acts_as_circuit_breaker() {
        let source = ScriptedSource::new(vec![Ok(page(&[1, 2])), Ok(page(&[3, 4])), Ok(page(&[5, 6]))]);
        let report = fetch_pages(&source, "t", &no_pause(Some(2)));
        assert_eq!(report.pages, 2);
        assert_eq!(report.stop, StopReason::PageLimit);
        assert_eq!(source.requests.borrow().len(), 2);
    }

    #[test]
    fn zero_page_limit_means_unlimited() {
        let source = ScriptedSource::new(vec![
            Ok(page(&[1, 2])),
            Ok(page(&[3, 4])),
            Ok(page(&[5, 6])),
            Ok(Vec::new()),
        ]);
        let report = fetch_pages(&source, "t", &no_pause(Some(0)));
        assert_eq!(report.pages, 3);
        assert_eq!(report.rows.len(), 6);
        assert_eq!(report.stop, StopReason::EndOfData);
    }

    #[test]
    fn failure_keeps_accumulated_rows_without_retry() {
        let source = ScriptedSource::new(vec![Ok(page(&[1, 2])), Err(malformed()), Ok(page(&[3, 4]))]);
        let report = fetch_pages(&source, "t", &no_pause(None));
        assert_eq!(report.pages, 1);
        assert_eq!(report.rows.len(), 2);
        assert!(matches!(report.stop, StopReason::Failed(_)));
        assert_eq!(source.requests.borrow().len(), 2);
    }

    #[test]
    fn fetch_table_returns_empty_table_when_first_page_fails() {
        let source = ScriptedSource::new(vec![Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY))]);
        let table = fetch_table(&source, "t", &no_pause(None));
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn page_url_follows_envirofacts_template() {
        let source = HttpPageSource::new("https://data.epa.gov/efservice/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            source.page_url("ghg.EF_W_EMISSIONS_SOURCE_GHG", 1001, 2000),
            "https://data.epa.gov/efservice/ghg.EF_W_EMISSIONS_SOURCE_GHG/1001:2000/JSON"
        );
    }
}
