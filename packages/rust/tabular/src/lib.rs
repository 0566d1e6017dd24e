//! Tabular source fetching for kbpress.
//!
//! This crate provides:
//! - [`Table`] — a row-oriented, named-column view of a CSV export
//! - [`TableFetcher`] — bounded-timeout HTTP retrieval of CSV exports
//! - [`sheet_export_url`] — deterministic export URL for a named table

mod table;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use kbpress_shared::{PublishError, Result};

pub use table::Table;

/// Timeout for table export requests, in seconds.
const FETCH_TIMEOUT_SECS: u64 = 45;

/// User-Agent string for export requests.
const USER_AGENT: &str = concat!("kbpress/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Export URL construction
// ---------------------------------------------------------------------------

/// Hosted spreadsheet endpoint the export URLs are built against.
const SHEETS_EXPORT_BASE: &str = "https://docs.google.com/spreadsheets";

/// The default export base.
pub fn sheets_base() -> Url {
    Url::parse(SHEETS_EXPORT_BASE).expect("static base URL parses")
}

/// Export URL for a named table within a spreadsheet dataset.
///
/// Addresses the table by name rather than by positional gid, so the URL
/// stays valid when tables are reordered within the document.
pub fn sheet_export_url(dataset_id: &str, table_name: &str) -> Url {
    sheet_export_url_in(&sheets_base(), dataset_id, table_name)
}

/// Export URL for a named table, built against an explicit base endpoint.
pub fn sheet_export_url_in(base: &Url, dataset_id: &str, table_name: &str) -> Url {
    let mut url = base.clone();
    url.path_segments_mut()
        .expect("base URL has path segments")
        .extend(["d", dataset_id, "gviz", "tq"]);
    url.query_pairs_mut()
        .append_pair("tqx", "out:csv")
        .append_pair("sheet", table_name);
    url
}

// ---------------------------------------------------------------------------
// TableFetcher
// ---------------------------------------------------------------------------

/// Fetches CSV table exports over HTTP.
pub struct TableFetcher {
    client: Client,
}

impl TableFetcher {
    /// Create a fetcher with the standard timeout and user agent.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                PublishError::config(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }

    /// Fetch a CSV export and parse it into a [`Table`].
    ///
    /// Non-success HTTP status, transport failure, or an unparsable body
    /// all surface as fetch errors carrying the URL.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_table(&self, url: &Url) -> Result<Table> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| PublishError::fetch(url.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::fetch(url.as_str(), format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PublishError::fetch(url.as_str(), format!("body read failed: {e}")))?;

        let table = Table::from_csv(&body)
            .map_err(|e| PublishError::fetch(url.as_str(), format!("invalid CSV: {e}")))?;

        debug!(
            columns = table.headers().len(),
            rows = table.row_count(),
            "table fetched"
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_url_addresses_table_by_name() {
        let url = sheet_export_url("D1abc", "promos");
        assert_eq!(
            url.as_str(),
            "https://docs.google.com/spreadsheets/d/D1abc/gviz/tq?tqx=out%3Acsv&sheet=promos"
        );
    }

    #[test]
    fn export_url_encodes_table_name() {
        let url = sheet_export_url("D1", "promos locales");
        assert!(url.as_str().contains("sheet=promos+locales"));
    }

    #[test]
    fn export_url_respects_explicit_base() {
        let base = Url::parse("http://127.0.0.1:9999").unwrap();
        let url = sheet_export_url_in(&base, "D1", "faqs");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9999/d/D1/gviz/tq?tqx=out%3Acsv&sheet=faqs"
        );
    }

    #[tokio::test]
    async fn fetches_and_parses_csv() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/export.csv"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("intent,keywords,answer\nhours,\"open,hours\",9-5\n"),
            )
            .mount(&server)
            .await;

        let fetcher = TableFetcher::new().unwrap();
        let url = Url::parse(&format!("{}/export.csv", server.uri())).unwrap();
        let table = fetcher.fetch_table(&url).await.unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, 2), "9-5");
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = TableFetcher::new().unwrap();
        let url = Url::parse(&format!("{}/missing.csv", server.uri())).unwrap();
        let err = fetcher.fetch_table(&url).await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("missing.csv"));
        assert!(msg.contains("404"));
    }
}
