//! REST data source for manual-mode grids.
//!
//! [`RestSource`] turns a grid's state (page, sort, search, filters) into
//! query parameters, fetches a page of rows, and maps HTTP failures to
//! typed [`FetchError`]s. Transient failures (rate limiting, server errors)
//! are retried a few times with a growing delay before surfacing.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::components::FilterValue;
use crate::fetch::{FetchError, FetchResult};
use crate::table::{PageInfo, Sort, SortDirection};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 500;

/// One page of rows as returned by a list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RowsPage<T> {
    /// The rows on this page.
    pub rows: Vec<T>,
    /// Total rows across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl<T> RowsPage<T> {
    /// Build the pagination descriptor for the query this page answered.
    pub fn page_info(&self, query: &ListQuery) -> PageInfo {
        PageInfo::new(query.page, query.page_size, self.total_items, self.total_pages)
    }
}

/// The server-side view of a grid's state.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Requested page, 1-based.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Active sort, if any.
    pub sort: Option<Sort>,
    /// Committed search text, if any.
    pub search: Option<String>,
    /// Filter values keyed by filter name; `All` entries are not sent.
    pub filters: BTreeMap<String, FilterValue>,
}

impl ListQuery {
    /// Create a query for a page.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Self::default()
        }
    }

    /// Attach a sort.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Attach a search term.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Attach a filter value.
    pub fn with_filter(mut self, name: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(name.into(), value);
        self
    }

    /// Flatten into query parameters.
    ///
    /// `All` filters are omitted entirely; a selection is sent as a
    /// comma-joined list. An empty search term is not sent.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if let Some(sort) = &self.sort {
            let order = match sort.direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            };
            params.push(("sort".to_string(), sort.column_id.clone()));
            params.push(("order".to_string(), order.to_string()));
        }
        if let Some(search) = &self.search {
            if !search.is_empty() {
                params.push(("search".to_string(), search.clone()));
            }
        }
        for (name, value) in &self.filters {
            if let Some(joined) = value.as_param() {
                params.push((name.clone(), joined));
            }
        }
        params
    }
}

/// A REST backend serving pages of rows and search suggestions.
#[derive(Debug, Clone)]
pub struct RestSource {
    client: Client,
    base_url: String,
}

impl RestSource {
    /// Create a source for a base URL.
    pub fn new(base_url: &str) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    /// Fetch one page of rows from a list endpoint.
    #[instrument(skip(self, query), fields(path = %path, page = query.page))]
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
    ) -> FetchResult<RowsPage<T>> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let page: RowsPage<T> = self.get(&url, &query.to_params()).await?;
        debug!(
            rows = page.rows.len(),
            total = page.total_items,
            "fetched page"
        );
        Ok(page)
    }

    /// Fetch autocomplete suggestions for a query prefix.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn fetch_suggestions(&self, path: &str, query: &str) -> FetchResult<Vec<String>> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let params = vec![("q".to_string(), query.to_string())];
        self.get(&url, &params).await
    }

    /// GET with retry for transient failures.
    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> FetchResult<T> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.execute_get::<T>(url, params).await {
                Ok(value) => return Ok(value),
                Err(e) if Self::is_retryable(&e) && attempts < MAX_RETRIES => {
                    let delay = RETRY_DELAY_MS * u64::from(attempts);
                    warn!(attempt = attempts, delay_ms = delay, error = %e, "retrying request");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute a single GET request.
    async fn execute_get<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> FetchResult<T> {
        let response = self
            .client
            .get(url)
            .query(params)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Check status and parse the JSON body.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> FetchResult<T> {
        let status = response.status();
        let url = response.url().to_string();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| FetchError::InvalidResponse(format!("failed to parse body: {}", e)));
        }
        Err(FetchError::from_status(status, &url))
    }

    /// Whether a failure is worth retrying.
    fn is_retryable(error: &FetchError) -> bool {
        matches!(error, FetchError::RateLimited | FetchError::Server(_))
    }
}

/// Strip trailing slashes so joins produce a single separator.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_params_minimal() {
        let query = ListQuery::new(2, 10);
        assert_eq!(
            query.to_params(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("page_size".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_to_params_with_sort_and_search() {
        let query = ListQuery::new(1, 20)
            .with_sort(Sort {
                column_id: "price".to_string(),
                direction: SortDirection::Descending,
            })
            .with_search("sneaker");

        let params = query.to_params();
        assert!(params.contains(&("sort".to_string(), "price".to_string())));
        assert!(params.contains(&("order".to_string(), "desc".to_string())));
        assert!(params.contains(&("search".to_string(), "sneaker".to_string())));
    }

    #[test]
    fn test_to_params_omits_empty_search() {
        let query = ListQuery::new(1, 10).with_search("");
        assert!(query.to_params().iter().all(|(k, _)| k != "search"));
    }

    #[test]
    fn test_to_params_omits_all_filters_sends_selections_joined() {
        let query = ListQuery::new(1, 10)
            .with_filter("category", FilterValue::All)
            .with_filter("status", FilterValue::from_values(["draft", "active"]));

        let params = query.to_params();
        assert!(params.iter().all(|(k, _)| k != "category"));
        assert!(params.contains(&("status".to_string(), "active,draft".to_string())));
    }

    #[test]
    fn test_rows_page_to_page_info() {
        let page: RowsPage<String> = RowsPage {
            rows: vec!["a".to_string()],
            total_items: 25,
            total_pages: 3,
        };
        let info = page.page_info(&ListQuery::new(3, 10));
        assert_eq!(info.page, 3);
        assert_eq!(info.page_size, 10);
        assert_eq!(info.total_items, 25);
        assert_eq!(info.total_pages, 3);
    }

    #[test]
    fn test_rows_page_deserializes_from_wire_shape() {
        let body = r#"{
            "rows": [
                {"name": "Sneaker", "price": 4999},
                {"name": "Boot", "price": 8999}
            ],
            "total_items": 25,
            "total_pages": 3
        }"#;

        #[derive(Debug, Deserialize)]
        struct Product {
            name: String,
            price: u64,
        }

        let page: RowsPage<Product> = serde_json::from_str(body).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].name, "Sneaker");
        assert_eq!(page.rows[1].price, 8999);
        assert_eq!(page.total_items, 25);
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://api.shop.dev/"), "https://api.shop.dev");
        assert_eq!(normalize_base_url("https://api.shop.dev///"), "https://api.shop.dev");
        assert_eq!(
            normalize_base_url("https://api.shop.dev/v1"),
            "https://api.shop.dev/v1"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(RestSource::is_retryable(&FetchError::RateLimited));
        assert!(RestSource::is_retryable(&FetchError::Server("boom".to_string())));
        assert!(!RestSource::is_retryable(&FetchError::NotFound("x".to_string())));
        assert!(!RestSource::is_retryable(&FetchError::Cancelled));
    }
}
