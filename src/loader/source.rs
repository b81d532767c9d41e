//! Where weight tables come from
//!
//! The cache only needs raw CSV text for a [`TableSpec`]; a [`TableSource`]
//! provides it over HTTP, from a local directory, or from memory.

use crate::loader::table::TableSpec;
use crate::{Result, WeightsError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[async_trait]
pub trait TableSource: Send + Sync {
    /// Fetch the raw text of a table resource
    async fn fetch_table(&self, spec: &TableSpec) -> Result<String>;

    fn name(&self) -> &'static str;
}

/// Fetches tables with HTTP GET relative to a base URL
pub struct HttpTableSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTableSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        HttpTableSource {
            base_url: base_url.into(),
            client,
        }
    }

    /// Full URL of a resource: `base_url` joined with the resource path
    pub fn url_for(&self, resource: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            resource.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl TableSource for HttpTableSource {
    async fn fetch_table(&self, spec: &TableSpec) -> Result<String> {
        let url = self.url_for(&spec.resource);
        tracing::debug!(table = %spec.id, %url, "fetching weight table");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Reads tables from files under a root directory
pub struct DirTableSource {
    root: PathBuf,
}

impl DirTableSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirTableSource { root: root.into() }
    }
}

#[async_trait]
impl TableSource for DirTableSource {
    async fn fetch_table(&self, spec: &TableSpec) -> Result<String> {
        let path = self.root.join(&spec.resource);
        tracing::debug!(table = %spec.id, path = %path.display(), "reading weight table");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(WeightsError::IoError)
    }

    fn name(&self) -> &'static str {
        "dir"
    }
}

/// In-memory tables keyed by resource path
///
/// Counts fetches and can simulate latency, which makes it handy for
/// exercising the cache.
#[derive(Default)]
pub struct StaticTableSource {
    tables: HashMap<String, String>,
    latency: Option<Duration>,
    fetches: AtomicUsize,
}

impl StaticTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, resource: impl Into<String>, content: impl Into<String>) -> Self {
        self.tables.insert(resource.into(), content.into());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `fetch_table` calls so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableSource for StaticTableSource {
    async fn fetch_table(&self, spec: &TableSpec) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.tables.get(&spec.resource).cloned().ok_or_else(|| {
            WeightsError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no static table for resource '{}'", spec.resource),
            ))
        })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_once() {
        let source = HttpTableSource::new("https://example.org/app/");
        assert_eq!(
            source.url_for("/csv/WeightsMainDeck.csv"),
            "https://example.org/app/csv/WeightsMainDeck.csv"
        );
        let source = HttpTableSource::new("https://example.org");
        assert_eq!(source.url_for("csv/a.csv"), "https://example.org/csv/a.csv");
    }

    #[tokio::test]
    async fn test_static_source_counts_fetches() {
        let source = StaticTableSource::new().with_table("a.csv", "name,weight\n");
        let spec = TableSpec::new("a", "a.csv", Vec::new());
        assert_eq!(source.fetch_table(&spec).await.unwrap(), "name,weight\n");
        let missing = TableSpec::new("b", "b.csv", Vec::new());
        assert!(source.fetch_table(&missing).await.is_err());
        assert_eq!(source.fetch_count(), 2);
    }
}
