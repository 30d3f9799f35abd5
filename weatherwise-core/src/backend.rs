use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::{
    Config,
    export::{CsvDownload, JsonEnvelope},
    model::{Fetched, ForecastQuery, ForecastResult, HealthStatus, HistoricalAnalysis, HistoricalQuery},
};

pub mod http;

pub use http::HttpBackend;

/// The analysis service the dashboard talks to.
#[async_trait]
pub trait DashboardBackend: Send + Sync + Debug {
    async fn historical_analysis(
        &self,
        query: &HistoricalQuery,
    ) -> anyhow::Result<Fetched<HistoricalAnalysis>>;

    async fn forecast(&self, query: &ForecastQuery) -> anyhow::Result<Fetched<ForecastResult>>;

    /// Posts a stored analysis for CSV export.
    async fn download_csv(&self, data: &Value) -> anyhow::Result<CsvDownload>;

    /// Posts a stored analysis for JSON export.
    async fn download_json(&self, data: &Value) -> anyhow::Result<JsonEnvelope>;

    async fn health(&self) -> anyhow::Result<HealthStatus>;
}

/// Construct the HTTP backend described by the configuration.
pub fn backend_from_config(config: &Config) -> anyhow::Result<HttpBackend> {
    HttpBackend::new(&config.base_url, config.request_timeout())
}
