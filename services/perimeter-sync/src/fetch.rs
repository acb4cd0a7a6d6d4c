//! Feature service client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use perimeter_common::{FeatureSet, ServiceResponse};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::SourceConfig;

/// Why a fetch produced no feature set.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Service returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Service error {code}: {message}")]
    Service { code: i64, message: String },
}

/// Anything that can produce the current feature set.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn fetch(&self) -> Result<FeatureSet, FetchError>;
}

/// Query parameters for one fetch.
#[derive(Debug, Clone)]
pub struct FeatureQuery {
    pub filter: String,
    pub modified_within_days: Option<u32>,
    pub date_field: String,
    pub return_centroid: bool,
    pub out_sr: Option<u32>,
}

impl FeatureQuery {
    pub fn from_config(source: &SourceConfig, return_centroid: bool) -> Self {
        Self {
            filter: source.filter.clone(),
            modified_within_days: source.modified_within_days,
            date_field: source.date_field.clone(),
            return_centroid,
            out_sr: source.out_sr,
        }
    }

    /// SQL `where` clause, combining the fixed filter with the date floor.
    pub fn where_clause(&self, today: NaiveDate) -> String {
        let date_filter = self.modified_within_days.map(|days| {
            format!(
                "{} >= date'{}'",
                self.date_field,
                date_floor(today, days).format("%Y-%m-%d")
            )
        });

        let fixed = self.filter.trim();
        match (fixed.is_empty(), date_filter) {
            (true, None) => "1=1".to_string(),
            (true, Some(date)) => date,
            (false, None) => fixed.to_string(),
            (false, Some(date)) => format!("({}) AND {}", fixed, date),
        }
    }

    pub fn params(&self, today: NaiveDate) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("where", self.where_clause(today)),
            ("outFields", "*".to_string()),
            ("returnGeometry", "true".to_string()),
        ];
        if self.return_centroid {
            params.push(("returnCentroid", "true".to_string()));
        }
        if let Some(sr) = self.out_sr {
            params.push(("outSR", sr.to_string()));
        }
        params.push(("f", "json".to_string()));
        params
    }
}

/// First day included by a "modified within `days`" filter.
pub fn date_floor(today: NaiveDate, days: u32) -> NaiveDate {
    today - chrono::Duration::days(i64::from(days))
}

/// Fetches features over HTTP.
pub struct HttpFeatureSource {
    client: Client,
    url: String,
    query: FeatureQuery,
}

impl HttpFeatureSource {
    pub fn new(url: &str, query: FeatureQuery, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            query,
        })
    }
}

/// Decode a response body, surfacing service-level errors.
pub fn decode_body(body: &str) -> Result<FeatureSet, FetchError> {
    let response = ServiceResponse::from_json(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    response
        .into_result()
        .map_err(|e| FetchError::Service {
            code: e.code,
            message: e.message,
        })
}

#[async_trait]
impl FeatureSource for HttpFeatureSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<FeatureSet, FetchError> {
        let params = self.query.params(Local::now().date_naive());
        debug!(?params, "Querying feature service");

        let response = self.client.get(&self.url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let features = decode_body(&body)?;

        if features.exceeded_transfer_limit {
            warn!(
                count = features.len(),
                "Service truncated the result at its record limit"
            );
        }
        Ok(features)
    }
}
