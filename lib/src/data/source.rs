//! Where raw records come from.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use super::RawRecord;
use crate::config::DEFAULT_DATASET_URL;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("dataset request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("dataset is not a JSON array of records: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A provider of the raw record array.
///
/// Implementations may suspend while fetching. Errors are returned as-is;
/// there is no retry.
pub trait DatasetSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<RawRecord>, FetchError>> + Send;
}

/// Downloads the record array with an HTTP GET.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET_URL)
    }
}

impl DatasetSource for HttpSource {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        let records = decode_records(&body)?;
        tracing::info!(records = records.len(), "fetched dataset");
        Ok(records)
    }
}

/// Parses a JSON array into records. Entries that are not objects become
/// empty records.
pub fn decode_records(body: &[u8]) -> Result<Vec<RawRecord>, FetchError> {
    let values: Vec<Value> = serde_json::from_slice(body)?;
    Ok(values.into_iter().map(RawRecord::from).collect())
}

/// Serves a fixed record list.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    records: Vec<RawRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl DatasetSource for InMemorySource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_records() {
        let body = br#"[{"Horsepower": 130, "Miles_per_Gallon": 18}, "junk"]"#;
        let records = decode_records(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].horsepower(), Some(130.0));
        assert!(records[1].fields().is_empty());
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let err = decode_records(br#"{"Horsepower": 130}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_in_memory_source_returns_records() {
        let source = InMemorySource::new(vec![RawRecord::new(Some(1.0), Some(2.0))]);
        let records = source.fetch().await.unwrap();
        assert_eq!(records, vec![RawRecord::new(Some(1.0), Some(2.0))]);
    }

    #[test]
    fn test_http_source_default_url() {
        assert_eq!(HttpSource::default().url(), DEFAULT_DATASET_URL);
    }
}
