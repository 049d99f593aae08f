//! JSON-over-HTTP ingestion client.

use super::MetricsSink;
use crate::core::{MempushError, PublishBatch, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};

/// User agent to use for all ingestion requests
const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Region of the reporting instance, sent with every batch.
pub const REGION_HEADER: &str = "x-mempush-region";

/// Posts batches as JSON to an ingestion endpoint.
///
/// The client is built once, after the instance region is known, and reused
/// for every tick; pass it to the sampling loop wrapped in a
/// [`BoundedPublisher`](super::BoundedPublisher).
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: Url,
}

impl HttpSink {
    /// Build a sink for `endpoint` on behalf of an instance in `region`,
    /// authenticating with `api_key` as a bearer token when one is given.
    pub fn new(endpoint: Url, api_key: Option<&str>, region: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let region = HeaderValue::from_str(region)
            .map_err(|e| MempushError::identity(format!("Invalid region '{region}': {e}")))?;
        headers.insert(HeaderName::from_static(REGION_HEADER), region);
        if let Some(key) = api_key {
            let mut authorization = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| MempushError::config(format!("Invalid API key: {e}")))?;
            authorization.set_sensitive(true);
            headers.insert(AUTHORIZATION, authorization);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(APP_USER_AGENT)
            .build()?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait::async_trait]
impl MetricsSink for HttpSink {
    async fn put_metric_data(&self, batch: &PublishBatch) -> Result<()> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(batch)
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MempushError::Auth(format!(
                "ingestion endpoint rejected credentials ({})",
                resp.status()
            ))),
            status if status.is_server_error() => Err(MempushError::Server(resp.text().await?)),
            status => Err(MempushError::Http {
                status,
                body: resp.text().await?,
            }),
        }
    }
}
