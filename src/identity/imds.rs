//! EC2 instance metadata (IMDSv2) identity resolver.

use super::IdentityResolver;
use crate::core::{InstanceIdentity, MempushError, Result};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

const TOKEN_PATH: &str = "latest/api/token";
const DOCUMENT_PATH: &str = "latest/dynamic/instance-identity/document";
const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";
const TOKEN_TTL_SECONDS: u32 = 21_600;

/// Subset of the instance identity document we care about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityDocument {
    region: String,
    instance_id: String,
    instance_type: String,
}

/// Resolves identity through the instance metadata service.
#[derive(Debug, Clone)]
pub struct ImdsResolver {
    client: Client,
    base: Url,
}

impl ImdsResolver {
    /// Each request is bounded by `timeout`.
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MempushError::identity(format!("metadata client build: {e}")))?;
        Ok(Self { client, base })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| MempushError::identity(format!("bad metadata url: {e}")))
    }

    async fn session_token(&self) -> Result<String> {
        let resp = self
            .client
            .put(self.url(TOKEN_PATH)?)
            .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECONDS)
            .send()
            .await?;
        let resp = check_status(resp, "token").await?;
        Ok(resp.text().await?)
    }
}

#[async_trait::async_trait]
impl IdentityResolver for ImdsResolver {
    async fn resolve(&self) -> Result<InstanceIdentity> {
        let token = self.session_token().await?;
        tracing::debug!("obtained metadata session token");

        let resp = self
            .client
            .get(self.url(DOCUMENT_PATH)?)
            .header(TOKEN_HEADER, token)
            .send()
            .await?;
        let doc: IdentityDocument = check_status(resp, "identity document")
            .await?
            .json()
            .await
            .map_err(|e| MempushError::identity(format!("malformed identity document: {e}")))?;

        Ok(InstanceIdentity {
            region: doc.region,
            instance_id: doc.instance_id,
            instance_type: doc.instance_type,
        })
    }
}

async fn check_status(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    match resp.status() {
        status if status.is_success() => Ok(resp),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MempushError::Auth(format!(
            "metadata service rejected {what} request ({})",
            resp.status()
        ))),
        status => Err(MempushError::identity(format!(
            "{what} request failed (status {status}): {}",
            resp.text().await.unwrap_or_default()
        ))),
    }
}
