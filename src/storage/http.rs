//! Remote variant service over HTTP/HTTPS.
//!
//! Talks to any server that answers `GET {base}/variants?referenceName=&start=&end=`
//! with the GA4GH-style payload (see [`crate::formats::ga4gh`]) and
//! `GET {base}/callsets` with the sample list, which is what the `vcfrange`
//! binary serves. Timeouts surface as fetch failures.

use super::Storage;
use crate::formats::decode_payload_slice;
use crate::interval::ContigInterval;
use crate::types::CallSetsResponse;
use crate::variant::VariantContext;
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

pub struct HttpStorage {
    client: Client,
    base_url: Url,
}

impl HttpStorage {
    /// # Arguments
    ///
    /// * `base_url` - service root (e.g., "https://example.com/api/")
    /// * `timeout` - per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to create HTTP client: {}", e)))?;

        // Url::join drops the last path segment unless it ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Internal(format!("invalid base URL {}: {}", base_url, e)))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Internal(format!("invalid endpoint {}: {}", path, e)))
    }

    fn variants_url(&self, range: &ContigInterval) -> Result<Url> {
        let mut url = self.endpoint("variants")?;
        url.query_pairs_mut()
            .append_pair("referenceName", range.contig())
            .append_pair("start", &range.start().to_string())
            .append_pair("end", &range.stop().to_string());
        Ok(url)
    }

    async fn get_bytes(&self, url: Url) -> Result<Bytes> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("HTTP GET {} failed: {}", url, e)))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(Error::NotFound(url.to_string())),
            status => return Err(Error::Fetch(format!("HTTP GET {} returned {}", url, status))),
        }

        response
            .bytes()
            .await
            .map_err(|e| Error::Fetch(format!("failed to read HTTP response: {}", e)))
    }
}

#[async_trait]
impl Storage for HttpStorage {
    async fn fetch(&self, range: &ContigInterval) -> Result<Vec<VariantContext>> {
        let body = self.get_bytes(self.variants_url(range)?).await?;
        decode_payload_slice(&body)
    }

    async fn sample_names(&self) -> Result<Option<Vec<String>>> {
        match self.get_bytes(self.endpoint("callsets")?).await {
            Ok(body) => {
                let parsed: CallSetsResponse = serde_json::from_slice(&body)?;
                // a lazy upstream answers [] until it has loaded something
                Ok(Some(parsed.call_set_names).filter(|names| !names.is_empty()))
            }
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
