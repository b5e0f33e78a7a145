use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use petneed_core::traits::Fetcher;
use petneed_core::{Error, Result};

use crate::build_client;

/// One GET per call, no retries. A timeout applies only when configured.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        Ok(Self { client: build_client(timeout)? })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "fetching upstream records");
        let response = self.client.get(url).send().await.map_err(|e| Error::fetch(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("HTTP {status}")));
        }
        let body = response.bytes().await.map_err(|e| Error::fetch(url, e))?;
        debug!(url, bytes = body.len(), "upstream fetch complete");
        Ok(body.to_vec())
    }
}
