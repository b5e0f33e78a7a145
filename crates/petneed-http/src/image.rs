//! Client for the image rehosting service.
//!
//! The service is asked `GET {server}url?{escaped original}` and answers with
//! a cache key; the secure address is then `{server}imgs?{key}.jpg`.
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

use petneed_core::traits::ImageProxy;
use petneed_core::Result;

use crate::build_client;

pub struct HttpImageProxy {
    client: Client,
    server: String,
}

impl HttpImageProxy {
    pub fn new(server: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self { client: build_client(timeout)?, server: server.into() })
    }

    async fn cache_key(&self, original: &str) -> reqwest::Result<String> {
        let escaped: String = url::form_urlencoded::byte_serialize(original.as_bytes()).collect();
        let request_url = format!("{}url?{}", self.server, escaped);
        let body = self.client.get(&request_url).send().await?.error_for_status()?.text().await?;
        Ok(body.trim().to_string())
    }
}

#[async_trait]
impl ImageProxy for HttpImageProxy {
    async fn secure_url(&self, original: &str) -> String {
        if self.server.is_empty() || original.is_empty() { return String::new(); }
        match self.cache_key(original).await {
            Ok(key) if !key.is_empty() => format!("{}imgs?{}.jpg", self.server, key),
            Ok(_) => { warn!(original, "image proxy returned an empty key"); String::new() }
            Err(e) => { warn!(original, error = %e, "image proxy request failed"); String::new() }
        }
    }
}
