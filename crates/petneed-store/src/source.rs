use async_trait::async_trait;

use petneed_core::config::expand_path;
use petneed_core::traits::Fetcher;
use petneed_core::{Error, Result};

/// Serves a local JSON snapshot. Accepts `file://` URLs or plain paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn handles(url: &str) -> bool {
        !(url.starts_with("http://") || url.starts_with("https://"))
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = expand_path(url.strip_prefix("file://").unwrap_or(url));
        tokio::fs::read(&path).await.map_err(|e| Error::fetch(url, e))
    }
}
