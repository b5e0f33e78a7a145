//! petneed-http
//!
//! reqwest-backed implementations of the collaborator traits: the upstream
//! record fetcher, the image proxy client and the Gemini criteria extractor.
pub mod fetcher;
pub mod gemini;
pub mod image;

pub use fetcher::HttpFetcher;
pub use gemini::GeminiExtractor;
pub use image::HttpImageProxy;

use petneed_core::{Error, Result};
use reqwest::Client;
use std::time::Duration;

pub(crate) fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout { builder = builder.timeout(timeout); }
    builder.build().map_err(|e| Error::InvalidConfig(format!("Failed to create HTTP client: {e}")))
}
