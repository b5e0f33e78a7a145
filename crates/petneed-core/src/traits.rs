use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Pet, SearchCriteria};

/// Single GET of an upstream resource.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Per-user favorites, keyed by pet identifier.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn add(&self, user_id: &str, pet: &Pet) -> Result<()>;
    async fn list(&self, user_id: &str) -> Result<Vec<Pet>>;
}

/// Rehosts an image reference. Returns an empty string on any failure.
#[async_trait]
pub trait ImageProxy: Send + Sync {
    async fn secure_url(&self, original: &str) -> String;
}

/// Free text → structured criteria. `Ok(None)` means the text is not a search.
#[async_trait]
pub trait CriteriaExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Option<SearchCriteria>>;
}
