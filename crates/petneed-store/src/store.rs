//! In-memory pet collection with round-robin access.
//!
//! The collection is an immutable snapshot behind an `Arc`; a reload builds
//! a new snapshot off-lock and swaps it together with the cursor, so readers
//! see either the old or the new collection, never a mix. The cursor resets
//! to 0 on every successful reload. Loads are serialized, so overlapping
//! reloads land in call order and a lazy load fetches at most once.
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use petneed_core::matcher;
use petneed_core::traits::Fetcher;
use petneed_core::{Error, Normalizer, Pet, Result, SearchCriteria, Species};

#[derive(Default)]
struct Rotation {
    pets: Arc<Vec<Pet>>,
    cursor: usize,
}

impl Rotation {
    // Index under the cursor, then advance; wraps once the cursor runs off the end.
    fn advance(&mut self) -> Option<usize> {
        if self.pets.is_empty() { return None; }
        if self.cursor >= self.pets.len() { self.cursor = 0; }
        let index = self.cursor;
        self.cursor += 1;
        Some(index)
    }
}

pub struct PetStore {
    fetcher: Arc<dyn Fetcher>,
    source_url: String,
    normalizer: Normalizer,
    rotation: Mutex<Rotation>,
    // held across fetch, normalize and swap
    loading: Mutex<()>,
}

impl PetStore {
    /// Empty store; the first `next` loads lazily.
    pub fn new(fetcher: Arc<dyn Fetcher>, source_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            source_url: source_url.into(),
            normalizer: Normalizer::new(),
            rotation: Mutex::new(Rotation::default()),
            loading: Mutex::new(()),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Loads eagerly and surfaces the first fetch or parse failure.
    pub async fn open(self) -> Result<Self> {
        self.load().await?;
        Ok(self)
    }

    pub fn source_url(&self) -> &str { &self.source_url }

    /// Fetch, normalize and swap in the new collection. On failure the
    /// previous collection and cursor are left as they were.
    pub async fn load(&self) -> Result<usize> {
        let _loading = self.loading.lock().await;
        self.load_locked().await
    }

    async fn load_locked(&self) -> Result<usize> {
        let payload = self.fetcher.fetch(&self.source_url).await?;
        let pets = self.normalizer.normalize(&payload)?;
        let count = pets.len();
        let mut rotation = self.rotation.lock().await;
        rotation.pets = Arc::new(pets);
        rotation.cursor = 0;
        info!(count, url = %self.source_url, "loaded pets");
        Ok(count)
    }

    pub async fn count(&self) -> usize { self.rotation.lock().await.pets.len() }

    pub async fn cursor(&self) -> usize { self.rotation.lock().await.cursor }

    /// The current collection; unaffected by later reloads.
    pub async fn snapshot(&self) -> Arc<Vec<Pet>> { Arc::clone(&self.rotation.lock().await.pets) }

    pub async fn next(&self) -> Result<Option<Pet>> {
        self.ensure_loaded().await?;
        let mut rotation = self.rotation.lock().await;
        Ok(rotation.advance().map(|i| rotation.pets[i].clone()))
    }

    /// Rotates until a pet of `kind` comes up. Gives up after one full pass.
    pub async fn next_of_species(&self, kind: Species) -> Result<Option<Pet>> {
        self.ensure_loaded().await?;
        let mut rotation = self.rotation.lock().await;
        for _ in 0..rotation.pets.len() {
            let Some(i) = rotation.advance() else { break };
            if rotation.pets[i].species() == kind {
                return Ok(Some(rotation.pets[i].clone()));
            }
        }
        debug!(%kind, "no pet of requested species");
        Ok(None)
    }

    pub async fn by_id(&self, id: &str) -> Option<Pet> {
        if id.is_empty() { return None; }
        self.snapshot().await.iter().find(|p| p.id == id).cloned()
    }

    /// Like `by_id`, but absence is an `Error::NotFound`.
    pub async fn get(&self, id: &str) -> Result<Pet> {
        self.by_id(id).await.ok_or_else(|| Error::NotFound(format!("pet {id:?}")))
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Vec<Pet> {
        let pets = self.snapshot().await;
        matcher::filter(&pets, criteria).cloned().collect()
    }

    async fn ensure_loaded(&self) -> Result<()> {
        if self.count().await > 0 {
            return Ok(());
        }
        let _loading = self.loading.lock().await;
        // another caller may have loaded while we waited
        if self.count().await == 0 {
            debug!("store empty, loading lazily");
            self.load_locked().await?;
        }
        Ok(())
    }
}
