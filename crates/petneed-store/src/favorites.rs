//! Favorites keyed by user, then by pet identifier.
//!
//! Adding the same pet twice keeps one entry (the latest copy). Listing
//! returns pets ordered by identifier.
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

use petneed_core::traits::FavoritesStore;
use petneed_core::{Error, Pet, PetId, Result};

type UserFavorites = BTreeMap<PetId, Pet>;

fn require_id(pet: &Pet) -> Result<()> {
    if pet.id.is_empty() { return Err(Error::Favorites("pet has no identifier".to_string())); }
    Ok(())
}

#[derive(Default)]
pub struct MemoryFavorites {
    users: Mutex<HashMap<String, UserFavorites>>,
}

impl MemoryFavorites {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl FavoritesStore for MemoryFavorites {
    async fn add(&self, user_id: &str, pet: &Pet) -> Result<()> {
        require_id(pet)?;
        self.users
            .lock()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(pet.id.clone(), pet.clone());
        info!(user_id, pet_id = %pet.id, "favorited pet");
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Pet>> {
        let users = self.users.lock().await;
        Ok(users.get(user_id).map(|f| f.values().cloned().collect()).unwrap_or_default())
    }
}

/// All users' favorites in one JSON document, rewritten on every add.
pub struct JsonFileFavorites {
    path: PathBuf,
    // serializes read-modify-write cycles
    guard: Mutex<()>,
}

impl JsonFileFavorites {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), guard: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    async fn read_all(&self) -> Result<HashMap<String, UserFavorites>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| Error::Favorites(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Error::Favorites(format!("{}: {e}", self.path.display()))),
        }
    }

    async fn write_all(&self, all: &HashMap<String, UserFavorites>) -> Result<()> {
        let io_err = |e: std::io::Error| Error::Favorites(format!("{}: {e}", self.path.display()));
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let bytes = serde_json::to_vec_pretty(all).map_err(|e| Error::Favorites(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

#[async_trait]
impl FavoritesStore for JsonFileFavorites {
    async fn add(&self, user_id: &str, pet: &Pet) -> Result<()> {
        require_id(pet)?;
        let _guard = self.guard.lock().await;
        let mut all = self.read_all().await?;
        all.entry(user_id.to_string()).or_default().insert(pet.id.clone(), pet.clone());
        self.write_all(&all).await?;
        info!(user_id, pet_id = %pet.id, path = %self.path.display(), "favorited pet");
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Pet>> {
        let _guard = self.guard.lock().await;
        let mut all = self.read_all().await?;
        Ok(all.remove(user_id).map(|f| f.into_values().collect()).unwrap_or_default())
    }
}
