//! Application context shared by every inbound event.
//!
//! Holds the store and the optional collaborators (image proxy, criteria
//! extractor). Built once at startup and shared with the webhook handler.
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use petneed_core::traits::{CriteriaExtractor, FavoritesStore, ImageProxy};
use petneed_core::{Pet, Result, Species};
use petneed_store::PetStore;

use crate::command::{parse_postback, Command};
use crate::reply::{self, Reply, CAROUSEL_LIMIT, PLACEHOLDER_IMAGE};

/// Where an event came from. Group and room are set for multi-party chats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    pub user_id: String,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

impl Source {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Message { source: Source, text: String },
    Postback { source: Source, data: String },
    Unsend { source: Source },
}

/// What the messaging layer should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Reply(Reply),
    Push { target: String, reply: Reply },
}

pub struct AppContext {
    store: Arc<PetStore>,
    favorites: Arc<dyn FavoritesStore>,
    images: Option<Arc<dyn ImageProxy>>,
    extractor: Option<Arc<dyn CriteriaExtractor>>,
}

impl AppContext {
    pub fn new(store: Arc<PetStore>, favorites: Arc<dyn FavoritesStore>) -> Self {
        Self { store, favorites, images: None, extractor: None }
    }

    pub fn with_image_proxy(mut self, images: Arc<dyn ImageProxy>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn CriteriaExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn store(&self) -> &PetStore { &self.store }

    pub async fn dispatch(&self, event: &Event) -> Option<Delivery> {
        match event {
            Event::Message { source, text } => {
                Some(Delivery::Reply(self.handle_text(&source.user_id, text).await))
            }
            Event::Postback { source, data } => {
                let command = parse_postback(data)?;
                Some(Delivery::Reply(self.run(&source.user_id, command).await))
            }
            Event::Unsend { source } => {
                info!(user_id = %source.user_id, "message unsent");
                // 1:1 chats cannot be pushed to from an unsend event
                let target = source.group_id.clone().or_else(|| source.room_id.clone())?;
                Some(Delivery::Push { target, reply: Reply::text(reply::UNSEND_NUDGE) })
            }
        }
    }

    /// Criteria search first, then text commands, then a rotating pick.
    pub async fn handle_text(&self, user_id: &str, text: &str) -> Reply {
        let text = text.trim().to_lowercase();
        info!(user_id, text = %text, "received message");
        if let Some(extractor) = &self.extractor {
            match extractor.extract(&text).await {
                Ok(Some(criteria)) => {
                    info!(?criteria, "searching by extracted criteria");
                    let pets = self.store.search(&criteria).await;
                    return self.carousel(reply::SEARCH_TITLE, pets).await;
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "criteria extraction failed"),
            }
        }
        self.run(user_id, Command::parse(&text)).await
    }

    pub async fn run(&self, user_id: &str, command: Command) -> Reply {
        match command {
            Command::AddFavorite(pet_id) => self.add_favorite(user_id, &pet_id).await,
            Command::NextDog => self.single(self.store.next_of_species(Species::Dog).await).await,
            Command::NextCat => self.single(self.store.next_of_species(Species::Cat).await).await,
            Command::ShowFavorites => match self.favorites.list(user_id).await {
                Ok(pets) => self.carousel(reply::FAVORITES_TITLE, pets).await,
                Err(e) => {
                    warn!(user_id, error = %e, "failed to read favorites");
                    Reply::text(reply::FAVORITES_FAILED)
                }
            },
            Command::NextPet => self.single(self.store.next().await).await,
        }
    }

    async fn add_favorite(&self, user_id: &str, pet_id: &str) -> Reply {
        let pet = match self.store.get(pet_id).await {
            Ok(pet) => pet,
            Err(e) => {
                warn!(user_id, error = %e, "cannot favorite");
                return Reply::text(reply::NO_PET);
            }
        };
        match self.favorites.add(user_id, &pet).await {
            Ok(()) => Reply::text(reply::FAVORITE_ADDED),
            Err(e) => {
                warn!(user_id, pet_id, error = %e, "failed to add favorite");
                Reply::text(reply::FAVORITE_FAILED)
            }
        }
    }

    async fn single(&self, found: Result<Option<Pet>>) -> Reply {
        match found {
            Ok(Some(pet)) => Reply::Pet(Box::new(self.present(pet).await)),
            Ok(None) => Reply::text(reply::NO_PET),
            Err(e) => { warn!(error = %e, "pet store unavailable"); Reply::text(reply::NO_PET) }
        }
    }

    async fn carousel(&self, title: &str, mut pets: Vec<Pet>) -> Reply {
        if pets.is_empty() { return Reply::text(reply::NO_MATCH); }
        pets.truncate(CAROUSEL_LIMIT);
        let pets = join_all(pets.into_iter().map(|p| self.present(p))).await;
        Reply::Carousel { title: title.to_string(), pets }
    }

    // Rehosts the image when a proxy is configured; falls back to the placeholder.
    async fn present(&self, mut pet: Pet) -> Pet {
        if let (Some(images), false) = (&self.images, pet.image_name.is_empty()) {
            pet.image_name = images.secure_url(&pet.image_name).await;
        }
        if pet.image_name.is_empty() { pet.image_name = PLACEHOLDER_IMAGE.to_string(); }
        pet
    }
}
