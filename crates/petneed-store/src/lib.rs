//! petneed-store
//!
//! The in-memory pet store with its rotation cursor, plus the local
//! collaborators that need no network: a file-backed fetcher and the
//! favorites stores.
pub mod favorites;
pub mod source;
pub mod store;

pub use favorites::{JsonFileFavorites, MemoryFavorites};
pub use source::FileFetcher;
pub use store::PetStore;
