//! petneed-core
//!
//! Pet record model, upstream normalization, criteria matching and the
//! collaborator traits the store and chat layer are written against.
pub mod config;
pub mod error;
pub mod matcher;
pub mod normalizer;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use normalizer::{normalize, Normalizer, SchemaHint, UpstreamSchema};
pub use types::{Pet, PetId, SearchCriteria, Species};
