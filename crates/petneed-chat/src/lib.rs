//! petneed-chat
//!
//! Platform-neutral bot logic: inbound events are routed to store queries
//! and favorites, and answered with [`Reply`] values the messaging SDK
//! renders.
pub mod command;
pub mod context;
pub mod reply;

pub use command::Command;
pub use context::{AppContext, Delivery, Event, Source};
pub use reply::Reply;
