//! Core domain types shared across the crate.

mod feed;
mod provider;

pub use feed::{FeedDocumentLocation, FeedKind, UnknownFeedKind};
pub use provider::Provider;
