//! GBFS protocol: tolerant decoding and the document client.

pub mod client;
pub mod decode;
pub mod error;
pub mod scalar;
pub mod types;

pub use client::{FeedClient, FeedClientConfig, FeedSource};
pub use decode::{Document, decode_discovery, decode_feed};
pub use error::{DecodeError, FetchError};
pub use types::{DEFAULT_LANGUAGE, NormalizedFeedSet};
