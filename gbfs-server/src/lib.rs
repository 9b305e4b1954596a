//! GBFS feed aggregation core.
//!
//! Ingests the public directory of bikeshare data providers, normalizes
//! each provider's loosely-versioned JSON feed set, and republishes a
//! durable key-value projection for the query-serving layer to read.

pub mod aggregator;
pub mod cache;
pub mod directory;
pub mod domain;
pub mod gbfs;
pub mod store;
pub mod sync;
