//! Provider (GBFS "system") records.

use serde::{Deserialize, Serialize};

/// An organization publishing a GBFS feed set for one service area.
///
/// Providers come from the public directory CSV or from an explicit
/// registration call. The only mutation after creation is flipping
/// `enabled` off; providers are never physically deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Globally unique provider identifier (the directory's "System ID").
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// ISO country code, as published in the directory.
    pub country_code: String,

    /// Human-readable location (e.g. "Barcelona, ES").
    pub location: String,

    /// Provider website URL.
    pub url: String,

    /// URL of the provider's root discovery document.
    pub discovery_url: String,

    /// Soft-delete flag. Directory ingestion sets this to `true`.
    pub enabled: bool,
}
