//! Feed kinds and feed document locations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown feed name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feed kind: {name:?}")]
pub struct UnknownFeedKind {
    pub name: String,
}

/// One of the fixed categories of published GBFS documents.
///
/// Wire names are the `snake_case` feed names from discovery documents
/// (e.g. `station_status`), which are also the middle segment of the
/// persisted `feed:<provider>:<kind>:<language>` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    GbfsVersions,
    SystemInformation,
    StationInformation,
    StationStatus,
    FreeBikeStatus,
    SystemHours,
    SystemCalendar,
    SystemRegions,
    SystemPricingPlans,
    SystemAlerts,
    VehicleTypes,
}

impl FeedKind {
    /// All feed kinds, in no particular order.
    pub const ALL: [FeedKind; 11] = [
        FeedKind::GbfsVersions,
        FeedKind::SystemInformation,
        FeedKind::StationInformation,
        FeedKind::StationStatus,
        FeedKind::FreeBikeStatus,
        FeedKind::SystemHours,
        FeedKind::SystemCalendar,
        FeedKind::SystemRegions,
        FeedKind::SystemPricingPlans,
        FeedKind::SystemAlerts,
        FeedKind::VehicleTypes,
    ];

    /// Returns the wire name of this feed kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::GbfsVersions => "gbfs_versions",
            FeedKind::SystemInformation => "system_information",
            FeedKind::StationInformation => "station_information",
            FeedKind::StationStatus => "station_status",
            FeedKind::FreeBikeStatus => "free_bike_status",
            FeedKind::SystemHours => "system_hours",
            FeedKind::SystemCalendar => "system_calendar",
            FeedKind::SystemRegions => "system_regions",
            FeedKind::SystemPricingPlans => "system_pricing_plans",
            FeedKind::SystemAlerts => "system_alerts",
            FeedKind::VehicleTypes => "vehicle_types",
        }
    }
}

impl FromStr for FeedKind {
    type Err = UnknownFeedKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownFeedKind {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The URL at which one provider publishes one feed kind in one language.
///
/// Created wholesale on each ingestion pass; never partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDocumentLocation {
    pub kind: FeedKind,
    pub language: String,
    pub url: String,
}
