//! Document decoding entry points.
//!
//! Pure functions from raw bytes to normalized records. Idempotent, with no
//! side effects; language buckets and map keys may be visited in any order.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::FeedKind;

use super::error::DecodeError;
use super::types::{
    DiscoveryResponse, NormalizedFeedSet, StationInformationResponse, StationStatusResponse,
    SystemCalendarResponse, SystemHoursResponse, SystemInformationResponse,
};

/// A decoded feed document of any kind.
///
/// Kinds without a typed projection decode to [`Document::Raw`], which still
/// validates JSON syntax and carries the payload for callers that want it.
#[derive(Debug, Clone)]
pub enum Document {
    SystemInformation(SystemInformationResponse),
    StationInformation(StationInformationResponse),
    StationStatus(StationStatusResponse),
    SystemHours(SystemHoursResponse),
    SystemCalendar(SystemCalendarResponse),
    Raw(Value),
}

impl Document {
    /// True when the document's top-level data payload is absent or empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Document::SystemInformation(r) => r.data.is_none(),
            Document::StationInformation(r) => r.data.stations.is_empty(),
            Document::StationStatus(r) => r.data.stations.is_empty(),
            Document::SystemHours(r) => r.data.rental_hours.is_empty(),
            Document::SystemCalendar(r) => r.data.calendars.is_empty(),
            Document::Raw(value) => match value.get("data") {
                None | Some(Value::Null) => true,
                Some(Value::Object(map)) => map.is_empty(),
                Some(Value::Array(items)) => items.is_empty(),
                Some(_) => false,
            },
        }
    }
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(DecodeError::from_json)
}

/// Decode a root discovery document into its normalized per-language form.
pub fn decode_discovery(bytes: &[u8]) -> Result<NormalizedFeedSet, DecodeError> {
    let response: DiscoveryResponse = parse(bytes)?;
    NormalizedFeedSet::from_wire(response)
}

/// Decode a feed document of the given kind.
pub fn decode_feed(bytes: &[u8], kind: FeedKind) -> Result<Document, DecodeError> {
    match kind {
        FeedKind::SystemInformation => parse(bytes).map(Document::SystemInformation),
        FeedKind::StationInformation => parse(bytes).map(Document::StationInformation),
        FeedKind::StationStatus => parse(bytes).map(Document::StationStatus),
        FeedKind::SystemHours => parse(bytes).map(Document::SystemHours),
        FeedKind::SystemCalendar => parse(bytes).map(Document::SystemCalendar),
        FeedKind::GbfsVersions
        | FeedKind::FreeBikeStatus
        | FeedKind::SystemRegions
        | FeedKind::SystemPricingPlans
        | FeedKind::SystemAlerts
        | FeedKind::VehicleTypes => parse(bytes).map(Document::Raw),
    }
}
