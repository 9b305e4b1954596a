//! GBFS document DTOs.
//!
//! These types map to the JSON documents providers publish. Optional fields
//! use `Option` or defaults throughout: an omitted field must never fail a
//! decode, only a structurally invalid one may.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::{self, Deserializer};
use serde_json::Value;

use crate::domain::{FeedDocumentLocation, FeedKind};

use super::error::DecodeError;
use super::scalar::{Clock, Date, Id, LooseBool, Timestamp, Weekday};

/// Sentinel language bucket synthesized for providers that publish their
/// feed list at the root of the discovery document, skipping the
/// language wrapper.
pub const DEFAULT_LANGUAGE: &str = "default";

/// Common header carried at the top level of every GBFS document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Header {
    pub last_updated: Option<Timestamp>,
    #[serde(default)]
    pub ttl: u32,
    /// Added in GBFS v1.1; absent from older feeds.
    pub version: Option<String>,
}

/// A single feed entry in a discovery document. The feed name stays a raw
/// string here; mapping to [`FeedKind`] happens during normalization so an
/// unknown name surfaces as an unrecognized-discriminator error rather than
/// a generic serde failure.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRef {
    pub name: String,
    pub url: String,
}

/// The `{"feeds": [...]}` object published per language.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedList {
    #[serde(default)]
    pub feeds: Vec<FeedRef>,
}

/// The `data` payload of a discovery document: language code → feed list.
///
/// Some providers publish the feed list directly at the root, omitting the
/// language wrapper. That shape is detected by the presence of a top-level
/// `feeds` key and rewritten into a single [`DEFAULT_LANGUAGE`] bucket, so
/// downstream code always sees the language-keyed form.
#[derive(Debug, Clone, Default)]
pub struct LanguageFeeds(pub BTreeMap<String, FeedList>);

impl<'de> Deserialize<'de> for LanguageFeeds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Object(map) = Value::deserialize(deserializer)? else {
            return Err(de::Error::custom("discovery data must be an object"));
        };

        if let Some(raw) = map.get("feeds") {
            let feeds: Vec<FeedRef> =
                serde_json::from_value(raw.clone()).map_err(de::Error::custom)?;
            let mut languages = BTreeMap::new();
            languages.insert(DEFAULT_LANGUAGE.to_string(), FeedList { feeds });
            return Ok(LanguageFeeds(languages));
        }

        let mut languages = BTreeMap::new();
        for (language, raw) in map {
            let list: FeedList = serde_json::from_value(raw).map_err(de::Error::custom)?;
            languages.insert(language, list);
        }
        Ok(LanguageFeeds(languages))
    }
}

/// The root discovery document as it arrives off the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryResponse {
    #[serde(flatten)]
    pub header: Header,
    #[serde(default)]
    pub data: LanguageFeeds,
}

/// The decoded, per-language feed map for one provider.
///
/// Transient: lives only in the feed cache and is rebuilt from the network
/// on a miss.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedFeedSet {
    pub last_updated: Option<Timestamp>,
    /// Language code → discovered feed locations, each carrying its language.
    pub languages: BTreeMap<String, Vec<FeedDocumentLocation>>,
}

impl NormalizedFeedSet {
    /// Normalize a wire discovery document. Every feed name must map to a
    /// known [`FeedKind`]; an unknown name fails the whole document.
    pub fn from_wire(response: DiscoveryResponse) -> Result<Self, DecodeError> {
        let mut languages = BTreeMap::new();

        for (language, list) in response.data.0 {
            let mut locations = Vec::with_capacity(list.feeds.len());
            for feed in list.feeds {
                let kind: FeedKind =
                    feed.name
                        .parse()
                        .map_err(|_| DecodeError::UnrecognizedDiscriminator {
                            value: feed.name.clone(),
                        })?;
                locations.push(FeedDocumentLocation {
                    kind,
                    language: language.clone(),
                    url: feed.url,
                });
            }
            languages.insert(language, locations);
        }

        Ok(NormalizedFeedSet {
            last_updated: response.header.last_updated,
            languages,
        })
    }

    /// True when the document carried no language buckets at all.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Feed locations for the requested language, falling back to any
    /// available language when the exact one is absent. Which language the
    /// fallback picks is unspecified.
    pub fn feeds_for(&self, language: &str) -> Option<&[FeedDocumentLocation]> {
        if let Some(locations) = self.languages.get(language) {
            return Some(locations);
        }
        self.languages.values().next().map(Vec::as_slice)
    }

    /// Resolve the URL of one feed kind in the requested language (with
    /// language fallback).
    pub fn feed_url(&self, kind: FeedKind, language: &str) -> Option<&str> {
        self.feeds_for(language)?
            .iter()
            .find(|location| location.kind == kind)
            .map(|location| location.url.as_str())
    }
}

/// `system_information` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemInformation {
    pub system_id: Option<Id>,
    pub language: Option<String>,
    #[serde(default)]
    pub name: String,
    pub short_name: Option<String>,
    pub operator: Option<String>,
    pub url: Option<String>,
    pub purchase_url: Option<String>,
    pub start_date: Option<Date>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub feed_contact_email: Option<String>,
    pub timezone: Option<String>,
    pub license_id: Option<String>,
    pub license_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemInformationResponse {
    #[serde(flatten)]
    pub header: Header,
    pub data: Option<SystemInformation>,
}

/// One station from `station_information`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationInformation {
    pub station_id: Id,
    #[serde(default)]
    pub name: String,
    pub short_name: Option<String>,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    pub address: Option<String>,
    pub cross_street: Option<String>,
    pub region_id: Option<Id>,
    pub post_code: Option<String>,
    #[serde(default)]
    pub rental_methods: Vec<String>,
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationInformationData {
    #[serde(default)]
    pub stations: Vec<StationInformation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationInformationResponse {
    #[serde(flatten)]
    pub header: Header,
    #[serde(default)]
    pub data: StationInformationData,
}

/// One station from `station_status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationStatus {
    pub station_id: Id,
    #[serde(default)]
    pub num_bikes_available: u32,
    pub num_bikes_disabled: Option<u32>,
    pub num_docks_available: Option<u32>,
    pub is_installed: Option<LooseBool>,
    pub is_renting: Option<LooseBool>,
    pub is_returning: Option<LooseBool>,
    pub last_reported: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationStatusData {
    #[serde(default)]
    pub stations: Vec<StationStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationStatusResponse {
    #[serde(flatten)]
    pub header: Header,
    #[serde(default)]
    pub data: StationStatusData,
}

/// One entry from `system_hours`.
#[derive(Debug, Clone, Deserialize)]
pub struct RentalHours {
    #[serde(default)]
    pub user_types: Vec<String>,
    #[serde(default)]
    pub days: Vec<Weekday>,
    pub start_time: Option<Clock>,
    pub end_time: Option<Clock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemHoursData {
    #[serde(default)]
    pub rental_hours: Vec<RentalHours>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemHoursResponse {
    #[serde(flatten)]
    pub header: Header,
    #[serde(default)]
    pub data: SystemHoursData,
}

/// One operating period from `system_calendar`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarPeriod {
    #[serde(default)]
    pub start_month: u16,
    #[serde(default)]
    pub start_day: u16,
    pub start_year: Option<u16>,
    #[serde(default)]
    pub end_month: u16,
    #[serde(default)]
    pub end_day: u16,
    pub end_year: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemCalendarData {
    #[serde(default)]
    pub calendars: Vec<CalendarPeriod>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemCalendarResponse {
    #[serde(flatten)]
    pub header: Header,
    #[serde(default)]
    pub data: SystemCalendarData,
}
