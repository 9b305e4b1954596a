//! Tolerant scalar wire types.
//!
//! Providers in the wild drift from the published schema: identifiers arrive
//! as numbers, booleans as quoted strings, and so on. Each type here accepts
//! the union of shapes observed in real feeds and normalizes to a single
//! canonical representation. Anything outside the accepted union is a hard
//! decode failure.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An identifier, always normalized to a string.
///
/// Accepted wire shapes: JSON string, integer, or floating number
/// (`"5"`, `5`, and `5.0` all decode to `"5"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Id(pub String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id(s.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Id(s)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Id(i.to_string()))
                } else if let Some(f) = n.as_f64() {
                    Ok(Id(format!("{f:.0}")))
                } else {
                    Err(de::Error::custom("identifier number out of range"))
                }
            }
            other => Err(de::Error::custom(format!(
                "identifier must be a string or number, got {other}"
            ))),
        }
    }
}

/// A boolean, tolerating the string and numeric encodings seen in feeds.
///
/// Accepted wire shapes: JSON boolean, the strings `"true"`/`"false"`
/// (any case), or a number (nonzero is `true`, zero is `false`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LooseBool(pub bool);

impl LooseBool {
    pub fn as_bool(&self) -> bool {
        self.0
    }
}

impl From<bool> for LooseBool {
    fn from(b: bool) -> Self {
        LooseBool(b)
    }
}

impl<'de> Deserialize<'de> for LooseBool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Bool(b) => Ok(LooseBool(b)),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(LooseBool(true)),
                "false" => Ok(LooseBool(false)),
                other => Err(de::Error::custom(format!(
                    "boolean string must be \"true\" or \"false\", got {other:?}"
                ))),
            },
            Value::Number(n) => {
                let f = n
                    .as_f64()
                    .ok_or_else(|| de::Error::custom("boolean number out of range"))?;
                Ok(LooseBool(f != 0.0))
            }
            other => Err(de::Error::custom(format!(
                "boolean must be a bool, string, or number, got {other}"
            ))),
        }
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const CLOCK_FORMAT: &str = "%H:%M:%S";

/// A calendar date in fixed `YYYY-MM-DD` text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date(pub NaiveDate);

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .map(Date)
            .map_err(|_| de::Error::custom(format!("date must be YYYY-MM-DD, got {s:?}")))
    }
}

impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0.format(DATE_FORMAT))
    }
}

/// A time of day in fixed `HH:MM:SS` text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Clock(pub NaiveTime);

impl<'de> Deserialize<'de> for Clock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, CLOCK_FORMAT)
            .map(Clock)
            .map_err(|_| de::Error::custom(format!("clock time must be HH:MM:SS, got {s:?}")))
    }
}

impl Serialize for Clock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0.format(CLOCK_FORMAT))
    }
}

/// An epoch timestamp, stored as whole seconds so it round-trips losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Seconds since the Unix epoch.
    pub fn unix(&self) -> i64 {
        self.0
    }

    /// The timestamp as a UTC datetime.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        i64::deserialize(deserializer).map(Timestamp)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

/// A day of the week, decoded from three-letter abbreviations
/// (`mon` through `sun`, case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weekday(pub chrono::Weekday);

const WEEKDAY_ABBREVIATIONS: [(&str, chrono::Weekday); 7] = [
    ("mon", chrono::Weekday::Mon),
    ("tue", chrono::Weekday::Tue),
    ("wed", chrono::Weekday::Wed),
    ("thu", chrono::Weekday::Thu),
    ("fri", chrono::Weekday::Fri),
    ("sat", chrono::Weekday::Sat),
    ("sun", chrono::Weekday::Sun),
];

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let lower = s.to_ascii_lowercase();
        WEEKDAY_ABBREVIATIONS
            .iter()
            .find(|(abbr, _)| *abbr == lower)
            .map(|&(_, day)| Weekday(day))
            .ok_or_else(|| de::Error::custom(format!("cannot parse {s:?} as a weekday")))
    }
}

impl Serialize for Weekday {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let abbr = WEEKDAY_ABBREVIATIONS
            .iter()
            .find(|(_, day)| *day == self.0)
            .map(|&(abbr, _)| abbr)
            .unwrap_or("mon");
        serializer.serialize_str(abbr)
    }
}
