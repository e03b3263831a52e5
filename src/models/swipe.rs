// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge swipe models, raw (portal wire format) and normalized.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Direction of a swipe, and equally the current presence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub enum InOut {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl InOut {
    /// Portal indicator mapping: `1` is IN, every other value is OUT.
    pub fn from_indicator(indicator: &serde_json::Value) -> Self {
        let is_in = match indicator {
            serde_json::Value::Number(n) => n.as_i64() == Some(1) || n.as_f64() == Some(1.0),
            serde_json::Value::String(s) => s.trim() == "1",
            _ => false,
        };
        if is_in {
            InOut::In
        } else {
            InOut::Out
        }
    }

    /// Integer stored in the `currentStatus` column.
    pub fn as_db_int(self) -> i64 {
        match self {
            InOut::In => 1,
            InOut::Out => 0,
        }
    }

    pub fn from_db_int(value: i64) -> Self {
        if value == 1 {
            InOut::In
        } else {
            InOut::Out
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InOut::In => "IN",
            InOut::Out => "OUT",
        }
    }
}

/// A swipe record as the portal returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSwipe {
    /// Punch timestamp, with or without an offset
    pub punch_time: String,
    /// `1` for IN; anything else is OUT
    #[serde(default)]
    pub in_out_indicator: serde_json::Value,
}

/// A single validated badge event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeEvent {
    pub timestamp: DateTime<Local>,
    pub direction: InOut,
}

impl SwipeEvent {
    pub fn new(timestamp: DateTime<Local>, direction: InOut) -> Self {
        Self {
            timestamp,
            direction,
        }
    }
}

/// Zone used for punch times that carry no offset of their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PunchTimeZone {
    /// Host local clock.
    #[default]
    Local,
    Utc,
}

impl FromStr for PunchTimeZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(PunchTimeZone::Local),
            "utc" => Ok(PunchTimeZone::Utc),
            other => Err(format!("unknown punch time zone: {}", other)),
        }
    }
}

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

impl PunchTimeZone {
    /// Parse a punch time into an absolute instant.
    ///
    /// Explicit offsets win; zone-less values are read in `self`. Returns
    /// `None` for unparseable input and for local times skipped by a DST gap.
    pub fn parse(self, raw: &str) -> Option<DateTime<Local>> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local));
        }
        if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(dt.with_timezone(&Local));
        }

        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;

        match self {
            PunchTimeZone::Local => Local.from_local_datetime(&naive).earliest(),
            PunchTimeZone::Utc => Some(Utc.from_utc_datetime(&naive).with_timezone(&Local)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indicator_mapping() {
        assert_eq!(InOut::from_indicator(&json!(1)), InOut::In);
        assert_eq!(InOut::from_indicator(&json!("1")), InOut::In);
        assert_eq!(InOut::from_indicator(&json!(0)), InOut::Out);
        assert_eq!(InOut::from_indicator(&json!(2)), InOut::Out);
        assert_eq!(InOut::from_indicator(&json!(null)), InOut::Out);
        assert_eq!(InOut::from_indicator(&json!("IN")), InOut::Out);
    }

    #[test]
    fn test_raw_swipe_deserialize() {
        let raw: RawSwipe = serde_json::from_value(json!({
            "punchTime": "2024-05-06T09:15:00",
            "inOutIndicator": 1,
            "attdSwipeId": 42
        }))
        .unwrap();
        assert_eq!(raw.punch_time, "2024-05-06T09:15:00");
        assert_eq!(InOut::from_indicator(&raw.in_out_indicator), InOut::In);
    }

    #[test]
    fn test_parse_offset_is_honored_by_both_policies() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 6, 9, 15, 0).unwrap();
        for zone in [PunchTimeZone::Local, PunchTimeZone::Utc] {
            let parsed = zone.parse("2024-05-06T09:15:00Z").unwrap();
            assert_eq!(parsed.with_timezone(&Utc), expected);
            let parsed = zone.parse("2024-05-06T11:15:00+02:00").unwrap();
            assert_eq!(parsed.with_timezone(&Utc), expected);
        }
    }

    #[test]
    fn test_parse_zone_less() {
        let utc = PunchTimeZone::Utc.parse("2024-05-06T09:15:00.000").unwrap();
        assert_eq!(
            utc.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 5, 6, 9, 15, 0).unwrap()
        );

        let local = PunchTimeZone::Local.parse("2024-05-06 09:15:00").unwrap();
        assert_eq!(local.naive_local().to_string(), "2024-05-06 09:15:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(PunchTimeZone::Local.parse("yesterday").is_none());
        assert!(PunchTimeZone::Local.parse("").is_none());
    }

    #[test]
    fn test_zone_from_str() {
        assert_eq!("UTC".parse::<PunchTimeZone>(), Ok(PunchTimeZone::Utc));
        assert_eq!(" local ".parse::<PunchTimeZone>(), Ok(PunchTimeZone::Local));
        assert!("mars".parse::<PunchTimeZone>().is_err());
    }
}
