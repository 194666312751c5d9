use chrono::NaiveDate;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::common::error::{ErrCode, SeqError};

/// Trading date attached to every bar.
///
/// Supports multiple input formats: "YYYY-MM-DD", "YYYYMMDD" and
/// "YYYY-MM-DD HH:MM:SS" (intraday part discarded). Displays and serializes
/// as "YYYY-MM-DD".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, SeqError> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self).ok_or_else(|| {
            SeqError::new(
                format!("invalid calendar date {:04}-{:02}-{:02}", year, month, day),
                ErrCode::TimeParseError,
            )
        })
    }

    pub fn inner(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for Date {
    type Err = SeqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((date_part, _)) = s.split_once(' ') {
            return date_part.parse();
        }
        let parsed = if s.contains('-') {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
        } else {
            NaiveDate::parse_from_str(s, "%Y%m%d")
        };
        parsed.map(Self).map_err(|e| {
            SeqError::new(format!("cannot parse date '{}': {}", s, e), ErrCode::TimeParseError)
        })
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DateVisitor;

        impl<'de> de::Visitor<'de> for DateVisitor {
            type Value = Date;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a date string like 2024-01-31")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Date, E> {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(DateVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dashed() {
        let d: Date = "2024-01-31".parse().unwrap();
        assert_eq!(d, Date::new(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_parse_compact() {
        let d: Date = "20240131".parse().unwrap();
        assert_eq!(d.to_string(), "2024-01-31");
    }

    #[test]
    fn test_parse_datetime_discards_time() {
        let d: Date = "2024-01-31 15:00:00".parse().unwrap();
        assert_eq!(d, Date::new(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_parse_garbage_fails() {
        let err = "not-a-date".parse::<Date>().unwrap_err();
        assert_eq!(err.code, ErrCode::TimeParseError);
        assert!(Date::new(2024, 13, 1).is_err());
    }

    #[test]
    fn test_ordering() {
        let a: Date = "2024-01-01".parse().unwrap();
        let b: Date = "2024-02-01".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde_round_trip() {
        let d: Date = "2024-06-03".parse().unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"2024-06-03\"");
        let back: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
