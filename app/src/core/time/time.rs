use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use chrono::Timelike;

/// Wall-clock time of day with minute precision. Serialized as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    pub(super) delegate: chrono::NaiveTime,
}

impl Time {
    pub(super) fn new(delegate: chrono::NaiveTime) -> Self {
        Self { delegate }
    }

    pub fn at(hour: u32, minute: u32) -> anyhow::Result<Self> {
        Ok(Self {
            delegate: chrono::NaiveTime::from_hms_opt(hour, minute, 0)
                .context(format!("Error parsing time {}:{}", hour, minute))?,
        })
    }

    pub fn hour(&self) -> u32 {
        self.delegate.hour()
    }

    pub fn minute(&self) -> u32 {
        self.delegate.minute()
    }

    pub fn same_minute(&self, other: &Time) -> bool {
        self.hour() == other.hour() && self.minute() == other.minute()
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for Time {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .with_context(|| format!("Time {s} is not in format HH:MM"))?;

        let hour = hour.parse::<u32>().with_context(|| format!("Invalid hour in {s}"))?;
        let minute = minute.parse::<u32>().with_context(|| format!("Invalid minute in {s}"))?;

        Self::at(hour, minute)
    }
}

impl serde::Serialize for Time {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Time {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::t;

    #[test]
    fn test_parse_without_leading_zero() {
        assert_eq!("7:05".parse::<Time>().unwrap(), t!(7:05));
        assert_eq!("19:30".parse::<Time>().unwrap(), t!(19:30));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("24:00".parse::<Time>().is_err());
        assert!("7.05".parse::<Time>().is_err());
        assert!("ab:cd".parse::<Time>().is_err());
    }

    #[test]
    fn test_serde_format() {
        assert_eq!(serde_json::to_string(&t!(7:05)).unwrap(), r#""07:05""#);
        assert_eq!(serde_json::from_str::<Time>(r#""7:05""#).unwrap(), t!(7:05));
    }

    #[test]
    fn test_weekday_serde() {
        assert_eq!(serde_json::to_string(&Weekday::Monday).unwrap(), r#""monday""#);
        assert_eq!(serde_json::from_str::<Weekday>(r#""sunday""#).unwrap(), Weekday::Sunday);
    }
}
