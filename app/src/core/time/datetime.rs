use std::{
    fmt::Display,
    ops::{Add, Sub},
};

use anyhow::Context as _;
use chrono::{Datelike as _, TimeZone as _};
use tokio::task_local;

use super::{Duration, Time, Weekday};

task_local! {
    pub static FIXED_NOW: DateTime;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DateTime {
    delegate: chrono::DateTime<chrono::Local>,
}

impl DateTime {
    fn new<T: chrono::TimeZone>(delegate: chrono::DateTime<T>) -> Self {
        Self {
            delegate: delegate.with_timezone(&chrono::Local),
        }
    }

    pub fn now() -> Self {
        FIXED_NOW
            .try_with(|t| *t)
            .unwrap_or_else(|_| chrono::Local::now().into())
    }

    pub fn from_iso(iso8601: &str) -> anyhow::Result<Self> {
        Ok(chrono::DateTime::parse_from_rfc3339(iso8601)?.into())
    }

    /// Wall-clock date and time in the local timezone.
    pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> anyhow::Result<Self> {
        chrono::Local
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .earliest()
            .map(Self::new)
            .with_context(|| format!("Invalid local date-time {year}-{month}-{day} {hour}:{minute}"))
    }

    pub fn to_human_readable(&self) -> String {
        chrono_humanize::HumanTime::from(self.delegate).to_string()
    }

    pub fn time(&self) -> Time {
        Time::new(self.delegate.time())
    }

    pub fn weekday(&self) -> Weekday {
        self.delegate.weekday().into()
    }

    pub fn start_of_day(&self) -> Self {
        self.at_midnight(self.delegate.date_naive())
    }

    //weeks start on sunday
    pub fn start_of_week(&self) -> Self {
        let days_since_sunday = self.delegate.weekday().num_days_from_sunday() as i64;
        let date = self.delegate.date_naive() - chrono::Duration::days(days_since_sunday);
        self.at_midnight(date)
    }

    pub fn start_of_month(&self) -> Self {
        let date = self.delegate.date_naive().with_day(1).unwrap_or(self.delegate.date_naive());
        self.at_midnight(date)
    }

    fn at_midnight(&self, date: chrono::NaiveDate) -> Self {
        //midnight can be skipped by DST in some zones, then fall back to the first valid instant of that day
        chrono::Local
            .from_local_datetime(&date.and_time(chrono::NaiveTime::MIN))
            .earliest()
            .or_else(|| {
                chrono::Local
                    .from_local_datetime(&date.and_hms_opt(1, 0, 0).unwrap_or_default())
                    .earliest()
            })
            .map(Self::new)
            .unwrap_or(*self)
    }

    pub fn elapsed_since(&self, since: Self) -> Duration {
        Duration::new(self.delegate - since.delegate)
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.delegate)
    }
}

impl Add<Duration> for DateTime {
    type Output = DateTime;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::new(self.delegate + rhs.delegate)
    }
}

impl Sub<Duration> for DateTime {
    type Output = DateTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self::new(self.delegate - rhs.delegate)
    }
}

impl<T: chrono::TimeZone> From<chrono::DateTime<T>> for DateTime {
    fn from(val: chrono::DateTime<T>) -> Self {
        DateTime::new(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::t;

    #[test]
    fn test_elapsed_since() {
        let start = DateTime::from_iso("2024-11-03T15:23:46Z").unwrap();
        let end = DateTime::from_iso("2024-11-03T15:23:51Z").unwrap();

        assert_eq!(end.elapsed_since(start).as_millis(), 5000);
        assert_eq!(start.elapsed_since(end).as_millis(), -5000);
    }

    #[test]
    fn test_start_of_day() {
        let dt = DateTime::local(2025, 3, 12, 14, 35).unwrap();

        assert_eq!(dt.start_of_day(), DateTime::local(2025, 3, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_start_of_week_is_sunday() {
        //2025-03-12 is a wednesday
        let dt = DateTime::local(2025, 3, 12, 14, 35).unwrap();

        let start = dt.start_of_week();

        assert_eq!(start, DateTime::local(2025, 3, 9, 0, 0).unwrap());
        assert_eq!(start.weekday(), Weekday::Sunday);
    }

    #[test]
    fn test_start_of_week_on_sunday() {
        let dt = DateTime::local(2025, 3, 9, 8, 0).unwrap();

        assert_eq!(dt.start_of_week(), DateTime::local(2025, 3, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_start_of_month() {
        let dt = DateTime::local(2025, 3, 12, 14, 35).unwrap();

        assert_eq!(dt.start_of_month(), DateTime::local(2025, 3, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_time_and_weekday() {
        let dt = DateTime::local(2025, 3, 14, 7, 5).unwrap();

        assert_eq!(dt.time(), t!(7:05));
        assert_eq!(dt.weekday(), Weekday::Friday);
    }

    #[tokio::test]
    async fn test_fixed_now() {
        let fixed = DateTime::from_iso("2024-11-03T15:23:46Z").unwrap();

        let now = FIXED_NOW.scope(fixed, async { DateTime::now() }).await;

        assert_eq!(now, fixed);
    }
}
