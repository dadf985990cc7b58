//! Local-calendar math and geolocation-based time zone lookup.
//!
//! All timestamps are stored as naive UTC; the user's IANA zone is applied
//! only at the boundaries where the calendar matters: deciding which cards
//! are due "today" and placing the daily rehearsal reminder.

use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

use crate::errors::TurnError;

/// Result of a geolocation-to-time-zone lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneInfo {
    /// IANA zone id, e.g. "Europe/Amsterdam".
    pub time_zone_id: String,
    /// Human-readable zone name, e.g. "Central European Standard Time".
    pub time_zone_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimezoneApiResponse {
    status: String,
    #[serde(default)]
    time_zone_id: Option<String>,
    #[serde(default)]
    time_zone_name: Option<String>,
}

/// Resolves a latitude/longitude to an IANA time zone.
///
/// The `Fixed` variant backs tests and deployments without an API key.
#[derive(Debug, Clone)]
pub enum TimezoneResolver {
    /// Queries the Google Time Zone API.
    Http {
        client: reqwest::Client,
        api_key: String,
    },
    /// Always answers with the configured zone.
    Fixed(String),
}

impl TimezoneResolver {
    pub async fn resolve(&self, latitude: f64, longitude: f64) -> anyhow::Result<TimezoneInfo> {
        match self {
            TimezoneResolver::Fixed(zone) => Ok(TimezoneInfo {
                time_zone_id: zone.clone(),
                time_zone_name: zone.clone(),
            }),
            TimezoneResolver::Http { client, api_key } => {
                let response: TimezoneApiResponse = client
                    .get("https://maps.googleapis.com/maps/api/timezone/json")
                    .query(&[
                        ("location", format!("{},{}", latitude, longitude)),
                        ("timestamp", Utc::now().timestamp().to_string()),
                        ("key", api_key.clone()),
                    ])
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;

                debug!(status = %response.status, "time zone lookup completed");
                if response.status != "OK" {
                    anyhow::bail!("time zone lookup failed with status {}", response.status);
                }
                let time_zone_id = response
                    .time_zone_id
                    .ok_or_else(|| anyhow::anyhow!("time zone lookup returned no zone id"))?;
                Ok(TimezoneInfo {
                    time_zone_name: response.time_zone_name.unwrap_or_else(|| time_zone_id.clone()),
                    time_zone_id,
                })
            }
        }
    }
}

fn parse_zone(tz_name: &str) -> Result<Tz, TurnError> {
    tz_name
        .parse()
        .map_err(|_| TurnError::InvalidTimeZone(tz_name.to_string()))
}

/// Converts a local wall-clock time to naive UTC. Ambiguous times (fall-back)
/// take the earlier instant; nonexistent times (spring-forward gap) are
/// shifted one hour later.
fn local_to_utc(zone: Tz, local: NaiveDateTime) -> NaiveDateTime {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.naive_utc(),
        LocalResult::None => match zone.from_local_datetime(&(local + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.naive_utc(),
            LocalResult::None => local,
        },
    }
}

/// The UTC instant of local midnight today in the user's zone. Cards with
/// `next_repetition` at or before this instant are due.
pub fn start_of_today_utc(tz_name: &str, now: DateTime<Utc>) -> Result<NaiveDateTime, TurnError> {
    let zone = parse_zone(tz_name)?;
    let local_midnight = now
        .with_timezone(&zone)
        .date_naive()
        .and_time(NaiveTime::MIN);
    Ok(local_to_utc(zone, local_midnight))
}

/// The UTC instant a card reviewed now with the given interval becomes due:
/// local midnight today plus `interval` days. Interval 0 keeps the card due
/// immediately.
pub fn due_date_utc(
    tz_name: &str,
    now: DateTime<Utc>,
    interval: i32,
) -> Result<NaiveDateTime, TurnError> {
    let zone = parse_zone(tz_name)?;
    let local_midnight = now
        .with_timezone(&zone)
        .date_naive()
        .and_time(NaiveTime::MIN);
    let local_due = local_midnight + Duration::days(i64::from(interval));
    Ok(local_to_utc(zone, local_due))
}

/// The next UTC instant strictly after `now` at which the local wall clock
/// reads `rehearsal_time` ("HH:MM").
pub fn next_rehearsal_utc(
    tz_name: &str,
    rehearsal_time: &str,
    now: DateTime<Utc>,
) -> Result<NaiveDateTime, TurnError> {
    let zone = parse_zone(tz_name)?;
    let wall_time = NaiveTime::parse_from_str(rehearsal_time, "%H:%M")
        .map_err(|_| TurnError::InvalidRehearsalTime(rehearsal_time.to_string()))?;

    let local_now = now.with_timezone(&zone).naive_local();
    let mut candidate = local_now.date().and_time(wall_time);
    if candidate <= local_now {
        candidate += Duration::days(1);
    }
    Ok(local_to_utc(zone, candidate))
}

/// Checks that a wall-clock time string parses as "HH:MM".
pub fn parse_rehearsal_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_start_of_today_in_utc() {
        let sod = start_of_today_utc("UTC", utc("2026-03-10T15:30:00Z")).unwrap();
        assert_eq!(sod, naive("2026-03-10 00:00:00"));
    }

    #[test]
    fn test_start_of_today_crosses_date_line() {
        // 23:00 UTC on the 10th is already the 11th in Tokyo (+09:00), so
        // local midnight falls at 15:00 UTC on the 10th.
        let sod = start_of_today_utc("Asia/Tokyo", utc("2026-03-10T23:00:00Z")).unwrap();
        assert_eq!(sod, naive("2026-03-10 15:00:00"));
    }

    #[test]
    fn test_start_of_today_behind_utc() {
        // 02:00 UTC on the 11th is still the evening of the 10th in New York,
        // on daylight time (-04:00): local midnight was 04:00 UTC on the 10th.
        let sod = start_of_today_utc("America/New_York", utc("2026-03-11T02:00:00Z")).unwrap();
        assert_eq!(sod, naive("2026-03-10 04:00:00"));
    }

    #[test]
    fn test_invalid_zone_is_an_error() {
        assert!(matches!(
            start_of_today_utc("Mars/Olympus_Mons", utc("2026-03-10T12:00:00Z")),
            Err(TurnError::InvalidTimeZone(_))
        ));
    }

    #[test]
    fn test_due_date_interval_zero_is_today() {
        let now = utc("2026-03-10T15:30:00Z");
        let due = due_date_utc("UTC", now, 0).unwrap();
        assert_eq!(due, naive("2026-03-10 00:00:00"));
        assert!(due <= now.naive_utc());
    }

    #[test]
    fn test_due_date_counts_local_days() {
        let due = due_date_utc("Asia/Tokyo", utc("2026-03-10T23:00:00Z"), 6).unwrap();
        assert_eq!(due, naive("2026-03-16 15:00:00"));
    }

    #[test]
    fn test_due_date_spans_dst_transition() {
        // US DST starts 2026-03-08: midnight on the 10th is 04:00 UTC, one
        // hour earlier than before the transition.
        let due = due_date_utc("America/New_York", utc("2026-03-07T12:00:00Z"), 3).unwrap();
        assert_eq!(due, naive("2026-03-10 04:00:00"));
    }

    #[test]
    fn test_next_rehearsal_later_today() {
        let next = next_rehearsal_utc("UTC", "12:00", utc("2026-03-10T09:00:00Z")).unwrap();
        assert_eq!(next, naive("2026-03-10 12:00:00"));
    }

    #[test]
    fn test_next_rehearsal_rolls_to_tomorrow() {
        let next = next_rehearsal_utc("UTC", "12:00", utc("2026-03-10T12:00:00Z")).unwrap();
        assert_eq!(next, naive("2026-03-11 12:00:00"));
    }

    #[test]
    fn test_next_rehearsal_in_local_zone() {
        // 12:00 in Tokyo is 03:00 UTC.
        let next = next_rehearsal_utc("Asia/Tokyo", "12:00", utc("2026-03-10T00:00:00Z")).unwrap();
        assert_eq!(next, naive("2026-03-10 03:00:00"));
    }

    #[test]
    fn test_parse_rehearsal_time() {
        assert!(parse_rehearsal_time("09:30").is_some());
        assert!(parse_rehearsal_time(" 23:59 ").is_some());
        assert!(parse_rehearsal_time("25:00").is_none());
        assert!(parse_rehearsal_time("morning").is_none());
    }

    #[tokio::test]
    async fn test_fixed_resolver() {
        let resolver = TimezoneResolver::Fixed("Europe/Amsterdam".to_string());
        let info = resolver.resolve(52.37, 4.89).await.unwrap();
        assert_eq!(info.time_zone_id, "Europe/Amsterdam");
    }
}
