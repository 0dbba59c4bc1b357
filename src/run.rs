//! Model-run selection.
//!
//! GFS cycles start at 00/06/12/18 UTC and take about two hours to publish
//! completely. The selected run is the latest cycle at least that old.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use serde::Serialize;
use std::fmt;

/// Cycle hours, ascending.
pub const RUN_HOURS: [u32; 4] = [0, 6, 12, 18];

/// Time after a cycle's nominal start before its images are all available.
pub const PUBLICATION_LAG_HOURS: i64 = 2;

/// Nominal start of the forecast cycle images were generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ModelRun(DateTime<Utc>);

impl ModelRun {
    /// Accepts only exact cycle starts (00/06/12/18:00:00 UTC).
    pub fn new(time: DateTime<Utc>) -> Option<Self> {
        let on_cycle = RUN_HOURS.contains(&time.hour())
            && time.minute() == 0
            && time.second() == 0
            && time.nanosecond() == 0;
        on_cycle.then_some(Self(time))
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.0
    }

    /// Valid time of a forecast day: the run plus 24h per day.
    pub fn valid_time(&self, day: u8) -> DateTime<Utc> {
        self.0 + Duration::hours(24 * i64::from(day))
    }
}

impl fmt::Display for ModelRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%MZ"))
    }
}

fn at_hour(now: DateTime<Utc>, hour: u32) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    Some(Utc.from_utc_datetime(&now.date_naive().and_time(time)))
}

/// Selects the latest fully-published run as of `now`.
///
/// Within two hours of midnight no cycle from today qualifies, so the
/// previous day's 18Z run is returned.
pub fn latest_gfs_run(now: DateTime<Utc>) -> ModelRun {
    let lag = Duration::hours(PUBLICATION_LAG_HOURS);

    for &hour in RUN_HOURS.iter().rev() {
        if let Some(candidate) = at_hour(now, hour) {
            if now >= candidate + lag {
                return ModelRun(candidate);
            }
        }
    }

    let yesterday = now - Duration::days(1);
    // 18:00 is always a valid time of day.
    let fallback = at_hour(yesterday, 18).unwrap_or(yesterday);
    ModelRun(fallback)
}
