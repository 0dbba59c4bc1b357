//! Reduction of per-image classifications into daily records and multi-day
//! regime summaries.
//!
//! Days are rebuilt in order 1..=16 from the index map, so the summary does
//! not depend on the order in which fetches completed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

use crate::classify::ClassificationResult;
use crate::error::AggregateError;
use crate::forecast::{FIRST_DAY, ForecastIndex, HORIZON_DAYS, LAST_DAY, day_indices};
use crate::run::ModelRun;

/// Days 1–7.
pub const WEEK_WINDOW: std::ops::Range<usize> = 0..7;
/// Days 8–16.
pub const RANGE_WINDOW: std::ops::Range<usize> = 7..16;

pub const UNAVAILABLE_REPORT: &str = "Weather data unavailable";
pub const UNAVAILABLE_LATEST: &str = "Latest forecast unavailable";

/// Five-step temperature class of one forecast day, coldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TempClass {
    VeryCold,
    Cold,
    Medium,
    Hot,
    VeryHot,
}

impl TempClass {
    /// Buckets a day signal in `[-1, 1]`.
    ///
    /// | signal            | class     |
    /// |-------------------|-----------|
    /// | `<= -0.75`        | very cold |
    /// | `(-0.75, -0.25]`  | cold      |
    /// | `(-0.25, 0.25)`   | medium    |
    /// | `[0.25, 0.75)`    | hot       |
    /// | `>= 0.75`         | very hot  |
    pub fn from_signal(signal: f64) -> Self {
        match signal {
            s if s <= -0.75 => TempClass::VeryCold,
            s if s <= -0.25 => TempClass::Cold,
            s if s < 0.25 => TempClass::Medium,
            s if s < 0.75 => TempClass::Hot,
            _ => TempClass::VeryHot,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TempClass::VeryCold => "very cold",
            TempClass::Cold => "cold",
            TempClass::Medium => "medium",
            TempClass::Hot => "hot",
            TempClass::VeryHot => "very hot",
        }
    }
}

impl Serialize for TempClass {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl fmt::Display for TempClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One forecast day, derived from its two sub-region classifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub forecast_day: u8,
    pub valid_time: DateTime<Utc>,
    pub temp_signal: f64,
    pub temp_class: TempClass,
    pub model_run: DateTime<Utc>,
}

/// Builds the ordered 16-day sequence. Missing indices count as neutral.
pub fn build_day_records(
    results: &HashMap<ForecastIndex, ClassificationResult>,
    run: ModelRun,
) -> Vec<DayRecord> {
    let signal_of = |index: ForecastIndex| {
        results
            .get(&index)
            .copied()
            .unwrap_or_else(ClassificationResult::unavailable)
            .signal
    };

    (FIRST_DAY..=LAST_DAY)
        .filter_map(|day| day_indices(day).map(|pair| (day, pair)))
        .map(|(day, (n1, n2))| {
            let temp_signal = (f64::from(signal_of(n1)) + f64::from(signal_of(n2))) / 2.0;
            DayRecord {
                forecast_day: day,
                valid_time: run.valid_time(day),
                temp_signal,
                temp_class: TempClass::from_signal(temp_signal),
                model_run: run.time(),
            }
        })
        .collect()
}

/// Most frequent class in `days` with its count.
///
/// Ties go to the class that appears first in day order.
pub fn majority(days: &[DayRecord]) -> Option<(TempClass, usize)> {
    let mut order: Vec<TempClass> = Vec::new();
    let mut counts: HashMap<TempClass, usize> = HashMap::new();

    for d in days {
        let count = counts.entry(d.temp_class).or_insert(0);
        if *count == 0 {
            order.push(d.temp_class);
        }
        *count += 1;
    }

    let mut best: Option<(TempClass, usize)> = None;
    for class in order {
        let count = counts[&class];
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((class, count));
        }
    }
    best
}

/// Headline facts over the forecast horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimeSummary {
    pub day1_class: TempClass,
    pub week_majority: TempClass,
    pub week_count: usize,
    pub range_majority: TempClass,
    pub range_count: usize,
    pub last_day_class: TempClass,
}

impl RegimeSummary {
    /// Derives the summary from a complete 16-day sequence.
    pub fn from_days(days: &[DayRecord]) -> Result<Self, AggregateError> {
        if days.is_empty() {
            return Err(AggregateError::NoDays);
        }
        if days.len() != HORIZON_DAYS {
            return Err(AggregateError::IncompleteHorizon { got: days.len() });
        }

        let (week_majority, week_count) =
            majority(&days[WEEK_WINDOW]).ok_or(AggregateError::NoDays)?;
        let (range_majority, range_count) =
            majority(&days[RANGE_WINDOW]).ok_or(AggregateError::NoDays)?;

        Ok(Self {
            day1_class: days[0].temp_class,
            week_majority,
            week_count,
            range_majority,
            range_count,
            last_day_class: days[days.len() - 1].temp_class,
        })
    }

    /// `(week_majority, range_majority, week_count, range_count, last_day, day1)`
    pub fn as_tuple(&self) -> (TempClass, TempClass, usize, usize, TempClass, TempClass) {
        (
            self.week_majority,
            self.range_majority,
            self.week_count,
            self.range_count,
            self.last_day_class,
            self.day1_class,
        )
    }

    pub fn outlook(&self) -> String {
        format!(
            "The weather for the next week is expected to be {} for {} days. After that will experience {} for {} days. ",
            self.week_majority.label().to_uppercase(),
            self.week_count,
            self.range_majority.label().to_uppercase(),
            self.range_count,
        )
    }

    pub fn latest(&self) -> String {
        format!(
            "The latest forecast is {}.",
            self.last_day_class.label().to_uppercase()
        )
    }
}

/// Narrative pair plus the structured facts, when they could be derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub outlook: String,
    pub latest: String,
    pub summary: Option<RegimeSummary>,
    pub days: Vec<DayRecord>,
}

impl WeatherReport {
    /// The fixed fallback pair used when no summary can be derived.
    pub fn unavailable() -> Self {
        Self {
            outlook: UNAVAILABLE_REPORT.to_string(),
            latest: UNAVAILABLE_LATEST.to_string(),
            summary: None,
            days: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.summary.is_some()
    }
}

/// Summarizes `days`; never fails, falling back to [`WeatherReport::unavailable`].
pub fn weather_report(days: Vec<DayRecord>) -> WeatherReport {
    match RegimeSummary::from_days(&days) {
        Ok(summary) => {
            info!(
                day1 = %summary.day1_class,
                week = %summary.week_majority,
                week_count = summary.week_count,
                range = %summary.range_majority,
                range_count = summary.range_count,
                last_day = %summary.last_day_class,
                "Regime summary"
            );
            WeatherReport {
                outlook: summary.outlook(),
                latest: summary.latest(),
                summary: Some(summary),
                days,
            }
        }
        Err(e) => {
            warn!(error = %e, "Regime aggregation failed");
            WeatherReport::unavailable()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{AvgRgb, ThermalClass};
    use crate::forecast::horizon_indices;

    fn run() -> ModelRun {
        let t = DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        ModelRun::new(t).unwrap()
    }

    fn reading(signal: i8) -> ClassificationResult {
        let classification = match signal {
            1 => ThermalClass::Hot,
            -1 => ThermalClass::Cold,
            _ => ThermalClass::Neutral,
        };
        ClassificationResult {
            avg_rgb: Some(AvgRgb::new(0, 0, 0)),
            classification,
            signal,
        }
    }

    fn days_from_classes(classes: &[TempClass]) -> Vec<DayRecord> {
        classes
            .iter()
            .enumerate()
            .map(|(i, &c)| DayRecord {
                forecast_day: i as u8 + 1,
                valid_time: run().valid_time(i as u8 + 1),
                temp_signal: 0.0,
                temp_class: c,
                model_run: run().time(),
            })
            .collect()
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(TempClass::from_signal(-1.0), TempClass::VeryCold);
        assert_eq!(TempClass::from_signal(-0.75), TempClass::VeryCold);
        assert_eq!(TempClass::from_signal(-0.5), TempClass::Cold);
        assert_eq!(TempClass::from_signal(-0.25), TempClass::Cold);
        assert_eq!(TempClass::from_signal(0.0), TempClass::Medium);
        assert_eq!(TempClass::from_signal(0.25), TempClass::Hot);
        assert_eq!(TempClass::from_signal(0.5), TempClass::Hot);
        assert_eq!(TempClass::from_signal(0.75), TempClass::VeryHot);
        assert_eq!(TempClass::from_signal(1.0), TempClass::VeryHot);
    }

    #[test]
    fn test_every_signal_pair_maps_to_one_class() {
        for s1 in [-1i8, 0, 1] {
            for s2 in [-1i8, 0, 1] {
                let signal = (f64::from(s1) + f64::from(s2)) / 2.0;
                let expected = match s1 + s2 {
                    -2 => TempClass::VeryCold,
                    -1 => TempClass::Cold,
                    0 => TempClass::Medium,
                    1 => TempClass::Hot,
                    _ => TempClass::VeryHot,
                };
                assert_eq!(TempClass::from_signal(signal), expected, "{s1},{s2}");
            }
        }
    }

    #[test]
    fn test_missing_indices_default_to_neutral() {
        let days = build_day_records(&HashMap::new(), run());
        assert_eq!(days.len(), 16);
        assert!(days.iter().all(|d| d.temp_signal == 0.0));
        assert!(days.iter().all(|d| d.temp_class == TempClass::Medium));
    }

    #[test]
    fn test_days_are_ordered_and_timed() {
        let results: HashMap<_, _> = horizon_indices()
            .into_iter()
            .map(|n| (n, reading(1)))
            .collect();
        let days = build_day_records(&results, run());

        let numbers: Vec<u8> = days.iter().map(|d| d.forecast_day).collect();
        assert_eq!(numbers, (1..=16).collect::<Vec<u8>>());
        assert_eq!(days[0].valid_time, run().valid_time(1));
        assert_eq!(days[15].valid_time, run().valid_time(16));
        assert!(days.iter().all(|d| d.temp_class == TempClass::VeryHot));
    }

    #[test]
    fn test_half_signal_from_one_region() {
        let mut results = HashMap::new();
        results.insert(ForecastIndex(2), reading(-1));
        results.insert(ForecastIndex(4), reading(0));
        let days = build_day_records(&results, run());
        assert_eq!(days[0].temp_signal, -0.5);
        assert_eq!(days[0].temp_class, TempClass::Cold);
    }

    #[test]
    fn test_majority_tie_prefers_first_seen() {
        use TempClass::*;
        let days = days_from_classes(&[Hot, Cold, Cold, Hot]);
        assert_eq!(majority(&days), Some((Hot, 2)));

        let days = days_from_classes(&[Medium, Cold, Cold, Hot]);
        assert_eq!(majority(&days), Some((Cold, 2)));
    }

    #[test]
    fn test_majority_empty() {
        assert_eq!(majority(&[]), None);
    }

    #[test]
    fn test_summary_windows() {
        use TempClass::*;
        let days = days_from_classes(&[
            Medium, Cold, Cold, Medium, Cold, Cold, Cold, // week
            Hot, Hot, Medium, Hot, VeryHot, Hot, Medium, Hot, VeryHot, // range
        ]);
        let summary = RegimeSummary::from_days(&days).unwrap();

        assert_eq!(summary.day1_class, Medium);
        assert_eq!((summary.week_majority, summary.week_count), (Cold, 5));
        assert_eq!((summary.range_majority, summary.range_count), (Hot, 5));
        assert_eq!(summary.last_day_class, VeryHot);
        assert_eq!(summary.as_tuple(), (Cold, Hot, 5, 5, VeryHot, Medium));

        assert!(summary.outlook().contains("COLD for 5 days"));
        assert!(summary.outlook().contains("HOT for 5 days"));
        assert_eq!(summary.latest(), "The latest forecast is VERY HOT.");
    }

    #[test]
    fn test_report_falls_back_when_empty() {
        let report = weather_report(Vec::new());
        assert!(!report.is_available());
        assert_eq!(report.outlook, UNAVAILABLE_REPORT);
        assert_eq!(report.latest, UNAVAILABLE_LATEST);
    }

    #[test]
    fn test_report_rejects_short_horizon() {
        let days = days_from_classes(&[TempClass::Cold; 5]);
        assert_eq!(
            RegimeSummary::from_days(&days),
            Err(AggregateError::IncompleteHorizon { got: 5 })
        );
        assert!(!weather_report(days).is_available());
    }

    #[test]
    fn test_temp_class_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&TempClass::VeryCold).unwrap(),
            "\"very cold\""
        );
        assert_eq!(serde_json::to_string(&TempClass::Hot).unwrap(), "\"hot\"");
    }
}
