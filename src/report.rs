//! Surfaces consumed by downstream collaborators: the coarse weather regime
//! handed to the pricing model and the `weather_forecast` payload section
//! handed to the commentary generator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::regime::{RegimeSummary, WeatherReport};
use crate::run::ModelRun;

/// Regime parameter expected by the pricing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherRegime {
    Cold,
    Neutral,
    Warm,
}

impl WeatherRegime {
    /// Reads a regime out of a free-text weather summary.
    ///
    /// "COLD" anywhere (case-insensitive) wins over "HOT"; neither is neutral.
    pub fn detect(summary: &str) -> Self {
        let summary = summary.to_uppercase();
        if summary.contains("COLD") {
            WeatherRegime::Cold
        } else if summary.contains("HOT") {
            WeatherRegime::Warm
        } else {
            WeatherRegime::Neutral
        }
    }
}

impl fmt::Display for WeatherRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WeatherRegime::Cold => "cold",
            WeatherRegime::Neutral => "neutral",
            WeatherRegime::Warm => "warm",
        };
        f.write_str(s)
    }
}

/// The `weather_forecast` section of the market report payload.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherForecastSection {
    pub generated_at: DateTime<Utc>,
    pub model_run: ModelRun,
    pub short_term_outlook: String,
    pub latest_forecast_status: String,
    /// Sentence for the last day of the horizon.
    pub extended_outlook: String,
    pub detected_weather_regime: WeatherRegime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RegimeSummary>,
}

impl WeatherForecastSection {
    pub fn from_report(report: &WeatherReport, run: ModelRun) -> Self {
        Self {
            generated_at: Utc::now(),
            model_run: run,
            short_term_outlook: report.outlook.clone(),
            latest_forecast_status: report.latest.clone(),
            extended_outlook: report.latest.clone(),
            detected_weather_regime: WeatherRegime::detect(&report.outlook),
            summary: report.summary.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::{UNAVAILABLE_LATEST, UNAVAILABLE_REPORT};

    #[test]
    fn test_detect_cold_wins() {
        assert_eq!(
            WeatherRegime::detect("expected to be VERY COLD for 3 days. After that HOT"),
            WeatherRegime::Cold
        );
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(WeatherRegime::detect("very hot spell"), WeatherRegime::Warm);
        assert_eq!(WeatherRegime::detect("a cold snap"), WeatherRegime::Cold);
    }

    #[test]
    fn test_detect_defaults_to_neutral() {
        assert_eq!(WeatherRegime::detect(UNAVAILABLE_REPORT), WeatherRegime::Neutral);
        assert_eq!(
            WeatherRegime::detect("expected to be MEDIUM for 7 days"),
            WeatherRegime::Neutral
        );
    }

    #[test]
    fn test_section_serializes_regime_lowercase() {
        let run = ModelRun::new(
            DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
        .unwrap();
        let report = WeatherReport::unavailable();
        let section = WeatherForecastSection::from_report(&report, run);

        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["detected_weather_regime"], "neutral");
        assert_eq!(json["short_term_outlook"], UNAVAILABLE_REPORT);
        assert_eq!(json["latest_forecast_status"], UNAVAILABLE_LATEST);
        assert_eq!(json["extended_outlook"], UNAVAILABLE_LATEST);
        assert!(json.get("summary").is_none());
    }
}
