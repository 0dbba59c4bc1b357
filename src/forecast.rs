//! Forecast-day ↔ image-index mapping for the GFS 2m temperature anomaly set.
//!
//! The model publishes one image per (sub-region, day) slot. Two sub-region
//! images make up one forecast day: `n1 = 2 + (day - 1) * 4` and `n2 = n1 + 2`.

use std::fmt;

/// First and last forecast day in the published horizon.
pub const FIRST_DAY: u8 = 1;
pub const LAST_DAY: u8 = 16;

/// Number of days in the horizon.
pub const HORIZON_DAYS: usize = (LAST_DAY - FIRST_DAY + 1) as usize;

/// Identifies one image slot in the model's naming scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForecastIndex(pub u32);

impl fmt::Display for ForecastIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns the two sub-region indices for a forecast day.
///
/// Returns `None` outside `1..=16`.
pub fn day_indices(day: u8) -> Option<(ForecastIndex, ForecastIndex)> {
    if !(FIRST_DAY..=LAST_DAY).contains(&day) {
        return None;
    }
    let n1 = 2 + (u32::from(day) - 1) * 4;
    Some((ForecastIndex(n1), ForecastIndex(n1 + 2)))
}

/// All indices for the full horizon, in day order.
pub fn horizon_indices() -> Vec<ForecastIndex> {
    (FIRST_DAY..=LAST_DAY)
        .filter_map(day_indices)
        .flat_map(|(a, b)| [a, b])
        .collect()
}

/// Builds the image URL for an index under `base_url`.
pub fn image_url(base_url: &str, index: ForecastIndex) -> String {
    format!(
        "{}/gfs_2m_aTemperatures_{}.png",
        base_url.trim_end_matches('/'),
        index
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_day_one_and_last_day() {
        assert_eq!(day_indices(1), Some((ForecastIndex(2), ForecastIndex(4))));
        assert_eq!(day_indices(16), Some((ForecastIndex(62), ForecastIndex(64))));
    }

    #[test]
    fn test_out_of_range_days() {
        assert_eq!(day_indices(0), None);
        assert_eq!(day_indices(17), None);
    }

    #[test]
    fn test_horizon_is_bijective_onto_even_indices() {
        let indices = horizon_indices();
        assert_eq!(indices.len(), 32);

        let unique: HashSet<_> = indices.iter().copied().collect();
        assert_eq!(unique.len(), 32);

        let expected: HashSet<_> = (1..=32).map(|k| ForecastIndex(k * 2)).collect();
        assert_eq!(unique, expected);
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("https://host/modelData/images/2m/", ForecastIndex(6)),
            "https://host/modelData/images/2m/gfs_2m_aTemperatures_6.png"
        );
    }
}
