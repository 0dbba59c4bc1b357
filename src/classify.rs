//! Thermal classification of a temperature-anomaly image.
//!
//! Two independent heuristics run on the whole-image mean colour: a red/blue
//! dominance test in RGB and a hue-band test in HSV. The final call is HOT or
//! COLD only when both agree; anything else is NEUTRAL with signal 0.

use image::{DynamicImage, RgbImage};
use serde::Serialize;
use std::fmt;

use crate::error::ClassifyError;

/// Default red/blue dominance margin on the 0–255 scale.
pub const DEFAULT_DOMINANCE_THRESHOLD: u8 = 20;

/// Hue band (degrees, inclusive) read as cold.
const COLD_HUE: (f64, f64) = (200.0, 260.0);
/// Hue at or below which, or at or above `HOT_HUE_HIGH`, is read as hot.
const HOT_HUE_LOW: f64 = 30.0;
const HOT_HUE_HIGH: f64 = 330.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThermalClass {
    Hot,
    Cold,
    Neutral,
}

impl ThermalClass {
    /// Directional signal: +1 hot, -1 cold, 0 neutral.
    pub fn signal(self) -> i8 {
        match self {
            ThermalClass::Hot => 1,
            ThermalClass::Cold => -1,
            ThermalClass::Neutral => 0,
        }
    }
}

impl fmt::Display for ThermalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThermalClass::Hot => "HOT",
            ThermalClass::Cold => "COLD",
            ThermalClass::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

/// Whole-image channel means, truncated to integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvgRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl AvgRgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hue in degrees `[0, 360)`. Achromatic colours have hue 0.
    pub fn hue(&self) -> f64 {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        if max == min {
            return 0.0;
        }

        let span = max - min;
        let rc = (max - r) / span;
        let gc = (max - g) / span;
        let bc = (max - b) / span;

        let h = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };

        (h / 6.0).rem_euclid(1.0) * 360.0
    }
}

/// Result of classifying one image, or the sentinel for an unavailable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    /// `None` for the unavailable sentinel.
    pub avg_rgb: Option<AvgRgb>,
    pub classification: ThermalClass,
    pub signal: i8,
}

impl ClassificationResult {
    /// Neutral stand-in for an image that could not be fetched or decoded.
    pub fn unavailable() -> Self {
        Self {
            avg_rgb: None,
            classification: ThermalClass::Neutral,
            signal: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.avg_rgb.is_some()
    }
}

/// Red/blue dominance test.
pub fn rgb_heuristic(avg: AvgRgb, threshold: u8) -> ThermalClass {
    let (r, b, t) = (i32::from(avg.r), i32::from(avg.b), i32::from(threshold));
    if r > b + t {
        ThermalClass::Hot
    } else if b > r + t {
        ThermalClass::Cold
    } else {
        ThermalClass::Neutral
    }
}

/// Hue-band test. The hot band wraps through red.
pub fn hue_heuristic(avg: AvgRgb) -> ThermalClass {
    let hue = avg.hue();
    if (COLD_HUE.0..=COLD_HUE.1).contains(&hue) {
        ThermalClass::Cold
    } else if hue <= HOT_HUE_LOW || hue >= HOT_HUE_HIGH {
        ThermalClass::Hot
    } else {
        ThermalClass::Neutral
    }
}

/// Applies both heuristics and the consensus rule to a mean colour.
pub fn classify_avg(avg: AvgRgb, threshold: u8) -> ClassificationResult {
    let by_rgb = rgb_heuristic(avg, threshold);
    let by_hue = hue_heuristic(avg);

    let classification = if by_rgb == by_hue {
        by_rgb
    } else {
        ThermalClass::Neutral
    };

    ClassificationResult {
        avg_rgb: Some(avg),
        classification,
        signal: classification.signal(),
    }
}

/// Mean of each channel over every pixel.
pub fn mean_rgb(img: &RgbImage) -> Result<AvgRgb, ClassifyError> {
    let count = u64::from(img.width()) * u64::from(img.height());
    if count == 0 {
        return Err(ClassifyError::Empty);
    }

    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for px in img.pixels() {
        r += u64::from(px[0]);
        g += u64::from(px[1]);
        b += u64::from(px[2]);
    }

    // Each quotient is at most 255.
    Ok(AvgRgb::new(
        (r / count) as u8,
        (g / count) as u8,
        (b / count) as u8,
    ))
}

pub fn classify_image(img: &DynamicImage, threshold: u8) -> Result<ClassificationResult, ClassifyError> {
    let rgb = img.to_rgb8();
    let avg = mean_rgb(&rgb)?;
    Ok(classify_avg(avg, threshold))
}

/// Decodes PNG/JPEG bytes and classifies the result.
pub fn classify_bytes(bytes: &[u8], threshold: u8) -> Result<ClassificationResult, ClassifyError> {
    let img = image::load_from_memory(bytes)?;
    classify_image(&img, threshold)
}
