//! Conversion between real-world millimeters and on-screen pixels.
//!
//! `scale` is always expressed in pixels per millimeter.

use serde::{Deserialize, Serialize};

/// Pixels per millimeter of stored scene geometry. The view scale zooms
/// relative to this, so stored lengths keep their real-world size.
pub const PLAN_SCALE: f32 = 1.0;

/// Convert a length in millimeters to pixels at the given scale.
pub fn to_pixels(value_mm: f32, scale: f32) -> f32 {
    value_mm * scale
}

/// Convert a length in pixels to millimeters at the given scale.
pub fn to_mm(value_px: f32, scale: f32) -> f32 {
    value_px / scale
}

/// Length of stored scene geometry in millimeters.
pub fn plan_to_mm(value_px: f32) -> f32 {
    to_mm(value_px, PLAN_SCALE)
}

/// Millimeters as a length in stored scene geometry.
pub fn mm_to_plan(value_mm: f32) -> f32 {
    to_pixels(value_mm, PLAN_SCALE)
}

/// Pixel step between grid lines for a grid size given in millimeters.
pub fn grid_step_px(grid_size_mm: f32, scale: f32) -> f32 {
    to_pixels(grid_size_mm, scale)
}

/// Display unit for measurement labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnit {
    #[default]
    Mm,
    Cm,
    M,
}

impl MeasurementUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Cm => "cm",
            Self::M => "m",
        }
    }

    /// Millimeters per one of this unit
    fn divisor(self) -> f32 {
        match self {
            Self::Mm => 1.0,
            Self::Cm => 10.0,
            Self::M => 1000.0,
        }
    }

    /// Next unit in the mm → cm → m cycle, used by the unit toggle.
    pub fn next(self) -> Self {
        match self {
            Self::Mm => Self::Cm,
            Self::Cm => Self::M,
            Self::M => Self::Mm,
        }
    }
}

/// How a millimeter value is rendered as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasurementFormat {
    pub unit: MeasurementUnit,
    /// Number of decimal places
    pub precision: usize,
    pub show_unit: bool,
}

impl MeasurementFormat {
    pub fn new(unit: MeasurementUnit, precision: usize) -> Self {
        Self {
            unit,
            precision,
            show_unit: true,
        }
    }
}

/// Format a millimeter value in the requested unit with fixed precision.
pub fn format_measurement(value_mm: f32, format: &MeasurementFormat) -> String {
    let value = value_mm / format.unit.divisor();
    if format.show_unit {
        format!("{:.*} {}", format.precision, value, format.unit.suffix())
    } else {
        format!("{:.*}", format.precision, value)
    }
}

/// Format an area given in mm², always in the square of the display unit.
pub fn format_area(area_mm2: f32, format: &MeasurementFormat) -> String {
    let divisor = format.unit.divisor();
    let value = area_mm2 / (divisor * divisor);
    if format.show_unit {
        format!("{:.*} {}²", format.precision, value, format.unit.suffix())
    } else {
        format!("{:.*}", format.precision, value)
    }
}
