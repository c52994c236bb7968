use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::measurement::{MeasurementFormat, MeasurementUnit};
use crate::snap::SnapSettings;
use crate::view::DEFAULT_SCALE;

pub const DEFAULT_GRID_SIZE_MM: f32 = 100.0;

/// Session-scoped editor configuration. Never part of the scene or its
/// history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")] // older saved settings get defaults for new fields
pub struct EditorSettings {
    pub snap: SnapSettings,
    pub grid_size_mm: f32,
    pub show_grid: bool,
    pub show_measurements: bool,
    pub measurement_unit: MeasurementUnit,
    pub measurement_precision: usize,
    pub history_capacity: usize,
    /// Pixels per millimeter for a fresh editor
    pub initial_scale: f32,
    /// Outline placed objects whose footprints overlap
    pub overlap_hints: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            snap: SnapSettings::default(),
            grid_size_mm: DEFAULT_GRID_SIZE_MM,
            show_grid: true,
            show_measurements: true,
            measurement_unit: MeasurementUnit::Mm,
            measurement_precision: 0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            initial_scale: DEFAULT_SCALE,
            overlap_hints: true,
        }
    }
}

impl EditorSettings {
    pub fn measurement_format(&self) -> MeasurementFormat {
        MeasurementFormat::new(self.measurement_unit, self.measurement_precision)
    }
}
