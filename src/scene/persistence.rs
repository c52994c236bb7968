//! JSON save/load of a floor plan.
//!
//! Loading is lenient: a missing or malformed collection becomes empty, a
//! malformed element is skipped, and everything well-formed still loads.

use std::fs;
use std::path::Path;

use egui::{Pos2, Vec2};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Scene;
use crate::error::PersistenceResult;
use crate::view::{DEFAULT_SCALE, ViewState};

/// The on-disk shape of a floor plan: scene, in-progress room buffer and
/// the view it was saved with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    #[serde(flatten)]
    pub scene: Scene,
    pub room_points: Vec<Pos2>,
    pub scale: f32,
    pub offset: Vec2,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            scene: Scene::default(),
            room_points: Vec::new(),
            scale: DEFAULT_SCALE,
            offset: Vec2::ZERO,
        }
    }
}

/// Decode a list element by element, skipping the ones that do not fit.
fn collection<T: DeserializeOwned>(object: &Value, key: &str) -> Vec<T> {
    match object.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                serde_json::from_value(item.clone())
                    .map_err(|err| warn!("Skipping {}[{}] in floor plan: {}", key, index, err))
                    .ok()
            })
            .collect(),
        Some(other) => {
            warn!("Ignoring '{}' in floor plan: expected a list, got {}", key, other);
            Vec::new()
        }
    }
}

fn field<T: DeserializeOwned + Default>(object: &Value, key: &str) -> T {
    match object.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            warn!("Ignoring incompatible '{}' in floor plan: {}", key, err);
            T::default()
        }),
    }
}

impl SceneDocument {
    pub fn new(scene: Scene, room_points: Vec<Pos2>, view: &ViewState) -> Self {
        Self {
            scene,
            room_points,
            scale: view.scale,
            offset: view.offset,
        }
    }

    pub fn view(&self) -> ViewState {
        let mut view = ViewState {
            scale: DEFAULT_SCALE,
            offset: self.offset,
        };
        view.set_scale(self.scale);
        view
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a document from already-parsed JSON. Never fails: anything
    /// unusable falls back to its default.
    pub fn from_value(value: &Value) -> Self {
        let mut scene = Scene {
            rooms: collection(value, "rooms"),
            walls: collection(value, "walls"),
            placed_objects: collection(value, "placedProducts"),
            doors: collection(value, "doors"),
            text_annotations: collection(value, "textAnnotations"),
        };
        scene.rooms.retain_mut(|room| {
            if room.points.len() < 3 {
                warn!("Skipping room {} with {} points", room.id, room.points.len());
                return false;
            }
            if room.area_mm2 <= 0.0 || room.perimeter_mm <= 0.0 {
                room.measure();
            }
            true
        });
        let duplicates = scene.dedup_ids();
        if duplicates > 0 {
            warn!("Dropped {} elements with duplicate ids", duplicates);
        }

        let scale = value
            .get("scale")
            .and_then(Value::as_f64)
            .map(|s| s as f32)
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_SCALE);

        Self {
            scene,
            room_points: collection(value, "roomPoints"),
            scale,
            offset: field(value, "offset"),
        }
    }

    /// Parse JSON text. Only malformed JSON is an error.
    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!("Saved floor plan to {}", path.display());
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let document = Self::from_json(&json)?;
        info!(
            "Loaded floor plan from {} ({} elements)",
            path.display(),
            document.scene.element_count()
        );
        Ok(document)
    }
}
