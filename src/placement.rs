use egui::Pos2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::id_generator::generate_id;
use crate::scene::{Dimensions, PlacedObject};
use crate::view::ViewState;

pub const DEFAULT_OBJECT_COLOR: &str = "#9ca3af";

/// Dimensions as supplied by the catalog; either side may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDimensions {
    #[serde(default)]
    pub length_mm: Option<f32>,
    #[serde(default)]
    pub width_mm: Option<f32>,
}

/// Product descriptor handed over by the external catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub dimensions: Option<CatalogDimensions>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl CatalogItem {
    /// Both dimensions, when present and positive
    pub fn footprint(&self) -> Option<Dimensions> {
        let dims = self.dimensions?;
        let (length_mm, width_mm) = (dims.length_mm?, dims.width_mm?);
        (length_mm > 0.0 && width_mm > 0.0).then_some(Dimensions {
            length_mm,
            width_mm,
        })
    }
}

/// Turn a drop at `screen_point` into a new placed object centred there,
/// undoing the view's scale and pan.
///
/// Returns `None` when the descriptor does not carry usable dimensions.
pub fn resolve_drop(
    screen_point: Pos2,
    view: &ViewState,
    item: &CatalogItem,
) -> Option<PlacedObject> {
    let Some(dimensions) = item.footprint() else {
        warn!("Ignoring drop of {}: missing dimensions", item.id);
        return None;
    };

    let position = view.screen_to_scene(screen_point);
    debug!("Dropped {} at {:?}", item.name, position);

    Some(PlacedObject {
        id: generate_id("obj"),
        position,
        rotation: 0.0,
        scale: 1.0,
        dimensions,
        color: item
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_OBJECT_COLOR.to_owned()),
        name: item.name.clone(),
        category: item.category.clone(),
        source_descriptor: Some(item.clone()),
    })
}
