use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::geometry;
use crate::id_generator::generate_id;
use crate::measurement::{mm_to_plan, plan_to_mm};
use crate::placement::{CatalogItem, DEFAULT_OBJECT_COLOR};

pub const DEFAULT_WALL_THICKNESS_PX: f32 = 8.0;
pub const DEFAULT_WALL_COLOR: &str = "#374151";
pub const DEFAULT_ROOM_COLOR: &str = "#dbeafe";
pub const DEFAULT_DOOR_WIDTH_MM: f32 = 900.0;
pub const DEFAULT_TEXT: &str = "Text";
pub const DEFAULT_FONT_SIZE: f32 = 16.0;
pub const DEFAULT_TEXT_COLOR: &str = "#111827";

fn default_object_scale() -> f32 {
    1.0
}

fn default_object_color() -> String {
    DEFAULT_OBJECT_COLOR.to_owned()
}

fn default_wall_thickness() -> f32 {
    DEFAULT_WALL_THICKNESS_PX
}

fn default_wall_color() -> String {
    DEFAULT_WALL_COLOR.to_owned()
}

fn default_room_color() -> String {
    DEFAULT_ROOM_COLOR.to_owned()
}

fn default_door_width() -> f32 {
    DEFAULT_DOOR_WIDTH_MM
}

fn default_text() -> String {
    DEFAULT_TEXT.to_owned()
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_owned()
}

/// Physical footprint of a placed object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_mm: f32,
    pub width_mm: f32,
}

/// A piece of catalog equipment placed on the plan.
///
/// `position` is the object's center; rotation and scale are applied about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedObject {
    pub id: String,
    pub position: Pos2,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_object_scale")]
    pub scale: f32,
    pub dimensions: Dimensions,
    #[serde(default = "default_object_color")]
    pub color: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub source_descriptor: Option<CatalogItem>,
}

impl PlacedObject {
    /// Footprint in scene pixels
    pub fn size_px(&self) -> Vec2 {
        Vec2::new(
            mm_to_plan(self.dimensions.length_mm),
            mm_to_plan(self.dimensions.width_mm),
        ) * self.scale
    }

    pub fn corners(&self) -> [Pos2; 4] {
        geometry::rotated_rect_corners(self.position, self.size_px(), self.rotation)
    }

    /// Axis-aligned box around the rotated footprint
    pub fn bounding_box(&self) -> Rect {
        geometry::calculate_bounds(&self.corners(), 0.0)
    }

    pub fn contains(&self, point: Pos2) -> bool {
        geometry::rotated_rect_contains(self.position, self.size_px(), self.rotation, point)
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.source_descriptor
            .as_ref()
            .and_then(|item| item.thumbnail_url.as_deref())
    }
}

/// A straight wall between two scene points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallSegment {
    pub id: String,
    pub start: Pos2,
    pub end: Pos2,
    /// Stroke thickness in screen pixels
    #[serde(
        rename = "thickness_px",
        alias = "thickness",
        default = "default_wall_thickness"
    )]
    pub thickness_px: f32,
    #[serde(default = "default_wall_color")]
    pub color: String,
}

impl WallSegment {
    /// A zero-length wall anchored at `point`, as created when drawing starts.
    pub fn starting_at(point: Pos2) -> Self {
        Self {
            id: generate_id("wall"),
            start: point,
            end: point,
            thickness_px: DEFAULT_WALL_THICKNESS_PX,
            color: DEFAULT_WALL_COLOR.to_owned(),
        }
    }

    pub fn length_px(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn length_mm(&self) -> f32 {
        plan_to_mm(self.length_px())
    }

    pub fn midpoint(&self) -> Pos2 {
        self.start.lerp(self.end, 0.5)
    }

    pub fn angle(&self) -> f32 {
        let d = self.end - self.start;
        d.y.atan2(d.x)
    }

    /// Whether `point` lies on the wall, within `tolerance` scene pixels or
    /// half the stroke at the given zoom, whichever is larger.
    pub fn contains(&self, point: Pos2, tolerance: f32, zoom: f32) -> bool {
        geometry::distance_to_segment(point, self.start, self.end)
            <= (self.thickness_px / 2.0 / zoom).max(tolerance)
    }
}

/// A closed room outline with measurements frozen at completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub points: Vec<Pos2>,
    /// Enclosed area in mm²
    #[serde(rename = "area_mm2", alias = "area", default)]
    pub area_mm2: f32,
    /// Perimeter in mm
    #[serde(rename = "perimeter_mm", alias = "perimeter", default)]
    pub perimeter_mm: f32,
    #[serde(default = "default_room_color")]
    pub color: String,
}

impl Room {
    /// Close `points` into a room, or `None` when fewer than three
    /// vertices were collected.
    pub fn close(name: String, points: Vec<Pos2>) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let mut room = Self {
            id: generate_id("room"),
            name,
            points,
            area_mm2: 0.0,
            perimeter_mm: 0.0,
            color: DEFAULT_ROOM_COLOR.to_owned(),
        };
        room.measure();
        Some(room)
    }

    /// Recompute area and perimeter from the outline.
    pub fn measure(&mut self) {
        let mm_per_px = plan_to_mm(1.0);
        self.area_mm2 = geometry::polygon_area(&self.points) * mm_per_px * mm_per_px;
        self.perimeter_mm = plan_to_mm(geometry::polygon_perimeter(&self.points));
    }

    pub fn label_position(&self) -> Option<Pos2> {
        geometry::polygon_centroid(&self.points)
    }

    pub fn contains(&self, point: Pos2) -> bool {
        geometry::point_in_polygon(point, &self.points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingDirection {
    #[default]
    Inward,
    Outward,
}

/// A door: hinge at `position`, leaf pointing along `rotation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Door {
    pub id: String,
    pub position: Pos2,
    #[serde(default)]
    pub rotation: f32,
    /// Leaf width in mm
    #[serde(rename = "width_mm", alias = "width", default = "default_door_width")]
    pub width_mm: f32,
    #[serde(default)]
    pub swing_direction: SwingDirection,
    /// Non-owning reference to the wall this door sits in
    #[serde(default)]
    pub wall_segment_id: Option<String>,
    /// Offset along the wall from its start, in mm
    #[serde(default)]
    pub wall_position: f32,
    #[serde(default)]
    pub is_embedded: bool,
}

impl Door {
    pub fn at(position: Pos2) -> Self {
        Self {
            id: generate_id("door"),
            position,
            rotation: 0.0,
            width_mm: DEFAULT_DOOR_WIDTH_MM,
            swing_direction: SwingDirection::Inward,
            wall_segment_id: None,
            wall_position: 0.0,
            is_embedded: false,
        }
    }

    /// Leaf length in scene pixels
    pub fn width_px(&self) -> f32 {
        mm_to_plan(self.width_mm)
    }

    /// Start and end angles of the quarter-circle swing
    pub fn swing_angles(&self) -> (f32, f32) {
        let sweep = match self.swing_direction {
            SwingDirection::Inward => std::f32::consts::FRAC_PI_2,
            SwingDirection::Outward => -std::f32::consts::FRAC_PI_2,
        };
        (self.rotation, self.rotation + sweep)
    }

    pub fn contains(&self, point: Pos2) -> bool {
        self.position.distance(point) <= self.width_px()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    pub id: String,
    pub position: Pos2,
    #[serde(default = "default_text")]
    pub text: String,
    /// Screen font size; labels do not grow with zoom
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_text_color")]
    pub color: String,
}

impl TextAnnotation {
    pub fn placeholder(position: Pos2) -> Self {
        Self {
            id: generate_id("text"),
            position,
            text: DEFAULT_TEXT.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_TEXT_COLOR.to_owned(),
        }
    }

    /// Approximate label box in scene coordinates at the given zoom,
    /// centered on `position`
    pub fn bounds(&self, zoom: f32) -> Rect {
        let width = self.text.chars().count().max(1) as f32 * self.font_size * 0.6;
        Rect::from_center_size(self.position, Vec2::new(width, self.font_size) / zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_needs_three_points() {
        let points = vec![Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0)];
        assert!(Room::close("Lab".into(), points).is_none());
    }

    #[test]
    fn test_room_measurements() {
        let points = vec![
            Pos2::new(0.0, 0.0),
            Pos2::new(100.0, 0.0),
            Pos2::new(0.0, 100.0),
        ];
        let room = Room::close("Lab".into(), points).unwrap();
        assert!((room.area_mm2 - 5_000.0).abs() < 1e-2);
        assert!((room.perimeter_mm - (200.0 + 100.0 * std::f32::consts::SQRT_2)).abs() < 1e-2);
    }

    #[test]
    fn test_wall_length_in_mm() {
        let mut wall = WallSegment::starting_at(Pos2::new(0.0, 0.0));
        wall.end = Pos2::new(30.0, 40.0);
        assert_eq!(wall.length_px(), 50.0);
        assert_eq!(wall.length_mm(), 50.0);
    }

    #[test]
    fn test_wall_hit_widens_when_zoomed_out() {
        let mut wall = WallSegment::starting_at(Pos2::new(0.0, 0.0));
        wall.end = Pos2::new(100.0, 0.0);
        // Half of an 8 px stroke is 8 scene px at half zoom
        assert!(!wall.contains(Pos2::new(50.0, 7.0), 1.0, 1.0));
        assert!(wall.contains(Pos2::new(50.0, 7.0), 1.0, 0.5));
    }

    #[test]
    fn test_cosmetic_fields_default() {
        let wall: WallSegment = serde_json::from_str(
            r#"{"id": "wall-1", "start": {"x": 0.0, "y": 0.0}, "end": {"x": 5.0, "y": 0.0}}"#,
        )
        .unwrap();
        assert_eq!(wall.thickness_px, DEFAULT_WALL_THICKNESS_PX);
        assert_eq!(wall.color, DEFAULT_WALL_COLOR);

        let text: TextAnnotation =
            serde_json::from_str(r#"{"id": "text-1", "position": {"x": 1.0, "y": 2.0}}"#).unwrap();
        assert_eq!(text.text, DEFAULT_TEXT);
        assert_eq!(text.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_door_swing_direction() {
        let mut door = Door::at(Pos2::ZERO);
        let (start, end) = door.swing_angles();
        assert!(end > start);
        door.swing_direction = SwingDirection::Outward;
        let (start, end) = door.swing_angles();
        assert!(end < start);
    }
}
