//! Scene data model: everything that is drawn on the plan and recorded in
//! undo history. View state (scale, pan offset) lives in [`crate::view`].

use std::collections::HashSet;

use egui::{Pos2, Rect};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::measurement::plan_to_mm;

mod elements;
pub mod geometry;
pub mod persistence;

pub use elements::{
    DEFAULT_DOOR_WIDTH_MM, DEFAULT_FONT_SIZE, DEFAULT_TEXT, DEFAULT_WALL_COLOR,
    DEFAULT_WALL_THICKNESS_PX, Dimensions, Door, PlacedObject, Room, SwingDirection,
    TextAnnotation, WallSegment,
};

/// Screen tolerance used when erasing thin elements such as walls
pub const HIT_TOLERANCE_PX: f32 = 6.0;

/// The kind of collection an element lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Object,
    Wall,
    Room,
    Door,
    Text,
}

/// A borrowed handle to an element found by hit testing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub rooms: Vec<Room>,
    pub walls: Vec<WallSegment>,
    #[serde(rename = "placedProducts")]
    pub placed_objects: Vec<PlacedObject>,
    pub doors: Vec<Door>,
    pub text_annotations: Vec<TextAnnotation>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    pub fn element_count(&self) -> usize {
        self.rooms.len()
            + self.walls.len()
            + self.placed_objects.len()
            + self.doors.len()
            + self.text_annotations.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Take an independent copy of the scene for history
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot(self.clone())
    }

    pub fn restore(&mut self, snapshot: &SceneSnapshot) {
        *self = snapshot.0.clone();
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids().any(|existing| existing == id)
    }

    fn ids(&self) -> impl Iterator<Item = &str> {
        self.rooms
            .iter()
            .map(|r| r.id.as_str())
            .chain(self.walls.iter().map(|w| w.id.as_str()))
            .chain(self.placed_objects.iter().map(|o| o.id.as_str()))
            .chain(self.doors.iter().map(|d| d.id.as_str()))
            .chain(self.text_annotations.iter().map(|t| t.id.as_str()))
    }

    /// Drop later elements that reuse an id already seen. Returns how many
    /// were removed.
    pub fn dedup_ids(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.element_count();
        self.rooms.retain(|r| seen.insert(r.id.clone()));
        self.walls.retain(|w| seen.insert(w.id.clone()));
        self.placed_objects.retain(|o| seen.insert(o.id.clone()));
        self.doors.retain(|d| seen.insert(d.id.clone()));
        self.text_annotations.retain(|t| seen.insert(t.id.clone()));
        before - self.element_count()
    }

    pub fn object(&self, id: &str) -> Option<&PlacedObject> {
        self.placed_objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: &str) -> Option<&mut PlacedObject> {
        self.placed_objects.iter_mut().find(|o| o.id == id)
    }

    pub fn wall(&self, id: &str) -> Option<&WallSegment> {
        self.walls.iter().find(|w| w.id == id)
    }

    pub fn wall_mut(&mut self, id: &str) -> Option<&mut WallSegment> {
        self.walls.iter_mut().find(|w| w.id == id)
    }

    pub fn door(&self, id: &str) -> Option<&Door> {
        self.doors.iter().find(|d| d.id == id)
    }

    /// Top-most placed object under `point`
    pub fn object_at(&self, point: Pos2) -> Option<&PlacedObject> {
        self.placed_objects.iter().rev().find(|o| o.contains(point))
    }

    /// Top-most element of any kind under `point`, in reverse draw order.
    /// `zoom` sizes the screen-fixed parts: label boxes, wall strokes and
    /// the hit tolerance.
    pub fn element_at(&self, point: Pos2, zoom: f32) -> Option<ElementRef> {
        let hit = |kind, id: &String| {
            Some(ElementRef {
                kind,
                id: id.clone(),
            })
        };

        if let Some(t) = self
            .text_annotations
            .iter()
            .rev()
            .find(|t| t.bounds(zoom).contains(point))
        {
            return hit(ElementKind::Text, &t.id);
        }
        if let Some(o) = self.object_at(point) {
            return hit(ElementKind::Object, &o.id);
        }
        if let Some(d) = self.doors.iter().rev().find(|d| d.contains(point)) {
            return hit(ElementKind::Door, &d.id);
        }
        if let Some(w) = self
            .walls
            .iter()
            .rev()
            .find(|w| w.contains(point, HIT_TOLERANCE_PX / zoom, zoom))
        {
            return hit(ElementKind::Wall, &w.id);
        }
        if let Some(r) = self.rooms.iter().rev().find(|r| r.contains(point)) {
            return hit(ElementKind::Room, &r.id);
        }
        None
    }

    /// Remove the element with `id` from whichever collection holds it.
    pub fn remove(&mut self, id: &str) -> Option<ElementKind> {
        fn take<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
            let before = items.len();
            items.retain(|item| !matches(item));
            items.len() != before
        }

        let kind = if take(&mut self.placed_objects, |o| o.id == id) {
            ElementKind::Object
        } else if take(&mut self.walls, |w| w.id == id) {
            ElementKind::Wall
        } else if take(&mut self.doors, |d| d.id == id) {
            ElementKind::Door
        } else if take(&mut self.text_annotations, |t| t.id == id) {
            ElementKind::Text
        } else if take(&mut self.rooms, |r| r.id == id) {
            ElementKind::Room
        } else {
            return None;
        };

        if kind == ElementKind::Wall {
            // Doors only reference walls; they survive with the binding cleared
            for door in self
                .doors
                .iter_mut()
                .filter(|d| d.wall_segment_id.as_deref() == Some(id))
            {
                door.wall_segment_id = None;
                door.is_embedded = false;
            }
        }
        debug!("Removed {:?} {}", kind, id);
        Some(kind)
    }

    /// Pairs of placed objects whose bounding boxes overlap
    pub fn overlapping_objects(&self) -> Vec<(String, String)> {
        let boxes: Vec<(&str, Rect)> = self
            .placed_objects
            .iter()
            .map(|o| (o.id.as_str(), o.bounding_box()))
            .collect();

        let mut pairs = Vec::new();
        for (i, (a_id, a)) in boxes.iter().enumerate() {
            for (b_id, b) in &boxes[i + 1..] {
                // Boxes that only touch along an edge do not overlap
                if a.intersect(*b).is_positive() {
                    pairs.push((a_id.to_string(), b_id.to_string()));
                }
            }
        }
        pairs
    }

    /// Bounding box of every piece of geometry in the scene. Text labels
    /// count as their anchor point, since their size depends on zoom.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points: Vec<Pos2> = Vec::new();
        for room in &self.rooms {
            points.extend(&room.points);
        }
        for wall in &self.walls {
            points.push(wall.start);
            points.push(wall.end);
        }
        for object in &self.placed_objects {
            points.extend(object.corners());
        }
        for door in &self.doors {
            let reach = door.width_px();
            points.push(door.position - egui::Vec2::splat(reach));
            points.push(door.position + egui::Vec2::splat(reach));
        }
        for text in &self.text_annotations {
            points.push(text.position);
        }

        if points.is_empty() {
            None
        } else {
            Some(geometry::calculate_bounds(&points, 0.0))
        }
    }

    /// Bind a door to a wall: the door is moved onto the wall's closest
    /// point, aligned with it and marked as embedded.
    pub fn embed_door_in_wall(
        &mut self,
        door_id: &str,
        wall_id: &str,
    ) -> Result<(), EditorError> {
        let wall = self
            .wall(wall_id)
            .cloned()
            .ok_or_else(|| EditorError::UnknownElement(wall_id.to_owned()))?;
        let door = self
            .doors
            .iter_mut()
            .find(|d| d.id == door_id)
            .ok_or_else(|| EditorError::UnknownElement(door_id.to_owned()))?;

        let (on_wall, t) = geometry::closest_point_on_segment(door.position, wall.start, wall.end);
        door.position = on_wall;
        door.rotation = wall.angle();
        door.wall_position = plan_to_mm(wall.length_px() * t);
        door.wall_segment_id = Some(wall.id.clone());
        door.is_embedded = true;

        info!(
            "Embedded door {} in wall {} at {:.0} mm",
            door.id, wall.id, door.wall_position
        );
        Ok(())
    }
}

/// An immutable, fully independent copy of a [`Scene`]
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot(Scene);

impl SceneSnapshot {
    pub fn scene(&self) -> &Scene {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    fn object_at(x: f32, y: f32) -> PlacedObject {
        PlacedObject {
            id: crate::id_generator::generate_id("obj"),
            position: Pos2::new(x, y),
            rotation: 0.0,
            scale: 1.0,
            dimensions: Dimensions {
                length_mm: 100.0,
                width_mm: 50.0,
            },
            color: "#ff0000".into(),
            name: "Bench".into(),
            category: "furniture".into(),
            source_descriptor: None,
        }
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut scene = Scene::new();
        scene.placed_objects.push(object_at(10.0, 10.0));
        let snapshot = scene.snapshot();

        scene.placed_objects[0].position += Vec2::new(50.0, 0.0);
        assert_eq!(snapshot.scene().placed_objects[0].position, Pos2::new(10.0, 10.0));
    }

    #[test]
    fn test_remove_wall_unbinds_doors() {
        let mut scene = Scene::new();
        let mut wall = WallSegment::starting_at(Pos2::ZERO);
        wall.end = Pos2::new(200.0, 0.0);
        let wall_id = wall.id.clone();
        scene.walls.push(wall);
        let door = Door::at(Pos2::new(50.0, 10.0));
        let door_id = door.id.clone();
        scene.doors.push(door);

        scene.embed_door_in_wall(&door_id, &wall_id).unwrap();
        let door = scene.door(&door_id).unwrap();
        assert!(door.is_embedded);
        assert_eq!(door.position, Pos2::new(50.0, 0.0));
        assert!((door.wall_position - 50.0).abs() < 1e-4);

        assert_eq!(scene.remove(&wall_id), Some(ElementKind::Wall));
        let door = scene.door(&door_id).unwrap();
        assert!(!door.is_embedded);
        assert!(door.wall_segment_id.is_none());
    }

    #[test]
    fn test_embed_unknown_door() {
        let mut scene = Scene::new();
        let wall = WallSegment::starting_at(Pos2::ZERO);
        let wall_id = wall.id.clone();
        scene.walls.push(wall);
        assert_eq!(
            scene.embed_door_in_wall("missing", &wall_id),
            Err(EditorError::UnknownElement("missing".into()))
        );
    }

    #[test]
    fn test_overlapping_objects() {
        let mut scene = Scene::new();
        scene.placed_objects.push(object_at(0.0, 0.0));
        scene.placed_objects.push(object_at(60.0, 0.0));
        scene.placed_objects.push(object_at(500.0, 500.0));
        let pairs = scene.overlapping_objects();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, scene.placed_objects[0].id);
    }

    #[test]
    fn test_touching_objects_do_not_overlap() {
        let mut scene = Scene::new();
        scene.placed_objects.push(object_at(0.0, 0.0));
        // 100 mm long, so edges meet at x = 50
        scene.placed_objects.push(object_at(100.0, 0.0));
        // Diagonal neighbour whose boxes are apart on both axes
        scene.placed_objects.push(object_at(300.0, 300.0));
        assert!(scene.overlapping_objects().is_empty());
    }

    #[test]
    fn test_dedup_ids() {
        let mut scene = Scene::new();
        let object = object_at(0.0, 0.0);
        scene.placed_objects.push(object.clone());
        scene.placed_objects.push(object);
        assert_eq!(scene.dedup_ids(), 1);
        assert_eq!(scene.placed_objects.len(), 1);
    }

    #[test]
    fn test_element_at_prefers_objects_over_rooms() {
        let mut scene = Scene::new();
        let room = Room::close(
            "Lab".into(),
            vec![
                Pos2::new(-100.0, -100.0),
                Pos2::new(100.0, -100.0),
                Pos2::new(100.0, 100.0),
                Pos2::new(-100.0, 100.0),
            ],
        )
        .unwrap();
        scene.rooms.push(room);
        let object = object_at(0.0, 0.0);
        let object_id = object.id.clone();
        scene.placed_objects.push(object);

        let hit = scene.element_at(Pos2::new(5.0, 5.0), 1.0).unwrap();
        assert_eq!(hit.kind, ElementKind::Object);
        assert_eq!(hit.id, object_id);

        let hit = scene.element_at(Pos2::new(90.0, 90.0), 1.0).unwrap();
        assert_eq!(hit.kind, ElementKind::Room);
    }
}
