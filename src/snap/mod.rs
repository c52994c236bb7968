//! Snap resolution: adjusts a candidate point so it lands on other
//! objects, wall/room geometry, shared axes or the grid.
//!
//! Tiers are tried in a fixed order and the first match wins:
//! object reference points, wall/room endpoints, axis alignment, grid.

use egui::Pos2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::measurement::{PLAN_SCALE, grid_step_px, plan_to_mm};
use crate::scene::{PlacedObject, Scene};

pub mod guides;

pub use guides::{GuideLine, GuideOrientation, guides_for};

/// Snap distance in screen pixels at medium strength
pub const BASE_THRESHOLD_PX: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapStrength {
    Weak,
    #[default]
    Medium,
    Strong,
}

impl SnapStrength {
    pub fn multiplier(self) -> f32 {
        match self {
            Self::Weak => 0.5,
            Self::Medium => 1.0,
            Self::Strong => 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapSettings {
    pub enabled: bool,
    pub snap_to_grid: bool,
    pub snap_to_objects: bool,
    pub snap_to_alignment: bool,
    pub strength: SnapStrength,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            snap_to_grid: true,
            snap_to_objects: true,
            snap_to_alignment: true,
            strength: SnapStrength::Medium,
        }
    }
}

impl SnapSettings {
    /// Active pixel threshold for the configured strength
    pub fn threshold_px(&self) -> f32 {
        BASE_THRESHOLD_PX * self.strength.multiplier()
    }
}

/// What a snapped point was attracted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    None,
    /// Corner, edge midpoint or center of another object
    Object,
    WallEndpoint,
    WallMidpoint,
    RoomVertex,
    /// Shares a Y coordinate with another object
    AlignHorizontal,
    /// Shares an X coordinate with another object
    AlignVertical,
    Grid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapTarget {
    Object(String),
    Wall(String),
    Room(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub point: Pos2,
    pub snapped: bool,
    pub kind: SnapKind,
    pub target: Option<SnapTarget>,
    /// Real-world distance between the candidate and the snapped point
    pub distance_mm: Option<f32>,
}

impl SnapResult {
    pub fn unsnapped(point: Pos2) -> Self {
        Self {
            point,
            snapped: false,
            kind: SnapKind::None,
            target: None,
            distance_mm: None,
        }
    }
}

/// Inputs to a snap query besides the candidate point and settings
#[derive(Debug, Clone, Copy)]
pub struct SnapQuery<'a> {
    /// View scale in screen pixels per millimeter; converts the screen
    /// threshold into scene distance
    pub scale: f32,
    pub grid_size_mm: f32,
    /// Element being moved or drawn; never snaps to itself
    pub exclude: Option<&'a str>,
}

/// Resolve the snapped position for `candidate`.
pub fn resolve_snap(
    candidate: Pos2,
    scene: &Scene,
    settings: &SnapSettings,
    query: &SnapQuery<'_>,
) -> SnapResult {
    if !settings.enabled {
        return SnapResult::unsnapped(candidate);
    }

    let threshold = settings.threshold_px() * PLAN_SCALE / query.scale;
    let hit = |point: Pos2, kind: SnapKind, target: Option<SnapTarget>| SnapResult {
        point,
        snapped: true,
        kind,
        target,
        distance_mm: Some(plan_to_mm(candidate.distance(point))),
    };
    let is_excluded = |id: &str| query.exclude == Some(id);

    if settings.snap_to_objects {
        for object in scene.placed_objects.iter().filter(|o| !is_excluded(o.id.as_str())) {
            let bounds = object.bounding_box();
            let center = bounds.center();
            let reference_points = [
                bounds.left_top(),
                bounds.right_top(),
                bounds.right_bottom(),
                bounds.left_bottom(),
                Pos2::new(center.x, bounds.top()),
                Pos2::new(bounds.right(), center.y),
                Pos2::new(center.x, bounds.bottom()),
                Pos2::new(bounds.left(), center.y),
                center,
            ];
            if let Some(point) = reference_points
                .into_iter()
                .find(|p| candidate.distance(*p) < threshold)
            {
                debug!("Snapped to object {} at {:?}", object.id, point);
                return hit(point, SnapKind::Object, Some(SnapTarget::Object(object.id.clone())));
            }
        }

        for wall in scene.walls.iter().filter(|w| !is_excluded(w.id.as_str())) {
            let candidates = [
                (wall.start, SnapKind::WallEndpoint),
                (wall.end, SnapKind::WallEndpoint),
                (wall.midpoint(), SnapKind::WallMidpoint),
            ];
            if let Some((point, kind)) = candidates
                .into_iter()
                .find(|(p, _)| candidate.distance(*p) < threshold)
            {
                return hit(point, kind, Some(SnapTarget::Wall(wall.id.clone())));
            }
        }

        for room in scene.rooms.iter().filter(|r| !is_excluded(r.id.as_str())) {
            if let Some(point) = room
                .points
                .iter()
                .copied()
                .find(|p| candidate.distance(*p) < threshold)
            {
                return hit(point, SnapKind::RoomVertex, Some(SnapTarget::Room(room.id.clone())));
            }
        }
    }

    if settings.snap_to_alignment {
        let others: Vec<&PlacedObject> = scene
            .placed_objects
            .iter()
            .filter(|o| !is_excluded(o.id.as_str()))
            .collect();

        if let Some(object) = others
            .iter()
            .find(|o| (candidate.y - o.position.y).abs() < threshold)
        {
            let point = Pos2::new(candidate.x, object.position.y);
            return hit(
                point,
                SnapKind::AlignHorizontal,
                Some(SnapTarget::Object(object.id.clone())),
            );
        }
        if let Some(object) = others
            .iter()
            .find(|o| (candidate.x - o.position.x).abs() < threshold)
        {
            let point = Pos2::new(object.position.x, candidate.y);
            return hit(
                point,
                SnapKind::AlignVertical,
                Some(SnapTarget::Object(object.id.clone())),
            );
        }
    }

    if settings.snap_to_grid {
        let step = grid_step_px(query.grid_size_mm, PLAN_SCALE);
        if step > 0.0 {
            let point = Pos2::new(
                (candidate.x / step).round() * step,
                (candidate.y / step).round() * step,
            );
            if candidate.distance(point) < threshold {
                return hit(point, SnapKind::Grid, None);
            }
        }
    }

    SnapResult::unsnapped(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Dimensions, WallSegment};

    fn query() -> SnapQuery<'static> {
        SnapQuery {
            scale: 1.0,
            grid_size_mm: 100.0,
            exclude: None,
        }
    }

    fn bench(id: &str, x: f32, y: f32) -> PlacedObject {
        PlacedObject {
            id: id.to_owned(),
            position: Pos2::new(x, y),
            rotation: 0.0,
            scale: 1.0,
            dimensions: Dimensions {
                length_mm: 200.0,
                width_mm: 100.0,
            },
            color: "#888888".into(),
            name: "Bench".into(),
            category: "benches".into(),
            source_descriptor: None,
        }
    }

    #[test]
    fn test_empty_scene_falls_through_to_grid() {
        let result = resolve_snap(
            Pos2::new(103.0, 198.0),
            &Scene::new(),
            &SnapSettings::default(),
            &query(),
        );
        assert!(result.snapped);
        assert_eq!(result.kind, SnapKind::Grid);
        assert_eq!(result.point, Pos2::new(100.0, 200.0));
    }

    #[test]
    fn test_grid_snap_respects_threshold() {
        let result = resolve_snap(
            Pos2::new(150.0, 150.0),
            &Scene::new(),
            &SnapSettings::default(),
            &query(),
        );
        assert!(!result.snapped);
        assert_eq!(result.point, Pos2::new(150.0, 150.0));
    }

    #[test]
    fn test_object_corner_beats_grid() {
        let mut scene = Scene::new();
        // Bottom-right corner at (204, 154); nearest 50 mm grid point is (200, 150)
        scene.placed_objects.push(bench("a", 104.0, 104.0));
        let q = SnapQuery {
            grid_size_mm: 50.0,
            ..query()
        };
        let candidate = Pos2::new(201.0, 151.0);
        let result = resolve_snap(candidate, &scene, &SnapSettings::default(), &q);
        assert_eq!(result.kind, SnapKind::Object);
        assert_eq!(result.point, Pos2::new(204.0, 154.0));
        assert_eq!(result.target, Some(SnapTarget::Object("a".into())));
    }

    #[test]
    fn test_exact_reference_point_has_zero_distance() {
        let mut scene = Scene::new();
        scene.placed_objects.push(bench("a", 100.0, 100.0));
        let result = resolve_snap(Pos2::new(100.0, 100.0), &scene, &SnapSettings::default(), &query());
        assert!(result.snapped);
        assert_eq!(result.distance_mm, Some(0.0));
    }

    #[test]
    fn test_excluded_object_is_ignored() {
        let mut scene = Scene::new();
        scene.placed_objects.push(bench("a", 100.0, 100.0));
        let q = SnapQuery {
            exclude: Some("a"),
            ..query()
        };
        let result = resolve_snap(Pos2::new(100.0, 101.0), &scene, &SnapSettings::default(), &q);
        assert_ne!(result.kind, SnapKind::Object);
    }

    #[test]
    fn test_wall_endpoint_and_midpoint() {
        let mut scene = Scene::new();
        let mut wall = WallSegment::starting_at(Pos2::new(0.0, 0.0));
        wall.end = Pos2::new(330.0, 0.0);
        scene.walls.push(wall);

        let settings = SnapSettings {
            snap_to_grid: false,
            ..SnapSettings::default()
        };
        let result = resolve_snap(Pos2::new(327.0, 4.0), &scene, &settings, &query());
        assert_eq!(result.kind, SnapKind::WallEndpoint);
        assert_eq!(result.point, Pos2::new(330.0, 0.0));

        let result = resolve_snap(Pos2::new(163.0, 2.0), &scene, &settings, &query());
        assert_eq!(result.kind, SnapKind::WallMidpoint);
        assert_eq!(result.point, Pos2::new(165.0, 0.0));
    }

    #[test]
    fn test_alignment_locks_one_axis() {
        let mut scene = Scene::new();
        scene.placed_objects.push(bench("a", 100.0, 100.0));
        let settings = SnapSettings {
            snap_to_grid: false,
            ..SnapSettings::default()
        };
        let result = resolve_snap(Pos2::new(537.0, 104.0), &scene, &settings, &query());
        assert_eq!(result.kind, SnapKind::AlignHorizontal);
        assert_eq!(result.point, Pos2::new(537.0, 100.0));

        let result = resolve_snap(Pos2::new(97.0, 531.0), &scene, &settings, &query());
        assert_eq!(result.kind, SnapKind::AlignVertical);
        assert_eq!(result.point, Pos2::new(100.0, 531.0));
    }

    #[test]
    fn test_disabled_tiers_are_skipped() {
        let mut scene = Scene::new();
        scene.placed_objects.push(bench("a", 100.0, 100.0));
        let settings = SnapSettings {
            snap_to_objects: false,
            snap_to_alignment: false,
            ..SnapSettings::default()
        };
        let result = resolve_snap(Pos2::new(203.0, 147.0), &scene, &settings, &query());
        assert_eq!(result.kind, SnapKind::None);

        let settings = SnapSettings {
            enabled: false,
            ..SnapSettings::default()
        };
        let result = resolve_snap(Pos2::new(101.0, 101.0), &scene, &settings, &query());
        assert!(!result.snapped);
    }

    #[test]
    fn test_threshold_follows_zoom() {
        // 16 scene px is 8 screen px at half scale and 32 at double scale
        let candidate = Pos2::new(216.0, 300.0);
        let settings = SnapSettings::default();
        let zoomed_out = SnapQuery {
            scale: 0.5,
            ..query()
        };
        let zoomed_in = SnapQuery {
            scale: 2.0,
            ..query()
        };
        let result = resolve_snap(candidate, &Scene::new(), &settings, &zoomed_out);
        assert_eq!(result.kind, SnapKind::Grid);
        assert_eq!(result.point, Pos2::new(200.0, 300.0));
        assert_eq!(result.distance_mm, Some(16.0));
        assert!(!resolve_snap(candidate, &Scene::new(), &settings, &zoomed_in).snapped);
    }

    #[test]
    fn test_strength_scales_threshold() {
        let weak = SnapSettings {
            strength: SnapStrength::Weak,
            ..SnapSettings::default()
        };
        let strong = SnapSettings {
            strength: SnapStrength::Strong,
            ..SnapSettings::default()
        };
        assert_eq!(weak.threshold_px(), 5.0);
        assert_eq!(strong.threshold_px(), 15.0);

        let candidate = Pos2::new(107.0, 207.0);
        assert!(!resolve_snap(candidate, &Scene::new(), &weak, &query()).snapped);
        assert!(resolve_snap(candidate, &Scene::new(), &strong, &query()).snapped);
    }
}
