//! Scene render pipeline.
//!
//! Every frame is a full redraw from current state, back to front:
//! grid, rooms, walls, doors, placed objects, text annotations, then
//! transient overlays (room preview, marquee, snap guides). The pipeline
//! reads state only; calling it twice with the same input issues the same
//! draw calls.

use std::collections::HashSet;

use egui::{Color32, Pos2, Rect, Stroke, Vec2};

use crate::measurement::{MeasurementFormat, format_area, format_measurement, grid_step_px};
use crate::scene::{Door, PlacedObject, Room, Scene, TextAnnotation, WallSegment};
use crate::snap::GuideLine;
use crate::view::ViewState;

pub mod painter;
mod target;

pub use target::{DrawCall, RecordingTarget, RenderTarget};

pub const BACKGROUND_COLOR: Color32 = Color32::from_rgb(250, 250, 250);
pub const GRID_COLOR: Color32 = Color32::from_rgb(229, 231, 235);
pub const SELECTION_COLOR: Color32 = Color32::from_rgb(37, 99, 235);
pub const OVERLAP_COLOR: Color32 = Color32::from_rgb(220, 38, 38);
pub const GUIDE_COLOR: Color32 = Color32::from_rgb(236, 72, 153);
pub const DOOR_COLOR: Color32 = Color32::from_rgb(120, 53, 15);
pub const LABEL_COLOR: Color32 = Color32::from_rgb(55, 65, 81);
pub const PREVIEW_COLOR: Color32 = Color32::from_rgb(59, 130, 246);

/// Grid lines closer than this are not drawn
const MIN_GRID_STEP_PX: f32 = 4.0;
const LABEL_SIZE: f32 = 12.0;
const WALL_LABEL_GAP_PX: f32 = 12.0;
const ARC_SEGMENTS: usize = 16;
const GUIDE_DASH: f32 = 6.0;
const GUIDE_GAP: f32 = 4.0;

/// Whether a thumbnail has finished loading and can be drawn
pub trait AssetLookup {
    fn is_ready(&self, key: &str) -> bool;
}

/// No assets at all; every object draws as its placeholder.
pub struct NoAssets;

impl AssetLookup for NoAssets {
    fn is_ready(&self, _key: &str) -> bool {
        false
    }
}

/// View-only inputs to a redraw
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub show_grid: bool,
    pub grid_size_mm: f32,
    pub show_measurements: bool,
    pub measurement: MeasurementFormat,
    pub selection: &'a HashSet<String>,
    pub guides: &'a [GuideLine],
    /// Vertices of the room being drawn, plus the rubber-band point
    pub room_preview: &'a [Pos2],
    /// Marquee selection rectangle in screen space
    pub marquee: Option<Rect>,
    pub overlap_hints: bool,
}

/// Parse a `#rrggbb` color, falling back when it is malformed.
pub fn parse_color(hex: &str, fallback: Color32) -> Color32 {
    Color32::from_hex(hex).unwrap_or(fallback)
}

/// Redraw the whole scene into `target`.
pub fn render_scene<T: RenderTarget + ?Sized>(
    target: &mut T,
    scene: &Scene,
    view: &ViewState,
    options: &RenderOptions<'_>,
    assets: &dyn AssetLookup,
) {
    let canvas = target.canvas();
    target.fill_rect(canvas, BACKGROUND_COLOR);

    if options.show_grid {
        draw_grid(target, view, options.grid_size_mm);
    }
    for room in &scene.rooms {
        draw_room(target, room, view, options);
    }
    for wall in &scene.walls {
        draw_wall(target, wall, view, options);
    }
    for door in &scene.doors {
        draw_door(target, door, view);
    }

    let overlapping: HashSet<String> = if options.overlap_hints {
        scene
            .overlapping_objects()
            .into_iter()
            .flat_map(|(a, b)| [a, b])
            .collect()
    } else {
        HashSet::new()
    };
    for object in &scene.placed_objects {
        let outline = if options.selection.contains(&object.id) {
            Stroke::new(3.0, SELECTION_COLOR)
        } else if overlapping.contains(&object.id) {
            Stroke::new(2.0, OVERLAP_COLOR)
        } else {
            Stroke::new(1.0, LABEL_COLOR)
        };
        draw_object(target, object, view, outline, assets);
    }

    for text in &scene.text_annotations {
        draw_text(target, text, view);
    }

    draw_overlays(target, view, options);
}

fn draw_grid<T: RenderTarget + ?Sized>(target: &mut T, view: &ViewState, grid_size_mm: f32) {
    let step = grid_step_px(grid_size_mm, view.scale);
    if !step.is_finite() || step < MIN_GRID_STEP_PX {
        return;
    }
    let canvas = target.canvas();
    let stroke = Stroke::new(1.0, GRID_COLOR);

    // Lines sit on multiples of the step in scene space
    let mut x = canvas.left() + (view.offset.x - canvas.left()).rem_euclid(step);
    while x <= canvas.right() {
        target.line([Pos2::new(x, canvas.top()), Pos2::new(x, canvas.bottom())], stroke);
        x += step;
    }
    let mut y = canvas.top() + (view.offset.y - canvas.top()).rem_euclid(step);
    while y <= canvas.bottom() {
        target.line([Pos2::new(canvas.left(), y), Pos2::new(canvas.right(), y)], stroke);
        y += step;
    }
}

fn draw_room<T: RenderTarget + ?Sized>(
    target: &mut T,
    room: &Room,
    view: &ViewState,
    options: &RenderOptions<'_>,
) {
    let points: Vec<Pos2> = room.points.iter().map(|p| view.scene_to_screen(*p)).collect();
    let color = parse_color(&room.color, Color32::LIGHT_BLUE);
    target.polygon(
        &points,
        color.gamma_multiply(0.6),
        Stroke::new(1.0, color),
    );

    if let Some(center) = room.label_position() {
        let center = view.scene_to_screen(center);
        target.text(center, &room.name, LABEL_SIZE + 2.0, LABEL_COLOR);
        if options.show_measurements {
            target.text(
                center + Vec2::new(0.0, LABEL_SIZE + 4.0),
                &format_area(room.area_mm2, &options.measurement),
                LABEL_SIZE,
                LABEL_COLOR,
            );
        }
    }
}

fn draw_wall<T: RenderTarget + ?Sized>(
    target: &mut T,
    wall: &WallSegment,
    view: &ViewState,
    options: &RenderOptions<'_>,
) {
    let start = view.scene_to_screen(wall.start);
    let end = view.scene_to_screen(wall.end);
    let color = parse_color(&wall.color, Color32::DARK_GRAY);
    target.line([start, end], Stroke::new(wall.thickness_px, color));

    if options.show_measurements && wall.length_px() > 0.0 {
        let direction = (end - start).normalized();
        let normal = Vec2::new(-direction.y, direction.x);
        let at = start.lerp(end, 0.5) + normal * (wall.thickness_px / 2.0 + WALL_LABEL_GAP_PX);
        let label = format_measurement(wall.length_mm(), &options.measurement);
        target.text(at, &label, LABEL_SIZE, LABEL_COLOR);
    }
}

fn draw_door<T: RenderTarget + ?Sized>(target: &mut T, door: &Door, view: &ViewState) {
    let hinge = view.scene_to_screen(door.position);
    let radius = door.width_px() * view.zoom();
    let (start_angle, end_angle) = door.swing_angles();
    let at_angle = |angle: f32| hinge + Vec2::angled(angle) * radius;

    let arc: Vec<Pos2> = (0..=ARC_SEGMENTS)
        .map(|i| {
            let t = i as f32 / ARC_SEGMENTS as f32;
            at_angle(start_angle + (end_angle - start_angle) * t)
        })
        .collect();

    // Opening in the wall, the swing, then the open leaf
    target.line([hinge, at_angle(start_angle)], Stroke::new(3.0, BACKGROUND_COLOR));
    target.polyline(&arc, Stroke::new(1.0, DOOR_COLOR));
    target.line([hinge, at_angle(end_angle)], Stroke::new(2.0, DOOR_COLOR));
}

fn draw_object<T: RenderTarget + ?Sized>(
    target: &mut T,
    object: &PlacedObject,
    view: &ViewState,
    outline: Stroke,
    assets: &dyn AssetLookup,
) {
    let corners = object.corners().map(|c| view.scene_to_screen(c));
    let fill = parse_color(&object.color, Color32::GRAY);

    // Placeholder first; the thumbnail covers it once loaded
    target.polygon(&corners, fill, Stroke::NONE);
    if let Some(url) = object.thumbnail_url() {
        if assets.is_ready(url) {
            target.image(url, corners);
        }
    }

    let mut closed = corners.to_vec();
    closed.push(corners[0]);
    target.polyline(&closed, outline);

    target.text(
        view.scene_to_screen(object.position),
        &object.name,
        LABEL_SIZE,
        LABEL_COLOR,
    );
}

fn draw_text<T: RenderTarget + ?Sized>(target: &mut T, text: &TextAnnotation, view: &ViewState) {
    let color = parse_color(&text.color, Color32::BLACK);
    target.text(view.scene_to_screen(text.position), &text.text, text.font_size, color);
}

fn draw_overlays<T: RenderTarget + ?Sized>(
    target: &mut T,
    view: &ViewState,
    options: &RenderOptions<'_>,
) {
    if !options.room_preview.is_empty() {
        let points: Vec<Pos2> = options
            .room_preview
            .iter()
            .map(|p| view.scene_to_screen(*p))
            .collect();
        target.polyline(&points, Stroke::new(2.0, PREVIEW_COLOR));
    }

    if let Some(rect) = options.marquee {
        let stroke = Stroke::new(1.0, SELECTION_COLOR);
        let corners = [
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
        ];
        for i in 0..4 {
            target.dashed_line([corners[i], corners[(i + 1) % 4]], stroke, GUIDE_DASH, GUIDE_GAP);
        }
    }

    let stroke = Stroke::new(1.0, GUIDE_COLOR);
    for guide in options.guides {
        target.dashed_line(guide.endpoints(), stroke, GUIDE_DASH, GUIDE_GAP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Dimensions;

    #[test]
    fn test_parse_color_fallback() {
        assert_eq!(parse_color("#ff0000", Color32::BLACK), Color32::from_rgb(255, 0, 0));
        assert_eq!(parse_color("not a color", Color32::BLACK), Color32::BLACK);
    }

    #[test]
    fn test_placeholder_without_assets() {
        let mut scene = Scene::new();
        scene.placed_objects.push(PlacedObject {
            id: "o1".into(),
            position: Pos2::new(100.0, 100.0),
            rotation: 0.0,
            scale: 1.0,
            dimensions: Dimensions {
                length_mm: 100.0,
                width_mm: 100.0,
            },
            color: "#00ff00".into(),
            name: "Freezer".into(),
            category: String::new(),
            source_descriptor: None,
        });
        let selection = HashSet::new();
        let options = RenderOptions {
            show_grid: false,
            grid_size_mm: 100.0,
            show_measurements: false,
            measurement: MeasurementFormat::default(),
            selection: &selection,
            guides: &[],
            room_preview: &[],
            marquee: None,
            overlap_hints: false,
        };
        let mut target = RecordingTarget::new(Rect::from_min_size(Pos2::ZERO, Vec2::splat(400.0)));
        render_scene(&mut target, &scene, &ViewState::with_scale(1.0), &options, &NoAssets);

        assert!(target.calls.iter().any(|c| matches!(
            c,
            DrawCall::Polygon { fill, .. } if *fill == Color32::from_rgb(0, 255, 0)
        )));
        assert!(!target.calls.iter().any(|c| matches!(c, DrawCall::Image { .. })));
        assert_eq!(target.texts(), vec!["Freezer"]);
    }
}
