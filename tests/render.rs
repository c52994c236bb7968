use std::collections::HashSet;

use egui::{Color32, Modifiers, Pos2, Rect, Vec2};
use lab_floorplan::placement::CatalogDimensions;
use lab_floorplan::render::{AssetLookup, DrawCall, NoAssets, SELECTION_COLOR};
use lab_floorplan::{CatalogItem, EditorSettings, FloorPlanEditor, RecordingTarget, ToolMode};

struct ReadyAssets(HashSet<String>);

impl AssetLookup for ReadyAssets {
    fn is_ready(&self, key: &str) -> bool {
        self.0.contains(key)
    }
}

fn canvas() -> Rect {
    Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
}

fn click(editor: &mut FloorPlanEditor, x: f32, y: f32) {
    let p = Pos2::new(x, y);
    editor.pointer_down(p, Modifiers::NONE);
    editor.pointer_up(p);
}

fn freezer() -> CatalogItem {
    CatalogItem {
        id: "ulf".to_owned(),
        name: "Freezer".to_owned(),
        category: "cold storage".to_owned(),
        dimensions: Some(CatalogDimensions {
            length_mm: Some(80.0),
            width_mm: Some(90.0),
        }),
        color: Some("#93c5fd".to_owned()),
        thumbnail_url: Some("thumbs/freezer.png".to_owned()),
    }
}

fn sample_editor() -> FloorPlanEditor {
    let mut settings = EditorSettings::default();
    settings.initial_scale = 1.0;
    settings.snap.enabled = false;
    let mut editor = FloorPlanEditor::new(settings);

    editor.set_tool(ToolMode::Room).unwrap();
    click(&mut editor, 0.0, 0.0);
    click(&mut editor, 400.0, 0.0);
    click(&mut editor, 400.0, 300.0);

    editor.set_tool(ToolMode::Wall).unwrap();
    editor.pointer_down(Pos2::new(0.0, 0.0), Modifiers::NONE);
    editor.pointer_up(Pos2::new(400.0, 0.0));

    editor.set_tool(ToolMode::Door).unwrap();
    click(&mut editor, 200.0, 0.0);

    editor.set_tool(ToolMode::Text).unwrap();
    click(&mut editor, 100.0, 250.0);

    editor.set_tool(ToolMode::Select).unwrap();
    editor.drop_item(Pos2::new(300.0, 150.0), &freezer()).unwrap();
    editor
}

fn position_of(calls: &[DrawCall], predicate: impl Fn(&DrawCall) -> bool) -> usize {
    calls
        .iter()
        .position(predicate)
        .unwrap_or_else(|| panic!("draw call not found"))
}

#[test]
fn test_render_is_idempotent() {
    let editor = sample_editor();
    let mut target = RecordingTarget::new(canvas());

    editor.render(&mut target, &NoAssets);
    let first = target.take_calls();
    editor.render(&mut target, &NoAssets);
    let second = target.take_calls();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_draw_order_back_to_front() {
    let editor = sample_editor();
    let mut target = RecordingTarget::new(canvas());
    editor.render(&mut target, &NoAssets);
    let calls = target.take_calls();

    assert!(matches!(calls[0], DrawCall::FillRect { .. }));
    let grid = position_of(&calls, |c| matches!(c, DrawCall::Line { .. }));
    let room = position_of(&calls, |c| matches!(c, DrawCall::Text { text, .. } if text == "Room 1"));
    let wall_label = position_of(&calls, |c| matches!(c, DrawCall::Text { text, .. } if text == "400 mm"));
    let door_arc = position_of(&calls, |c| matches!(c, DrawCall::Polyline { points, .. } if points.len() > 5));
    let object = position_of(&calls, |c| matches!(c, DrawCall::Text { text, .. } if text == "Freezer"));
    let annotation = position_of(&calls, |c| matches!(c, DrawCall::Text { text, .. } if text == "Text"));

    assert!(grid < room);
    assert!(room < wall_label);
    assert!(wall_label < door_arc);
    assert!(door_arc < object);
    assert!(object < annotation);
}

#[test]
fn test_room_label_shows_area() {
    let editor = sample_editor();
    let mut target = RecordingTarget::new(canvas());
    editor.render(&mut target, &NoAssets);

    // Right triangle with 400 and 300 mm legs
    assert!(target.texts().contains(&"60000 mm²"));
}

#[test]
fn test_image_drawn_only_once_ready() {
    let editor = sample_editor();
    let mut target = RecordingTarget::new(canvas());

    editor.render(&mut target, &NoAssets);
    let placeholder_only = target.take_calls();
    assert!(!placeholder_only.iter().any(|c| matches!(c, DrawCall::Image { .. })));

    let assets = ReadyAssets(HashSet::from(["thumbs/freezer.png".to_owned()]));
    editor.render(&mut target, &assets);
    let with_image = target.take_calls();

    let freezer_fill = Color32::from_rgb(0x93, 0xc5, 0xfd);
    let placeholder = position_of(&with_image, |c| {
        matches!(c, DrawCall::Polygon { fill, .. } if *fill == freezer_fill)
    });
    let image = position_of(&with_image, |c| {
        matches!(c, DrawCall::Image { key, .. } if key == "thumbs/freezer.png")
    });
    assert!(placeholder < image);
}

#[test]
fn test_selection_is_highlighted() {
    let editor = sample_editor();
    let mut target = RecordingTarget::new(canvas());
    editor.render(&mut target, &NoAssets);

    assert!(target.calls.iter().any(|c| matches!(
        c,
        DrawCall::Polyline { stroke, .. } if stroke.color == SELECTION_COLOR && stroke.width > 2.0
    )));
}

#[test]
fn test_hidden_grid_and_measurements() {
    let mut editor = sample_editor();
    editor.settings_mut().show_grid = false;
    editor.settings_mut().show_measurements = false;
    let mut target = RecordingTarget::new(canvas());
    editor.render(&mut target, &NoAssets);

    let texts = target.texts();
    assert!(!texts.contains(&"400 mm"));
    assert!(!texts.iter().any(|t| t.ends_with("mm²")));
    // Only the wall and door lines remain
    let lines = target
        .calls
        .iter()
        .filter(|c| matches!(c, DrawCall::Line { .. }))
        .count();
    assert_eq!(lines, 3);
}

#[test]
fn test_room_preview_and_guides_are_overlays() {
    let mut settings = EditorSettings::default();
    settings.initial_scale = 1.0;
    let mut editor = FloorPlanEditor::new(settings);
    editor.drop_item(Pos2::new(200.0, 200.0), &freezer()).unwrap();
    let moving = CatalogItem {
        thumbnail_url: None,
        ..freezer()
    };
    editor.drop_item(Pos2::new(500.0, 420.0), &moving).unwrap();

    editor.pointer_down(Pos2::new(500.0, 420.0), Modifiers::NONE);
    editor.pointer_move(Pos2::new(505.0, 204.0));

    let mut target = RecordingTarget::new(canvas());
    editor.render(&mut target, &NoAssets);
    let calls = target.take_calls();

    let last_object = calls
        .iter()
        .rposition(|c| matches!(c, DrawCall::Text { text, .. } if text == "Freezer"))
        .unwrap();
    let guide = position_of(&calls, |c| matches!(c, DrawCall::DashedLine { .. }));
    assert!(last_object < guide);
}
