use egui::{Modifiers, Pos2, Vec2};
use lab_floorplan::placement::CatalogDimensions;
use lab_floorplan::{CatalogItem, EditorSettings, FloorPlanEditor, SceneDocument, ToolMode};

fn editor() -> FloorPlanEditor {
    let mut settings = EditorSettings::default();
    settings.initial_scale = 1.0;
    settings.snap.enabled = false;
    FloorPlanEditor::new(settings)
}

fn click(editor: &mut FloorPlanEditor, x: f32, y: f32) {
    let p = Pos2::new(x, y);
    editor.pointer_down(p, Modifiers::NONE);
    editor.pointer_up(p);
}

fn furnished_editor() -> FloorPlanEditor {
    let mut editor = editor();
    let hood = CatalogItem {
        id: "hood".to_owned(),
        name: "Fume hood".to_owned(),
        category: "ventilation".to_owned(),
        dimensions: Some(CatalogDimensions {
            length_mm: Some(150.0),
            width_mm: Some(90.0),
        }),
        color: Some("#fcd34d".to_owned()),
        thumbnail_url: Some("thumbs/hood.png".to_owned()),
    };
    editor.drop_item(Pos2::new(250.0, 150.0), &hood).unwrap();
    editor.rotate_selected();

    editor.set_tool(ToolMode::Wall).unwrap();
    editor.pointer_down(Pos2::new(0.0, 0.0), Modifiers::NONE);
    editor.pointer_up(Pos2::new(400.0, 0.0));

    editor.set_tool(ToolMode::Room).unwrap();
    click(&mut editor, 0.0, 0.0);
    click(&mut editor, 400.0, 0.0);
    click(&mut editor, 400.0, 300.0);

    editor.set_tool(ToolMode::Door).unwrap();
    click(&mut editor, 200.0, 10.0);
    let door = editor.scene().doors[0].id.clone();
    let wall = editor.scene().walls[0].id.clone();
    editor.embed_door_in_wall(&door, &wall).unwrap();

    editor.set_tool(ToolMode::Text).unwrap();
    click(&mut editor, 100.0, 250.0);
    let label = editor.scene().text_annotations[0].id.clone();
    editor.set_text(&label, "Cold room").unwrap();

    editor.pan_by(Vec2::new(12.0, -8.0));
    editor.zoom_in();
    editor
}

#[test]
fn test_round_trip_reproduces_scene_and_view() {
    let editor = furnished_editor();
    let json = editor.save_json().unwrap();

    let mut restored = FloorPlanEditor::default();
    restored.load_json(&json).unwrap();

    assert_eq!(restored.scene(), editor.scene());
    assert_eq!(restored.scene().element_count(), 5);
    assert_eq!(restored.view(), editor.view());
    assert!(!restored.can_undo());
}

#[test]
fn test_json_uses_documented_field_names() {
    let json = furnished_editor().save_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    for key in [
        "rooms",
        "walls",
        "roomPoints",
        "placedProducts",
        "doors",
        "textAnnotations",
        "scale",
        "offset",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    let door = &value["doors"][0];
    assert!(door.get("wallSegmentId").is_some());
    assert_eq!(door["isEmbedded"], serde_json::Value::Bool(true));
    assert_eq!(door["swingDirection"], "inward");
    assert_eq!(door["width_mm"], 900.0);
    assert!(value["walls"][0].get("thickness_px").is_some());
    let room = &value["rooms"][0];
    assert_eq!(room["area_mm2"], 60000.0);
    assert_eq!(room["perimeter_mm"], 1200.0);
    assert!(value["placedProducts"][0].get("sourceDescriptor").is_some());
}

#[test]
fn test_incompatible_fields_default_to_empty() {
    let json = r##"{
        "walls": "not a list",
        "rooms": [{ "broken": true }],
        "placedProducts": [{
            "id": "obj-1",
            "position": { "x": 10.0, "y": 20.0 },
            "dimensions": { "length_mm": 600.0, "width_mm": 600.0 },
            "color": "#f9a8d4",
            "name": "Centrifuge"
        }],
        "scale": -4
    }"##;

    let mut editor = editor();
    editor.load_json(json).unwrap();

    let scene = editor.scene();
    assert!(scene.walls.is_empty());
    assert!(scene.rooms.is_empty());
    assert!(scene.doors.is_empty());
    assert!(scene.text_annotations.is_empty());
    assert_eq!(scene.placed_objects.len(), 1);
    let object = &scene.placed_objects[0];
    assert_eq!(object.scale, 1.0);
    assert_eq!(object.rotation, 0.0);
    assert_eq!(editor.view().scale, 0.5);
}

#[test]
fn test_bad_wall_does_not_hide_good_ones() {
    let json = r##"{
        "walls": [
            { "id": "wall-1", "start": { "x": 0, "y": 0 }, "end": { "x": 300, "y": 0 },
              "thickness_px": 8, "color": "#374151" },
            { "id": "wall-2", "start": { "x": 300, "y": 0 }, "end": { "x": 300, "y": 200 } },
            { "id": "wall-3", "end": { "x": 1, "y": 1 } }
        ],
        "rooms": [{
            "id": "room-1", "name": "Prep",
            "points": [{ "x": 0, "y": 0 }, { "x": 300, "y": 0 }, { "x": 300, "y": 200 }]
        }]
    }"##;

    let mut editor = editor();
    editor.load_json(json).unwrap();

    let scene = editor.scene();
    assert_eq!(scene.walls.len(), 2);
    assert_eq!(scene.walls[1].id, "wall-2");
    assert!((scene.walls[1].length_mm() - 200.0).abs() < 1e-3);
    // Measurements missing from the file are recomputed
    assert!((scene.rooms[0].area_mm2 - 30000.0).abs() < 1e-2);
    assert!((scene.rooms[0].perimeter_mm - 860.555).abs() < 1e-2);
}

#[test]
fn test_malformed_json_is_an_error() {
    let mut editor = furnished_editor();
    let before = editor.scene().clone();

    assert!(editor.load_json("{ not json").is_err());
    assert_eq!(editor.scene(), &before);
}

#[test]
fn test_file_round_trip() {
    let editor = furnished_editor();
    let path = std::env::temp_dir().join(format!("lab_floorplan_{}.json", std::process::id()));

    editor.to_document().save_to_file(&path).unwrap();
    let document = SceneDocument::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(&document.scene, editor.scene());
    assert!(document.room_points.is_empty());
}
