use std::collections::HashMap;

use egui::{Pos2, Rect, Sense};
use log::{info, warn};

use crate::assets::{AssetStore, FileFetcher, RedrawSignal, ThumbnailLoader};
use crate::config::EditorSettings;
use crate::editor::FloorPlanEditor;
use crate::input::{InputEvent, InputHandler};
use crate::placement::{CatalogDimensions, CatalogItem};
use crate::render::painter::PainterTarget;
use crate::scene::geometry::distance_to_segment;
use crate::scene::persistence::SceneDocument;
use crate::snap::SnapStrength;
use crate::texture_manager::TextureManager;
use crate::tools::ToolMode;
use crate::view::ZOOM_STEP;

fn catalog_item(
    id: &str,
    name: &str,
    category: &str,
    length_mm: f32,
    width_mm: f32,
    color: &str,
) -> CatalogItem {
    CatalogItem {
        id: id.to_owned(),
        name: name.to_owned(),
        category: category.to_owned(),
        dimensions: Some(CatalogDimensions {
            length_mm: Some(length_mm),
            width_mm: Some(width_mm),
        }),
        color: Some(color.to_owned()),
        thumbnail_url: None,
    }
}

/// Built-in demo catalog
fn demo_catalog() -> Vec<CatalogItem> {
    vec![
        catalog_item("bench-1800", "Lab bench", "furniture", 1800.0, 750.0, "#94a3b8"),
        catalog_item("hood-1500", "Fume hood", "ventilation", 1500.0, 900.0, "#fcd34d"),
        catalog_item("bsc-1200", "Biosafety cabinet", "containment", 1200.0, 800.0, "#86efac"),
        catalog_item("ulf-800", "-80 °C freezer", "cold storage", 800.0, 900.0, "#93c5fd"),
        catalog_item("cf-600", "Centrifuge", "instruments", 600.0, 600.0, "#f9a8d4"),
        catalog_item("sink-1000", "Sink unit", "furniture", 1000.0, 600.0, "#cbd5e1"),
    ]
}

/// We derive Deserialize/Serialize so we can persist editor settings on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct FloorPlanApp {
    settings: EditorSettings,
    file_path: String,

    #[serde(skip)]
    editor: FloorPlanEditor,
    #[serde(skip)]
    input: InputHandler,
    #[serde(skip)]
    textures: TextureManager,
    #[serde(skip)]
    assets: AssetStore,
    #[serde(skip)]
    loader: Option<ThumbnailLoader>,
    #[serde(skip)]
    redraw: Option<RedrawSignal>,
    #[serde(skip)]
    catalog: Vec<CatalogItem>,
    /// Catalog entry placed by the next canvas click
    #[serde(skip)]
    pending_drop: Option<usize>,
    /// Label text being edited, by annotation id
    #[serde(skip)]
    label_drafts: HashMap<String, String>,
    #[serde(skip)]
    status: String,
    #[serde(skip)]
    canvas_rect: Rect,
    #[serde(skip)]
    origin_set: bool,
}

impl Default for FloorPlanApp {
    fn default() -> Self {
        let settings = EditorSettings::default();
        Self {
            editor: FloorPlanEditor::new(settings.clone()),
            settings,
            file_path: "floorplan.json".to_owned(),
            input: InputHandler::default(),
            textures: TextureManager::default(),
            assets: AssetStore::new(),
            loader: None,
            redraw: None,
            catalog: demo_catalog(),
            pending_drop: None,
            label_drafts: HashMap::new(),
            status: String::new(),
            canvas_rect: Rect::NOTHING,
            origin_set: false,
        }
    }
}

impl FloorPlanApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        app.editor = FloorPlanEditor::new(app.settings.clone());

        let ctx = cc.egui_ctx.clone();
        let (loader, redraw) = ThumbnailLoader::new(app.assets.clone(), FileFetcher);
        app.loader = Some(loader.with_notify(move || ctx.request_repaint()));
        app.redraw = Some(redraw);
        app
    }

    fn report(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            for tool in ToolMode::ALL {
                if ui
                    .selectable_label(self.editor.tool() == tool, tool.name())
                    .clicked()
                {
                    if let Err(err) = self.editor.set_tool(tool) {
                        self.report(err.to_string());
                    }
                }
            }
            ui.separator();

            if ui
                .add_enabled(self.editor.can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                if let Err(err) = self.editor.undo() {
                    self.report(err.to_string());
                }
            }
            if ui
                .add_enabled(self.editor.can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                if let Err(err) = self.editor.redo() {
                    self.report(err.to_string());
                }
            }
            ui.separator();

            if ui.button("Zoom +").clicked() {
                self.editor.zoom_in();
            }
            if ui.button("Zoom −").clicked() {
                self.editor.zoom_out();
            }
            if ui.button("Fit").clicked() {
                self.editor.zoom_fit(self.canvas_rect);
            }
            ui.label(format!("{:.2} px/mm", self.editor.view().scale));
            ui.separator();

            if ui.button("Clear all").clicked() {
                self.editor.clear_all();
                self.report("Cleared");
            }
        });

        ui.horizontal_wrapped(|ui| {
            let settings = self.editor.settings_mut();
            ui.checkbox(&mut settings.show_grid, "Grid");
            ui.add(
                egui::DragValue::new(&mut settings.grid_size_mm)
                    .range(10.0..=5000.0)
                    .suffix(" mm"),
            );
            ui.checkbox(&mut settings.show_measurements, "Measurements");
            if ui.button(settings.measurement_unit.suffix()).clicked() {
                settings.measurement_unit = settings.measurement_unit.next();
            }
            ui.checkbox(&mut settings.overlap_hints, "Overlap hints");
            ui.separator();

            ui.checkbox(&mut settings.snap.enabled, "Snap");
            ui.add_enabled_ui(settings.snap.enabled, |ui| {
                ui.checkbox(&mut settings.snap.snap_to_grid, "Grid");
                ui.checkbox(&mut settings.snap.snap_to_objects, "Objects");
                ui.checkbox(&mut settings.snap.snap_to_alignment, "Alignment");
                egui::ComboBox::from_id_salt("snap_strength")
                    .selected_text(format!("{:?}", settings.snap.strength))
                    .show_ui(ui, |ui| {
                        for strength in [SnapStrength::Weak, SnapStrength::Medium, SnapStrength::Strong] {
                            ui.selectable_value(
                                &mut settings.snap.strength,
                                strength,
                                format!("{:?}", strength),
                            );
                        }
                    });
            });
        });
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Catalog");
        for (index, item) in self.catalog.iter().enumerate() {
            let armed = self.pending_drop == Some(index);
            if ui.selectable_label(armed, item.name.as_str()).clicked() {
                self.pending_drop = if armed { None } else { Some(index) };
            }
        }
        if let Some(index) = self.pending_drop {
            ui.label("Click on the plan to place it");
            if ui.button("Place at center").clicked() {
                let item = self.catalog[index].clone();
                self.editor.drop_item(self.canvas_rect.center(), &item);
                self.pending_drop = None;
            }
        }

        ui.separator();
        ui.heading("Doors");
        let scene = self.editor.scene();
        let unbound: Vec<(String, Pos2)> = scene
            .doors
            .iter()
            .filter(|d| !d.is_embedded)
            .map(|d| (d.id.clone(), d.position))
            .collect();
        let walls: Vec<(String, Pos2, Pos2)> = scene
            .walls
            .iter()
            .map(|w| (w.id.clone(), w.start, w.end))
            .collect();
        if unbound.is_empty() {
            ui.label("All doors are embedded");
        }
        for (door_id, position) in unbound {
            let nearest = walls
                .iter()
                .map(|(id, start, end)| (id, distance_to_segment(position, *start, *end)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(id, _)| id.clone());
            ui.horizontal(|ui| {
                ui.label(door_id.as_str());
                if ui
                    .add_enabled(nearest.is_some(), egui::Button::new("Embed in nearest wall"))
                    .clicked()
                {
                    if let Some(wall_id) = &nearest {
                        if let Err(err) = self.editor.embed_door_in_wall(&door_id, wall_id) {
                            self.report(err.to_string());
                        }
                    }
                }
            });
        }

        ui.separator();
        ui.heading("Labels");
        let texts: Vec<(String, String)> = self
            .editor
            .scene()
            .text_annotations
            .iter()
            .map(|t| (t.id.clone(), t.text.clone()))
            .collect();
        for (id, text) in texts {
            let mut draft = self.label_drafts.remove(&id).unwrap_or(text);
            let response = ui.text_edit_singleline(&mut draft);
            if response.lost_focus() {
                if let Err(err) = self.editor.set_text(&id, &draft) {
                    self.report(err.to_string());
                }
            } else if response.has_focus() {
                self.label_drafts.insert(id, draft);
            }
        }

        ui.separator();
        ui.heading("File");
        ui.text_edit_singleline(&mut self.file_path);
        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                self.save();
            }
            if ui.button("Load").clicked() {
                self.load();
            }
        });

        ui.separator();
        let scene = self.editor.scene();
        ui.label(format!(
            "{} rooms, {} walls, {} objects, {} selected",
            scene.rooms.len(),
            scene.walls.len(),
            scene.placed_objects.len(),
            self.editor.selection().len()
        ));
        if !self.status.is_empty() {
            ui.label(self.status.as_str());
        }
    }

    fn save(&mut self) {
        match self.editor.to_document().save_to_file(&self.file_path) {
            Ok(()) => self.report(format!("Saved {}", self.file_path)),
            Err(err) => {
                warn!("{}", err);
                self.report(err.to_string());
            }
        }
    }

    fn load(&mut self) {
        match SceneDocument::load_from_file(&self.file_path) {
            Ok(document) => {
                self.editor.load_document(document);
                self.pending_drop = None;
                self.report(format!("Loaded {}", self.file_path));
            }
            Err(err) => {
                warn!("{}", err);
                self.report(err.to_string());
            }
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        self.canvas_rect = rect;

        // Put the scene origin at the canvas corner on first show
        if !self.origin_set {
            self.editor.pan_by(rect.min.to_vec2());
            self.origin_set = true;
        }

        // Wheel zoom keeps the plan point under the cursor fixed
        if let Some(anchor) = response.hover_pos() {
            let scroll = ctx.input(|i| i.raw_scroll_delta.y);
            if scroll > 0.0 {
                self.editor.zoom_at(ZOOM_STEP, anchor);
            } else if scroll < 0.0 {
                self.editor.zoom_at(1.0 / ZOOM_STEP, anchor);
            }
        }

        self.input.set_canvas_rect(rect);
        for event in self.input.process_input(ctx) {
            if let (Some(index), InputEvent::PointerDown { position, .. }) =
                (self.pending_drop, event)
            {
                let item = self.catalog[index].clone();
                if self.editor.drop_item(position, &item).is_none() {
                    self.report(format!("{} has no dimensions", item.name));
                }
                self.pending_drop = None;
                continue;
            }
            if let Err(err) = self.editor.handle_event(event) {
                info!("{}", err);
                self.report(err.to_string());
            }
        }

        if let Some(loader) = &self.loader {
            loader.request_scene(self.editor.scene());
        }

        let mut target = PainterTarget::new(&painter, ctx, &mut self.textures, &self.assets);
        self.editor.render(&mut target, &self.assets);
    }
}

impl eframe::App for FloorPlanApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings = self.editor.settings().clone();
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();
        if let Some(redraw) = &mut self.redraw {
            if redraw.take() {
                ctx.request_repaint();
            }
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });
        egui::SidePanel::left("side_panel")
            .default_width(220.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.side_panel(ui);
                });
            });
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.canvas(ui, ctx);
            });
    }
}
