//! The interaction state machine.
//!
//! [`FloorPlanEditor`] owns the scene, the view, the selection and the edit
//! history, and turns pointer and keyboard input into scene mutations. Scene
//! changes are committed to history when a gesture ends (pointer-up or a
//! click), never on intermediate pointer moves. While a gesture is in
//! flight tool switches, undo and redo are refused with
//! [`EditorError::ToolBusy`].

use std::collections::HashSet;
use std::f32::consts::{FRAC_PI_2, TAU};

use egui::{Modifiers, Pos2, Rect, Vec2};
use log::{debug, info, warn};

use crate::config::EditorSettings;
use crate::error::{EditorError, PersistenceResult};
use crate::history::EditHistory;
use crate::input::{InputEvent, Shortcut};
use crate::placement::{CatalogItem, resolve_drop};
use crate::render::{AssetLookup, RenderOptions, RenderTarget, render_scene};
use crate::scene::persistence::SceneDocument;
use crate::scene::{Door, Room, Scene, TextAnnotation, WallSegment};
use crate::snap::{GuideLine, SnapQuery, SnapResult, guides_for, resolve_snap};
use crate::tools::ToolMode;
use crate::view::ViewState;

mod interaction;

pub use interaction::Interaction;

/// Walls shorter than this are treated as accidental clicks
pub const MIN_WALL_LENGTH_MM: f32 = 10.0;
/// Rotation applied by the rotate command
pub const ROTATE_INCREMENT: f32 = FRAC_PI_2;
/// A marquee smaller than this on both axes counts as a click
pub const MARQUEE_MIN_SIZE_PX: f32 = 3.0;

pub struct FloorPlanEditor {
    scene: Scene,
    view: ViewState,
    settings: EditorSettings,
    tool: ToolMode,
    /// Ids of selected placed objects
    selection: HashSet<String>,
    history: EditHistory,
    interaction: Interaction,
    /// Latest snap, kept only while a gesture is in flight
    last_snap: Option<SnapResult>,
}

impl Default for FloorPlanEditor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl FloorPlanEditor {
    pub fn new(settings: EditorSettings) -> Self {
        let scene = Scene::new();
        let mut history = EditHistory::with_capacity(settings.history_capacity);
        history.push(scene.snapshot());
        Self {
            scene,
            view: ViewState::with_scale(settings.initial_scale),
            settings,
            tool: ToolMode::default(),
            selection: HashSet::new(),
            history,
            interaction: Interaction::Idle,
            last_snap: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Snap, grid and display settings. The history capacity only applies
    /// to editors created afterwards.
    pub fn settings_mut(&mut self) -> &mut EditorSettings {
        &mut self.settings
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn selection(&self) -> &HashSet<String> {
        &self.selection
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn is_busy(&self) -> bool {
        !self.interaction.is_idle()
    }

    pub fn last_snap(&self) -> Option<&SnapResult> {
        self.last_snap.as_ref()
    }

    fn ensure_idle(&self, action: &'static str) -> Result<(), EditorError> {
        if self.interaction.is_idle() {
            Ok(())
        } else {
            Err(EditorError::ToolBusy {
                action,
                state: self.interaction.describe(),
            })
        }
    }

    fn commit(&mut self, what: &str) {
        self.history.push(self.scene.snapshot());
        info!("{}", what);
    }

    fn snap(&self, candidate: Pos2, exclude: Option<&str>) -> SnapResult {
        if !self.tool.snaps() {
            return SnapResult::unsnapped(candidate);
        }
        let query = SnapQuery {
            scale: self.view.scale,
            grid_size_mm: self.settings.grid_size_mm,
            exclude,
        };
        resolve_snap(candidate, &self.scene, &self.settings.snap, &query)
    }

    /// Snap `candidate` and remember the result for guide rendering.
    fn snap_tracked(&mut self, candidate: Pos2, exclude: Option<&str>) -> Pos2 {
        let result = self.snap(candidate, exclude);
        let point = result.point;
        if result.snapped {
            debug!("Snapped {:?} -> {:?} ({:?})", candidate, point, result.kind);
        }
        self.last_snap = result.snapped.then_some(result);
        point
    }

    pub fn set_tool(&mut self, tool: ToolMode) -> Result<(), EditorError> {
        self.ensure_idle("switch tool")?;
        if self.tool != tool {
            debug!("Tool {} -> {}", self.tool.name(), tool.name());
            self.tool = tool;
        }
        self.last_snap = None;
        Ok(())
    }

    /// Route an input event to the matching handler.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<(), EditorError> {
        match event {
            InputEvent::PointerDown {
                position,
                modifiers,
            } => self.pointer_down(position, modifiers),
            InputEvent::PointerMove { position } => self.pointer_move(position),
            InputEvent::PointerUp { position } => self.pointer_up(position),
            InputEvent::DoubleClick { position } => self.double_click(position),
            InputEvent::Shortcut(shortcut) => return self.shortcut(shortcut),
        }
        Ok(())
    }

    fn shortcut(&mut self, shortcut: Shortcut) -> Result<(), EditorError> {
        match shortcut {
            Shortcut::Undo => {
                self.undo()?;
            }
            Shortcut::Redo => {
                self.redo()?;
            }
            Shortcut::SelectAll => self.select_all(),
            Shortcut::DeleteSelected => self.delete_selected(),
            Shortcut::RotateSelected => self.rotate_selected(),
            Shortcut::Escape => self.deselect(),
            Shortcut::FinishRoom => {
                self.finish_room();
            }
        }
        Ok(())
    }

    /// Primary button pressed at `screen`.
    pub fn pointer_down(&mut self, screen: Pos2, modifiers: Modifiers) {
        let in_room = matches!(self.interaction, Interaction::DrawingRoom { .. });
        if !(self.interaction.is_idle() || in_room) {
            warn!("Ignoring pointer down while {}", self.interaction.describe());
            return;
        }

        let point = self.view.screen_to_scene(screen);
        match self.tool {
            ToolMode::Select => self.begin_select(screen, point, modifiers),
            ToolMode::Wall => {
                let start = self.snap_tracked(point, None);
                let wall = WallSegment::starting_at(start);
                debug!("Started wall {} at {:?}", wall.id, start);
                self.interaction = Interaction::DrawingWall {
                    wall_id: wall.id.clone(),
                };
                self.scene.walls.push(wall);
            }
            ToolMode::Room => self.add_room_vertex(point),
            ToolMode::Door => {
                let at = self.snap(point, None).point;
                let door = Door::at(at);
                let what = format!("Placed door {}", door.id);
                self.scene.doors.push(door);
                self.commit(&what);
            }
            ToolMode::Text => {
                let text = TextAnnotation::placeholder(point);
                let what = format!("Placed text {}", text.id);
                self.scene.text_annotations.push(text);
                self.commit(&what);
            }
            ToolMode::Pan => self.interaction = Interaction::Panning { last: screen },
            ToolMode::Eraser => {
                if let Some(hit) = self.scene.element_at(point, self.view.zoom()) {
                    self.scene.remove(&hit.id);
                    self.selection.remove(&hit.id);
                    self.commit(&format!("Erased {:?} {}", hit.kind, hit.id));
                }
            }
            ToolMode::Rotate => {
                if let Some(id) = self
                    .scene
                    .object_at(point)
                    .map(|o| o.id.clone())
                {
                    if !self.selection.contains(&id) {
                        self.selection = HashSet::from([id]);
                    }
                }
                self.rotate_selected();
            }
        }
    }

    fn begin_select(&mut self, screen: Pos2, point: Pos2, modifiers: Modifiers) {
        let additive = modifiers.shift || modifiers.command;
        let hit = self
            .scene
            .object_at(point)
            .map(|o| (o.id.clone(), o.position));

        match hit {
            Some((id, _)) if additive => {
                if !self.selection.remove(&id) {
                    self.selection.insert(id);
                }
            }
            Some((id, center)) => {
                if !self.selection.contains(&id) {
                    self.selection = HashSet::from([id.clone()]);
                }
                debug!("Grabbed object {}", id);
                self.interaction = Interaction::Dragging {
                    object_id: id,
                    grab_offset: center - point,
                    moved: false,
                };
            }
            None => {
                if !additive {
                    self.selection.clear();
                }
                self.interaction = Interaction::Selecting {
                    start: screen,
                    current: screen,
                    additive,
                };
            }
        }
    }

    /// Snap threshold converted to scene units at the current zoom.
    fn close_threshold(&self) -> f32 {
        self.view.screen_to_scene_len(self.settings.snap.threshold_px())
    }

    fn add_room_vertex(&mut self, point: Pos2) {
        let threshold = self.close_threshold();
        let vertex = self.snap_tracked(point, None);
        if let Interaction::DrawingRoom { points, cursor } = &mut self.interaction {
            // A press back on the first vertex closes the outline on release,
            // and a repeated press (double-click) adds nothing
            let closing = points.len() >= 3 && points[0].distance(point) <= threshold;
            let repeated = points
                .last()
                .is_some_and(|last| last.distance(vertex) <= threshold);
            if !closing && !repeated {
                points.push(vertex);
            }
            *cursor = Some(vertex);
            return;
        }
        debug!("Started room at {:?}", vertex);
        self.interaction = Interaction::DrawingRoom {
            points: vec![vertex],
            cursor: Some(vertex),
        };
    }

    /// Pointer moved to `screen`, with or without the button held.
    pub fn pointer_move(&mut self, screen: Pos2) {
        let point = self.view.screen_to_scene(screen);
        match &self.interaction {
            Interaction::Idle => self.last_snap = None,
            Interaction::Dragging {
                object_id,
                grab_offset,
                ..
            } => {
                let (id, offset) = (object_id.clone(), *grab_offset);
                let center = self.snap_tracked(point + offset, Some(&id));
                if let Some(object) = self.scene.object_mut(&id) {
                    object.position = center;
                }
                if let Interaction::Dragging { moved, .. } = &mut self.interaction {
                    *moved = true;
                }
            }
            Interaction::DrawingWall { wall_id } => {
                let id = wall_id.clone();
                let end = self.snap_tracked(point, Some(&id));
                if let Some(wall) = self.scene.wall_mut(&id) {
                    wall.end = end;
                }
            }
            Interaction::DrawingRoom { .. } => {
                let at = self.snap_tracked(point, None);
                if let Interaction::DrawingRoom { cursor, .. } = &mut self.interaction {
                    *cursor = Some(at);
                }
            }
            Interaction::Panning { last } => {
                let delta = screen - *last;
                self.view.pan_by(delta);
                self.interaction = Interaction::Panning { last: screen };
            }
            Interaction::Selecting { start, additive, .. } => {
                self.interaction = Interaction::Selecting {
                    start: *start,
                    current: screen,
                    additive: *additive,
                };
            }
        }
    }

    /// Primary button released at `screen`.
    ///
    /// Releasing in room mode with three or more vertices closes the room.
    pub fn pointer_up(&mut self, screen: Pos2) {
        let point = self.view.screen_to_scene(screen);
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle | Interaction::Panning { .. } => {}
            Interaction::Dragging {
                object_id, moved, ..
            } => {
                if moved {
                    self.commit(&format!("Moved object {}", object_id));
                }
            }
            Interaction::DrawingWall { wall_id } => self.finish_wall(&wall_id, point),
            Interaction::DrawingRoom { points, cursor } => {
                if points.len() >= 3 {
                    self.complete_room(points);
                } else {
                    self.interaction = Interaction::DrawingRoom { points, cursor };
                }
            }
            Interaction::Selecting {
                start, additive, ..
            } => self.apply_marquee(Rect::from_two_pos(start, screen), additive),
        }
        self.last_snap = None;
    }

    fn finish_wall(&mut self, wall_id: &str, point: Pos2) {
        let end = self.snap(point, Some(wall_id)).point;
        let Some(wall) = self.scene.wall_mut(wall_id) else {
            return;
        };
        wall.end = end;

        let length_mm = wall.length_mm();
        if length_mm < MIN_WALL_LENGTH_MM {
            debug!("Discarded wall {}: {:.1} mm is too short", wall_id, length_mm);
            self.scene.remove(wall_id);
        } else {
            self.commit(&format!("Added wall {} ({:.0} mm)", wall_id, length_mm));
        }
    }

    fn apply_marquee(&mut self, rect: Rect, additive: bool) {
        if rect.width() < MARQUEE_MIN_SIZE_PX && rect.height() < MARQUEE_MIN_SIZE_PX {
            return;
        }
        let view = self.view;
        let inside = self
            .scene
            .placed_objects
            .iter()
            .filter(|o| rect.contains(view.scene_to_screen(o.position)))
            .map(|o| o.id.clone());
        if additive {
            self.selection.extend(inside);
        } else {
            self.selection = inside.collect();
        }
        debug!("Marquee selected {} objects", self.selection.len());
    }

    /// Double-click finishes an open room outline.
    pub fn double_click(&mut self, _screen: Pos2) {
        if matches!(self.interaction, Interaction::DrawingRoom { .. }) {
            self.finish_room();
        }
    }

    /// Close the open room outline. Fewer than three vertices discards it.
    /// Returns the new room's id.
    pub fn finish_room(&mut self) -> Option<String> {
        match std::mem::take(&mut self.interaction) {
            Interaction::DrawingRoom { points, .. } => self.complete_room(points),
            other => {
                self.interaction = other;
                None
            }
        }
    }

    fn complete_room(&mut self, points: Vec<Pos2>) -> Option<String> {
        self.last_snap = None;
        let name = format!("Room {}", self.scene.rooms.len() + 1);
        let Some(room) = Room::close(name, points) else {
            debug!("Discarded room with fewer than 3 points");
            return None;
        };
        let id = room.id.clone();
        let what = format!(
            "Added room {} ({:.0} mm², {:.0} mm)",
            room.name, room.area_mm2, room.perimeter_mm
        );
        self.scene.rooms.push(room);
        self.commit(&what);
        Some(id)
    }

    /// Drop the open room outline without creating anything.
    pub fn cancel_room(&mut self) {
        if matches!(self.interaction, Interaction::DrawingRoom { .. }) {
            debug!("Cancelled room");
            self.interaction = Interaction::Idle;
            self.last_snap = None;
        }
    }

    pub fn select_all(&mut self) {
        self.selection = self
            .scene
            .placed_objects
            .iter()
            .map(|o| o.id.clone())
            .collect();
    }

    pub fn deselect(&mut self) {
        self.selection.clear();
        self.cancel_room();
    }

    pub fn delete_selected(&mut self) {
        if !self.interaction.is_idle() || self.selection.is_empty() {
            return;
        }
        let removed = self
            .selection
            .drain()
            .filter(|id| self.scene.remove(id).is_some())
            .count();
        if removed > 0 {
            self.commit(&format!("Deleted {} objects", removed));
        }
    }

    /// Turn every selected object by [`ROTATE_INCREMENT`].
    pub fn rotate_selected(&mut self) {
        if !self.interaction.is_idle() {
            return;
        }
        let mut rotated = 0;
        for object in self
            .scene
            .placed_objects
            .iter_mut()
            .filter(|o| self.selection.contains(&o.id))
        {
            object.rotation = (object.rotation + ROTATE_INCREMENT).rem_euclid(TAU);
            rotated += 1;
        }
        if rotated > 0 {
            self.commit(&format!("Rotated {} objects", rotated));
        }
    }

    /// Replace the content of a text annotation.
    pub fn set_text(&mut self, id: &str, text: &str) -> Result<(), EditorError> {
        let annotation = self
            .scene
            .text_annotations
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| EditorError::UnknownElement(id.to_owned()))?;
        if annotation.text != text {
            annotation.text = text.to_owned();
            self.commit(&format!("Edited text {}", id));
        }
        Ok(())
    }

    pub fn embed_door_in_wall(&mut self, door_id: &str, wall_id: &str) -> Result<(), EditorError> {
        self.ensure_idle("embed a door")?;
        self.scene.embed_door_in_wall(door_id, wall_id)?;
        self.commit(&format!("Embedded door {} in wall {}", door_id, wall_id));
        Ok(())
    }

    /// Place a catalog item dropped at `screen`. Returns the new object's
    /// id, or `None` when the item has no usable dimensions.
    pub fn drop_item(&mut self, screen: Pos2, item: &CatalogItem) -> Option<String> {
        if !self.interaction.is_idle() {
            return None;
        }
        let object = resolve_drop(screen, &self.view, item)?;
        let id = object.id.clone();
        self.scene.placed_objects.push(object);
        self.selection = HashSet::from([id.clone()]);
        self.commit(&format!("Placed {} as {}", item.name, id));
        Some(id)
    }

    /// Empty the scene. Undoable.
    pub fn clear_all(&mut self) {
        self.interaction = Interaction::Idle;
        self.last_snap = None;
        self.selection.clear();
        self.scene.clear();
        self.commit("Cleared floor plan");
    }

    pub fn can_undo(&self) -> bool {
        self.interaction.is_idle() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.interaction.is_idle() && self.history.can_redo()
    }

    /// Step back one edit. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.ensure_idle("undo")?;
        let Some(snapshot) = self.history.undo() else {
            return Ok(false);
        };
        self.scene.restore(snapshot);
        self.prune_selection();
        debug!("Undo");
        Ok(true)
    }

    /// Step forward one edit. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.ensure_idle("redo")?;
        let Some(snapshot) = self.history.redo() else {
            return Ok(false);
        };
        self.scene.restore(snapshot);
        self.prune_selection();
        debug!("Redo");
        Ok(true)
    }

    fn prune_selection(&mut self) {
        let scene = &self.scene;
        self.selection.retain(|id| scene.object(id).is_some());
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.view.pan_by(delta);
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    /// Zoom by `factor` keeping the scene point under `anchor` in place.
    pub fn zoom_at(&mut self, factor: f32, anchor: Pos2) {
        self.view.zoom_at(factor, anchor);
    }

    /// Fit all geometry into `canvas`. No-op on an empty scene.
    pub fn zoom_fit(&mut self, canvas: Rect) {
        if let Some(bounds) = self.scene.bounds() {
            self.view.fit(bounds, canvas);
        }
    }

    pub fn to_document(&self) -> SceneDocument {
        let room_points = match &self.interaction {
            Interaction::DrawingRoom { points, .. } => points.clone(),
            _ => Vec::new(),
        };
        SceneDocument::new(self.scene.clone(), room_points, &self.view)
    }

    pub fn save_json(&self) -> PersistenceResult<String> {
        self.to_document().to_json()
    }

    /// Replace everything with `document`. History restarts from it.
    pub fn load_document(&mut self, document: SceneDocument) {
        let view = document.view();
        let SceneDocument {
            scene, room_points, ..
        } = document;

        self.scene = scene;
        self.view = view;
        self.selection.clear();
        self.last_snap = None;
        self.interaction = if room_points.is_empty() {
            Interaction::Idle
        } else {
            self.tool = ToolMode::Room;
            Interaction::DrawingRoom {
                points: room_points,
                cursor: None,
            }
        };
        self.history.reset(self.scene.snapshot());
        info!("Loaded floor plan with {} elements", self.scene.element_count());
    }

    pub fn load_json(&mut self, json: &str) -> PersistenceResult<()> {
        let document = SceneDocument::from_json(json)?;
        self.load_document(document);
        Ok(())
    }

    /// Guide lines for the current snap, in screen space.
    pub fn guides(&self, canvas: Rect) -> Vec<GuideLine> {
        self.last_snap
            .as_ref()
            .map(|snap| guides_for(snap, &self.view, canvas))
            .unwrap_or_default()
    }

    /// Redraw everything into `target`.
    pub fn render<T: RenderTarget + ?Sized>(&self, target: &mut T, assets: &dyn AssetLookup) {
        let guides = self.guides(target.canvas());
        let room_preview = self.interaction.room_preview();
        let options = RenderOptions {
            show_grid: self.settings.show_grid,
            grid_size_mm: self.settings.grid_size_mm,
            show_measurements: self.settings.show_measurements,
            measurement: self.settings.measurement_format(),
            selection: &self.selection,
            guides: &guides,
            room_preview: &room_preview,
            marquee: self.interaction.marquee(),
            overlap_hints: self.settings.overlap_hints,
        };
        render_scene(target, &self.scene, &self.view, &options, assets);
    }
}
