use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::measurement::PLAN_SCALE;

pub const DEFAULT_SCALE: f32 = 0.5;
pub const ZOOM_STEP: f32 = 1.2;
pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 3.0;
/// Screen margin kept around the scene by zoom-to-fit
pub const FIT_MARGIN_PX: f32 = 40.0;

/// Pan and zoom of the drawing surface.
///
/// `scale` is in screen pixels per millimeter. Scene geometry is stored at
/// [`PLAN_SCALE`]; on screen it is magnified by [`ViewState::zoom`] and
/// then translated by `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub scale: f32,
    pub offset: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            offset: Vec2::ZERO,
        }
    }
}

impl ViewState {
    pub fn with_scale(scale: f32) -> Self {
        Self {
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
            offset: Vec2::ZERO,
        }
    }

    /// Screen pixels per scene pixel
    pub fn zoom(&self) -> f32 {
        self.scale / PLAN_SCALE
    }

    pub fn scene_to_screen(&self, point: Pos2) -> Pos2 {
        (point.to_vec2() * self.zoom() + self.offset).to_pos2()
    }

    pub fn screen_to_scene(&self, point: Pos2) -> Pos2 {
        ((point.to_vec2() - self.offset) / self.zoom()).to_pos2()
    }

    /// A screen-space length expressed in scene pixels
    pub fn screen_to_scene_len(&self, length: f32) -> f32 {
        length / self.zoom()
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale / ZOOM_STEP);
    }

    /// Zoom by `factor`, keeping the scene point under `anchor` in place.
    pub fn zoom_at(&mut self, factor: f32, anchor: Pos2) {
        let fixed = self.screen_to_scene(anchor);
        self.set_scale(self.scale * factor);
        self.offset = anchor.to_vec2() - fixed.to_vec2() * self.zoom();
    }

    /// Change the scale, keeping the screen origin of the scene in place.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Centre `bounds` (scene coordinates) in `canvas`, zooming so it fills
    /// the canvas minus a margin.
    pub fn fit(&mut self, bounds: Rect, canvas: Rect) {
        let available = (canvas.size() - Vec2::splat(2.0 * FIT_MARGIN_PX)).max(Vec2::splat(1.0));
        let size = bounds.size().max(Vec2::splat(1.0));
        let zoom = (available.x / size.x).min(available.y / size.y);

        self.set_scale(zoom * PLAN_SCALE);
        self.offset = canvas.center().to_vec2() - bounds.center().to_vec2() * self.zoom();
    }
}
