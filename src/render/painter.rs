use egui::epaint::Vertex;
use egui::{Align2, Color32, Context, FontId, Mesh, Painter, Pos2, Rect, Shape, Stroke};

use super::RenderTarget;
use crate::assets::AssetStore;
use crate::texture_manager::TextureManager;

/// [`RenderTarget`] that paints with egui.
///
/// Polygons are filled as convex shapes; concave room outlines keep a
/// correct border but their fill follows egui's convex tessellation.
pub struct PainterTarget<'a> {
    painter: &'a Painter,
    ctx: &'a Context,
    textures: &'a mut TextureManager,
    assets: &'a AssetStore,
}

impl<'a> PainterTarget<'a> {
    pub fn new(
        painter: &'a Painter,
        ctx: &'a Context,
        textures: &'a mut TextureManager,
        assets: &'a AssetStore,
    ) -> Self {
        Self {
            painter,
            ctx,
            textures,
            assets,
        }
    }
}

impl RenderTarget for PainterTarget<'_> {
    fn canvas(&self) -> Rect {
        self.painter.clip_rect()
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.painter.rect_filled(rect, 0.0, color);
    }

    fn line(&mut self, points: [Pos2; 2], stroke: Stroke) {
        self.painter.line_segment(points, stroke);
    }

    fn dashed_line(&mut self, points: [Pos2; 2], stroke: Stroke, dash: f32, gap: f32) {
        self.painter
            .extend(Shape::dashed_line(&points, stroke, dash, gap));
    }

    fn polyline(&mut self, points: &[Pos2], stroke: Stroke) {
        if points.len() >= 2 {
            self.painter.add(Shape::line(points.to_vec(), stroke));
        }
    }

    fn polygon(&mut self, points: &[Pos2], fill: Color32, stroke: Stroke) {
        if points.len() >= 3 {
            self.painter
                .add(Shape::convex_polygon(points.to_vec(), fill, stroke));
        }
    }

    fn text(&mut self, pos: Pos2, text: &str, size: f32, color: Color32) {
        self.painter
            .text(pos, Align2::CENTER_CENTER, text, FontId::proportional(size), color);
    }

    fn image(&mut self, key: &str, corners: [Pos2; 4]) {
        let Some(texture_id) = self.textures.texture_for(self.ctx, self.assets, key) else {
            return;
        };

        let uvs = [
            Pos2::new(0.0, 0.0),
            Pos2::new(1.0, 0.0),
            Pos2::new(1.0, 1.0),
            Pos2::new(0.0, 1.0),
        ];
        let mut mesh = Mesh::with_texture(texture_id);
        for (pos, uv) in corners.into_iter().zip(uvs) {
            mesh.vertices.push(Vertex {
                pos,
                uv,
                color: Color32::WHITE,
            });
        }
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        self.painter.add(Shape::mesh(mesh));
    }
}
