use egui::{Color32, Pos2, Rect, Stroke};

/// Drawing surface the scene pipeline renders into.
///
/// All coordinates are screen space. Implemented over an egui painter for
/// the live canvas and by [`RecordingTarget`] for tests.
pub trait RenderTarget {
    /// The visible drawing area
    fn canvas(&self) -> Rect;

    fn fill_rect(&mut self, rect: Rect, color: Color32);

    fn line(&mut self, points: [Pos2; 2], stroke: Stroke);

    fn dashed_line(&mut self, points: [Pos2; 2], stroke: Stroke, dash: f32, gap: f32);

    /// Open polyline; repeat the first point to close it
    fn polyline(&mut self, points: &[Pos2], stroke: Stroke);

    fn polygon(&mut self, points: &[Pos2], fill: Color32, stroke: Stroke);

    /// Text centered on `pos`
    fn text(&mut self, pos: Pos2, text: &str, size: f32, color: Color32);

    /// Draw the image registered under `key` mapped onto a quad given in
    /// top-left, top-right, bottom-right, bottom-left order.
    fn image(&mut self, key: &str, corners: [Pos2; 4]);
}

/// One recorded call on a [`RecordingTarget`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    FillRect {
        rect: Rect,
        color: Color32,
    },
    Line {
        points: [Pos2; 2],
        stroke: Stroke,
    },
    DashedLine {
        points: [Pos2; 2],
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Pos2>,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Pos2>,
        fill: Color32,
        stroke: Stroke,
    },
    Text {
        pos: Pos2,
        text: String,
        size: f32,
        color: Color32,
    },
    Image {
        key: String,
        corners: [Pos2; 4],
    },
}

/// A fake render target that records every draw call
#[derive(Debug, Clone)]
pub struct RecordingTarget {
    canvas: Rect,
    pub calls: Vec<DrawCall>,
}

impl RecordingTarget {
    pub fn new(canvas: Rect) -> Self {
        Self {
            canvas,
            calls: Vec::new(),
        }
    }

    /// Hand back the recorded calls and start a fresh recording.
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl RenderTarget for RecordingTarget {
    fn canvas(&self) -> Rect {
        self.canvas
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.calls.push(DrawCall::FillRect { rect, color });
    }

    fn line(&mut self, points: [Pos2; 2], stroke: Stroke) {
        self.calls.push(DrawCall::Line { points, stroke });
    }

    fn dashed_line(&mut self, points: [Pos2; 2], stroke: Stroke, _dash: f32, _gap: f32) {
        self.calls.push(DrawCall::DashedLine { points, stroke });
    }

    fn polyline(&mut self, points: &[Pos2], stroke: Stroke) {
        self.calls.push(DrawCall::Polyline {
            points: points.to_vec(),
            stroke,
        });
    }

    fn polygon(&mut self, points: &[Pos2], fill: Color32, stroke: Stroke) {
        self.calls.push(DrawCall::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
        });
    }

    fn text(&mut self, pos: Pos2, text: &str, size: f32, color: Color32) {
        self.calls.push(DrawCall::Text {
            pos,
            text: text.to_owned(),
            size,
            color,
        });
    }

    fn image(&mut self, key: &str, corners: [Pos2; 4]) {
        self.calls.push(DrawCall::Image {
            key: key.to_owned(),
            corners,
        });
    }
}
