use egui::{Pos2, Rect};

use super::{SnapKind, SnapResult};
use crate::view::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideOrientation {
    Horizontal,
    Vertical,
}

/// A transient alignment line in screen space. Never stored in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub orientation: GuideOrientation,
    /// Y for horizontal guides, X for vertical ones
    pub position: f32,
    /// Start and end along the guide's own axis
    pub extent: (f32, f32),
}

impl GuideLine {
    fn horizontal(y: f32, canvas: Rect) -> Self {
        Self {
            orientation: GuideOrientation::Horizontal,
            position: y,
            extent: (canvas.left(), canvas.right()),
        }
    }

    fn vertical(x: f32, canvas: Rect) -> Self {
        Self {
            orientation: GuideOrientation::Vertical,
            position: x,
            extent: (canvas.top(), canvas.bottom()),
        }
    }

    pub fn endpoints(&self) -> [Pos2; 2] {
        match self.orientation {
            GuideOrientation::Horizontal => [
                Pos2::new(self.extent.0, self.position),
                Pos2::new(self.extent.1, self.position),
            ],
            GuideOrientation::Vertical => [
                Pos2::new(self.position, self.extent.0),
                Pos2::new(self.position, self.extent.1),
            ],
        }
    }
}

/// Guides to show for a snap result, spanning the visible `canvas`.
///
/// Grid snaps and unsnapped results produce nothing; the grid itself is
/// already visible.
pub fn guides_for(result: &SnapResult, view: &ViewState, canvas: Rect) -> Vec<GuideLine> {
    if !result.snapped {
        return Vec::new();
    }
    let at = view.scene_to_screen(result.point);
    match result.kind {
        SnapKind::Object => vec![
            GuideLine::vertical(at.x, canvas),
            GuideLine::horizontal(at.y, canvas),
        ],
        SnapKind::AlignHorizontal => vec![GuideLine::horizontal(at.y, canvas)],
        SnapKind::AlignVertical => vec![GuideLine::vertical(at.x, canvas)],
        SnapKind::None
        | SnapKind::Grid
        | SnapKind::WallEndpoint
        | SnapKind::WallMidpoint
        | SnapKind::RoomVertex => Vec::new(),
    }
}
