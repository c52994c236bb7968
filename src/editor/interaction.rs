use egui::{Pos2, Rect, Vec2};

/// What the pointer is in the middle of. Anything but `Idle` blocks tool
/// switches and history commands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Moving a placed object
    Dragging {
        object_id: String,
        /// Object center minus the pointer position at grab time
        grab_offset: Vec2,
        moved: bool,
    },
    /// The wall being drawn is already in the scene; only its end moves
    DrawingWall { wall_id: String },
    /// Open room outline. `cursor` is the rubber-band point.
    DrawingRoom {
        points: Vec<Pos2>,
        cursor: Option<Pos2>,
    },
    /// Screen position of the last pan step
    Panning { last: Pos2 },
    /// Marquee selection, in screen space
    Selecting {
        start: Pos2,
        current: Pos2,
        additive: bool,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging an object",
            Self::DrawingWall { .. } => "drawing a wall",
            Self::DrawingRoom { .. } => "drawing a room",
            Self::Panning { .. } => "panning",
            Self::Selecting { .. } => "selecting",
        }
    }

    /// Room outline to preview: buffered vertices plus the rubber-band point.
    pub fn room_preview(&self) -> Vec<Pos2> {
        match self {
            Self::DrawingRoom { points, cursor } => {
                points.iter().copied().chain(*cursor).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn marquee(&self) -> Option<Rect> {
        match self {
            Self::Selecting { start, current, .. } => Some(Rect::from_two_pos(*start, *current)),
            _ => None,
        }
    }
}
