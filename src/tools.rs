use serde::{Deserialize, Serialize};

/// The active editing tool. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    Select,
    Wall,
    Room,
    Door,
    Text,
    Pan,
    Eraser,
    Rotate,
}

impl ToolMode {
    pub const ALL: [ToolMode; 8] = [
        Self::Select,
        Self::Wall,
        Self::Room,
        Self::Door,
        Self::Text,
        Self::Pan,
        Self::Eraser,
        Self::Rotate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "Select",
            Self::Wall => "Wall",
            Self::Room => "Room",
            Self::Door => "Door",
            Self::Text => "Text",
            Self::Pan => "Pan",
            Self::Eraser => "Eraser",
            Self::Rotate => "Rotate",
        }
    }

    /// Tools whose pointer positions go through snapping
    pub fn snaps(self) -> bool {
        matches!(self, Self::Select | Self::Wall | Self::Room | Self::Door)
    }
}
