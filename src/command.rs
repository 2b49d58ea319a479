use serde::{Deserialize, Serialize};

/// Actions offered by the canvas header, executed against a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Empty the canvas
    Clear,
    /// Switch to the next palette color for future strokes
    CycleColor,
    /// Switch to the next width for future strokes
    CycleWidth,
    /// Remove the most recent stroke
    Undo,
}

impl Command {
    pub const ALL: [Command; 4] = [Self::Clear, Self::CycleColor, Self::CycleWidth, Self::Undo];

    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::CycleColor => "Color",
            Self::CycleWidth => "Width",
            Self::Undo => "Undo",
        }
    }
}
