use crate::stroke::MutableStroke;

/// Gesture state of the stroke model
#[derive(Debug, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// A pointer is down and `stroke` follows it
    Active { stroke: MutableStroke },
}

impl GestureState {
    pub fn active_stroke(&self) -> Option<&MutableStroke> {
        match self {
            Self::Active { stroke } => Some(stroke),
            Self::Idle => None,
        }
    }

    pub fn active_stroke_mut(&mut self) -> Option<&mut MutableStroke> {
        match self {
            Self::Active { stroke } => Some(stroke),
            Self::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Leave the active state, handing back the stroke that was being drawn
    pub fn take_stroke(&mut self) -> Option<MutableStroke> {
        match std::mem::take(self) {
            Self::Active { stroke } => Some(stroke),
            Self::Idle => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active { .. } => "drawing a stroke",
        }
    }
}
