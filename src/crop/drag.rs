/// Pointer-drag controller for the crop rectangle
///
/// Small state machine: Idle -> Dragging -> Idle. The press captures the
/// offset between the pointer and the rectangle origin; every move applies
/// the latest pointer position minus that offset, clamped to the image.
/// Moves are last-write-wins, nothing is queued or debounced.

use super::{CropArea, DisplayImage};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        offset_x: f32,
        offset_y: f32,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Begin a drag, capturing the pointer-to-rectangle offset
    ///
    /// Presses outside the rectangle are ignored so a stray click on the
    /// image does not teleport the crop area.
    pub fn press(&mut self, px: f32, py: f32, area: &CropArea) -> bool {
        let inside = px >= area.x
            && px <= area.x + area.width
            && py >= area.y
            && py <= area.y + area.height;
        if !inside {
            return false;
        }

        self.state = DragState::Dragging {
            offset_x: px - area.x,
            offset_y: py - area.y,
        };
        true
    }

    /// Apply a pointer move, returning the clamped new top-left
    ///
    /// Returns `None` while idle; drags received outside an active press are
    /// ignored rather than applied.
    pub fn drag(&self, px: f32, py: f32, area: &CropArea, image: &DisplayImage) -> Option<(f32, f32)> {
        let DragState::Dragging { offset_x, offset_y } = self.state else {
            return None;
        };

        let x = (px - offset_x).clamp(0.0, (image.display_width - area.width).max(0.0));
        let y = (py - offset_y).clamp(0.0, (image.display_height - area.height).max(0.0));
        Some((x, y))
    }

    pub fn release(&mut self) {
        self.state = DragState::Idle;
    }
}
