/// Crop geometry for the photo wizard
///
/// Everything in here works in displayed-image pixel coordinates:
/// - aspect.rs maps the named ratios to numbers and output sizes
/// - area.rs fits and clamps the crop rectangle
/// - drag.rs turns pointer movement into a clamped rectangle position
/// - stepper.rs grows/shrinks the rectangle in fixed steps
/// - output.rs maps the rectangle back to source pixels and encodes the result

pub mod area;
pub mod aspect;
pub mod drag;
pub mod output;
pub mod stepper;

pub use area::{CropArea, DisplayImage};
pub use aspect::AspectRatio;

/// How much of the image the crop rectangle may cover, per axis
pub const MAX_COVERAGE: f32 = 0.9;

/// Smallest allowed crop rectangle width in display pixels
pub const MIN_CROP_WIDTH: f32 = 60.0;

/// Window-size dependent layout mode
///
/// Compact is the phone-ish layout (narrow window); Wide is everything else.
/// The layout picks the container cap for the initial fit and the step size
/// for the +/- size buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Compact,
    Wide,
}

impl Layout {
    /// Logical window width below which we switch to the compact layout
    pub const COMPACT_BREAKPOINT: f32 = 640.0;

    pub fn from_window_width(width: f32) -> Self {
        if width < Self::COMPACT_BREAKPOINT {
            Layout::Compact
        } else {
            Layout::Wide
        }
    }

    /// Cap on the initial crop container width, in display pixels
    pub fn max_container_width(self) -> f32 {
        match self {
            Layout::Compact => 250.0,
            Layout::Wide => 300.0,
        }
    }

    /// Pixel step used by the size stepper
    pub fn size_step(self) -> f32 {
        match self {
            Layout::Compact => 15.0,
            Layout::Wide => 20.0,
        }
    }

    /// Widest on-screen rendering of the source image
    pub fn max_display_width(self) -> f32 {
        match self {
            Layout::Compact => 320.0,
            Layout::Wide => 480.0,
        }
    }
}
