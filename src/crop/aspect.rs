/// Named aspect ratios offered by the edit step
///
/// The UI only ever offers the three croppable ratios; `Original` is the
/// skip-editing marker and never reaches the fitter or the output transform.

use serde::{Deserialize, Serialize};

/// Aspect ratio selected for a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    /// Untouched image, used by the skip-editing path
    #[default]
    Original,
    Portrait,
    Square,
    Landscape,
}

/// Resolved numbers for one named ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioConfig {
    /// width / height
    pub ratio: f32,
    /// Fixed output canvas width in pixels
    pub output_width: u32,
    /// Fixed output canvas height in pixels
    pub output_height: u32,
    /// Human-readable name shown on the ratio buttons
    pub label: &'static str,
}

impl AspectRatio {
    /// The ratios a user can actually crop to, in button order
    pub const CROPPABLE: [AspectRatio; 3] =
        [AspectRatio::Portrait, AspectRatio::Square, AspectRatio::Landscape];

    /// Resolve a croppable ratio to its numeric configuration
    ///
    /// Returns `None` only for `Original`, which the edit step never offers.
    pub fn config(self) -> Option<RatioConfig> {
        match self {
            AspectRatio::Original => None,
            AspectRatio::Portrait => Some(RatioConfig {
                ratio: 3.0 / 4.0,
                output_width: 600,
                output_height: 800,
                label: "Portrait",
            }),
            AspectRatio::Square => Some(RatioConfig {
                ratio: 1.0,
                output_width: 800,
                output_height: 800,
                label: "Square",
            }),
            AspectRatio::Landscape => Some(RatioConfig {
                ratio: 4.0 / 3.0,
                output_width: 800,
                output_height: 600,
                label: "Landscape",
            }),
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.config() {
            Some(config) => config.label,
            None => "Original",
        };
        write!(f, "{}", label)
    }
}
