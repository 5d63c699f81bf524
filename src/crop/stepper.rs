/// Fixed-step grow/shrink for the crop rectangle
///
/// Growth satisfies width first; when the derived height would pass 90% of
/// the image height the rectangle is instead rebuilt as the largest
/// ratio-preserving rectangle bounded by that height. Without this fallback
/// repeated growth would thrash against the height limit. Both directions
/// re-center on the previous center and clamp to the image.

use super::{AspectRatio, CropArea, DisplayImage, Layout, MAX_COVERAGE, MIN_CROP_WIDTH};

/// Whether the grow button should be enabled for this rectangle
pub fn can_increase(area: &CropArea, image: &DisplayImage) -> bool {
    area.width < MAX_COVERAGE * image.display_width
}

/// Whether the shrink button should be enabled for this rectangle
pub fn can_decrease(area: &CropArea) -> bool {
    area.width > MIN_CROP_WIDTH
}

/// Grow the rectangle by one step, preserving ratio and center
///
/// No-op once the width has reached 90% of the image display width.
pub fn increase(
    area: &CropArea,
    image: &DisplayImage,
    ratio: AspectRatio,
    layout: Layout,
) -> CropArea {
    let Some(config) = ratio.config() else {
        return *area;
    };

    let max_width = MAX_COVERAGE * image.display_width;
    if area.width >= max_width {
        return *area;
    }

    let max_height = MAX_COVERAGE * image.display_height;
    let mut width = (area.width + layout.size_step()).min(max_width);
    let mut height = width / config.ratio;

    if height > max_height {
        // Height-bounded fallback: largest ratio-preserving rectangle
        // under the 90% height cap
        height = max_height;
        width = height * config.ratio;
    }

    resized(area, image, width, height)
}

/// Shrink the rectangle by one step, flooring the width at 60px
pub fn decrease(
    area: &CropArea,
    image: &DisplayImage,
    ratio: AspectRatio,
    layout: Layout,
) -> CropArea {
    let Some(config) = ratio.config() else {
        return *area;
    };

    if area.width <= MIN_CROP_WIDTH {
        return *area;
    }

    let width = (area.width - layout.size_step()).max(MIN_CROP_WIDTH);
    let height = width / config.ratio;

    resized(area, image, width, height)
}

/// Build the resized rectangle around the previous center, clamped to bounds
fn resized(previous: &CropArea, image: &DisplayImage, width: f32, height: f32) -> CropArea {
    let (cx, cy) = previous.center();
    let mut area = CropArea {
        x: 0.0,
        y: 0.0,
        width,
        height,
    };
    area.center_on(cx, cy);
    area.clamp_to(image);
    area
}
