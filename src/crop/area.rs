/// Crop rectangle fitting and clamping
///
/// The crop rectangle lives in displayed-image pixel coordinates. Fitting
/// always produces a centered rectangle; changing the ratio recomputes from
/// scratch and deliberately discards any position the user dragged to.

use super::{AspectRatio, Layout, MAX_COVERAGE};

/// Display and natural dimensions of the image being cropped
///
/// Display dimensions are the natural dimensions scaled down to the layout's
/// maximum on-screen width. The natural dimensions drive the output transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayImage {
    pub display_width: f32,
    pub display_height: f32,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl DisplayImage {
    /// Derive display dimensions from the source size and layout cap
    pub fn new(natural_width: u32, natural_height: u32, layout: Layout) -> Self {
        let max_width = layout.max_display_width();
        let natural_w = natural_width as f32;
        let natural_h = natural_height as f32;

        let (display_width, display_height) = if natural_w > max_width {
            let scale = max_width / natural_w;
            (max_width, natural_h * scale)
        } else {
            (natural_w, natural_h)
        };

        DisplayImage {
            display_width,
            display_height,
            natural_width,
            natural_height,
        }
    }

    /// Scale factors mapping display coordinates back to natural pixels
    pub fn scale_factors(&self) -> (f32, f32) {
        (
            self.natural_width as f32 / self.display_width,
            self.natural_height as f32 / self.display_height,
        )
    }
}

/// The user-adjustable crop rectangle in display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropArea {
    /// Compute the initial centered rectangle for a ratio
    ///
    /// Candidate width is 70% of the display width capped by the layout's
    /// container maximum; both dimensions are then clamped to 90% of the
    /// image, preserving the ratio by taking whichever of the width- or
    /// height-constrained candidates is smaller.
    pub fn fit(image: &DisplayImage, ratio: AspectRatio, layout: Layout) -> Option<CropArea> {
        let config = ratio.config()?;

        let candidate_width =
            (0.7 * image.display_width).min(layout.max_container_width());

        let max_width = MAX_COVERAGE * image.display_width;
        let max_height = MAX_COVERAGE * image.display_height;

        // Width-constrained candidate
        let w1 = candidate_width.min(max_width);
        // Height-constrained candidate
        let h2 = (candidate_width / config.ratio).min(max_height);
        let w2 = h2 * config.ratio;

        let width = w1.min(w2);
        let height = width / config.ratio;

        let mut area = CropArea {
            x: 0.0,
            y: 0.0,
            width,
            height,
        };
        area.center_in(image);
        Some(area)
    }

    /// Center point of the rectangle
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Move the rectangle so its center lands on the given point
    pub fn center_on(&mut self, cx: f32, cy: f32) {
        self.x = cx - self.width / 2.0;
        self.y = cy - self.height / 2.0;
    }

    /// Center the rectangle within the image
    pub fn center_in(&mut self, image: &DisplayImage) {
        self.center_on(image.display_width / 2.0, image.display_height / 2.0);
    }

    /// Clamp the rectangle's position so it stays inside the image
    ///
    /// Each axis is clamped independently to [0, display_dim - rect_dim].
    pub fn clamp_to(&mut self, image: &DisplayImage) {
        self.x = self.x.clamp(0.0, (image.display_width - self.width).max(0.0));
        self.y = self
            .y
            .clamp(0.0, (image.display_height - self.height).max(0.0));
    }

    /// Whether the rectangle lies fully inside the image
    pub fn is_within(&self, image: &DisplayImage) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= image.display_width + 1e-3
            && self.y + self.height <= image.display_height + 1e-3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(w: f32, h: f32) -> DisplayImage {
        DisplayImage {
            display_width: w,
            display_height: h,
            natural_width: (w * 4.0) as u32,
            natural_height: (h * 4.0) as u32,
        }
    }

    #[test]
    fn fit_matches_ratio_and_stays_inside() {
        let img = image(480.0, 360.0);
        for ratio in AspectRatio::CROPPABLE {
            let config = ratio.config().unwrap();
            let area = CropArea::fit(&img, ratio, Layout::Wide).unwrap();

            assert!((area.width / area.height - config.ratio).abs() < 1e-4);
            assert!(area.is_within(&img));
        }
    }

    #[test]
    fn fit_square_in_landscape_image_uses_height_limit() {
        // 400x300 display, square ratio: the 90%-height path wins, so the
        // rectangle is 270x270 and centered.
        let img = image(400.0, 300.0);
        let area = CropArea::fit(&img, AspectRatio::Square, Layout::Wide).unwrap();

        assert!((area.width - area.height).abs() < 1e-4);
        assert!(area.width <= 270.0 + 1e-4);
        assert!((area.x - (400.0 - area.width) / 2.0).abs() < 1e-4);
        assert!((area.y - (300.0 - area.width) / 2.0).abs() < 1e-4);
    }

    #[test]
    fn fit_respects_compact_container_cap() {
        let img = image(480.0, 480.0);
        // 0.7 * 480 = 336, capped at 250 by the compact layout
        let area = CropArea::fit(&img, AspectRatio::Square, Layout::Compact).unwrap();
        assert!((area.width - 250.0).abs() < 1e-4);
    }

    #[test]
    fn fit_original_is_none() {
        let img = image(400.0, 300.0);
        assert!(CropArea::fit(&img, AspectRatio::Original, Layout::Wide).is_none());
    }

    #[test]
    fn clamp_pulls_rectangle_back_inside() {
        let img = image(400.0, 300.0);
        let mut area = CropArea {
            x: 390.0,
            y: -25.0,
            width: 100.0,
            height: 100.0,
        };
        area.clamp_to(&img);
        assert_eq!(area.x, 300.0);
        assert_eq!(area.y, 0.0);
        assert!(area.is_within(&img));
    }

    #[test]
    fn display_image_scales_down_to_layout_cap() {
        let img = DisplayImage::new(1600, 1200, Layout::Wide);
        assert_eq!(img.display_width, 480.0);
        assert_eq!(img.display_height, 360.0);

        let (sx, sy) = img.scale_factors();
        assert!((sx - 1600.0 / 480.0).abs() < 1e-4);
        assert!((sy - 1200.0 / 360.0).abs() < 1e-4);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let img = DisplayImage::new(200, 150, Layout::Wide);
        assert_eq!(img.display_width, 200.0);
        assert_eq!(img.display_height, 150.0);
    }
}
