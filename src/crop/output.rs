/// Render-to-output transform
///
/// Maps the on-screen crop rectangle back to source-image pixels via the
/// display->natural scale factors, crops, resamples into the ratio's fixed
/// output canvas, and encodes a JPEG. The work is CPU-bound so it runs under
/// `spawn_blocking`; the result carries the generation stamp of the crop
/// session that requested it so the caller can discard stale completions.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;
use thiserror::Error;

use super::{AspectRatio, CropArea, DisplayImage};

/// Fixed JPEG quality for cropped output (matches a 0.9 canvas quality)
pub const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to decode source image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode cropped output: {0}")]
    Encode(image::ImageError),
    #[error("the original ratio has no output canvas")]
    UncroppableRatio,
    #[error("background render task failed: {0}")]
    Join(String),
}

/// Everything the background render needs, detached from UI state
#[derive(Debug, Clone)]
pub struct CropRequest {
    pub file_id: String,
    /// Crop-session generation at the time the render was requested
    pub generation: u64,
    pub source: Vec<u8>,
    pub area: CropArea,
    pub image: DisplayImage,
    pub ratio: AspectRatio,
}

/// Completed render, successful or not
///
/// A failed encode leaves `jpeg` as `None`; the wizard treats that as a
/// logged no-op and the file stays unprocessed.
#[derive(Debug, Clone)]
pub struct CropRendered {
    pub file_id: String,
    pub generation: u64,
    pub ratio: AspectRatio,
    pub jpeg: Option<Vec<u8>>,
}

/// Render a crop request on a blocking worker thread
pub async fn render_output(request: CropRequest) -> CropRendered {
    let file_id = request.file_id.clone();
    let generation = request.generation;
    let ratio = request.ratio;

    let result = tokio::task::spawn_blocking(move || render_blocking(&request))
        .await
        .map_err(|e| RenderError::Join(e.to_string()))
        .and_then(|inner| inner);

    let jpeg = match result {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            eprintln!("⚠️  Crop render failed for {}: {}", file_id, e);
            None
        }
    };

    CropRendered {
        file_id,
        generation,
        ratio,
        jpeg,
    }
}

/// Blocking implementation of the crop render
pub fn render_blocking(request: &CropRequest) -> Result<Vec<u8>, RenderError> {
    let config = request.ratio.config().ok_or(RenderError::UncroppableRatio)?;

    let source = image::load_from_memory(&request.source).map_err(RenderError::Decode)?;

    // Map the display-space rectangle into natural pixel coordinates
    let (scale_x, scale_y) = request.image.scale_factors();
    let src_x = (request.area.x * scale_x).round().max(0.0) as u32;
    let src_y = (request.area.y * scale_y).round().max(0.0) as u32;
    let src_w = (request.area.width * scale_x).round() as u32;
    let src_h = (request.area.height * scale_y).round() as u32;

    // Rounding can push the source rectangle a pixel past the edge
    let src_x = src_x.min(request.image.natural_width.saturating_sub(1));
    let src_y = src_y.min(request.image.natural_height.saturating_sub(1));
    let src_w = src_w.min(request.image.natural_width - src_x).max(1);
    let src_h = src_h.min(request.image.natural_height - src_y).max(1);

    let cropped = source.crop_imm(src_x, src_y, src_w, src_h);
    let resampled = cropped.resize_exact(
        config.output_width,
        config.output_height,
        FilterType::Lanczos3,
    );

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    resampled
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(RenderError::Encode)?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::Layout;
    use image::GenericImageView;

    /// Build an in-memory PNG with a solid color
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]));
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn request(area: CropArea, ratio: AspectRatio) -> CropRequest {
        CropRequest {
            file_id: "file-1".to_string(),
            generation: 1,
            source: png_bytes(640, 480),
            image: DisplayImage::new(640, 480, Layout::Wide),
            area,
            ratio,
        }
    }

    #[test]
    fn render_produces_fixed_output_canvas() {
        let area = CropArea {
            x: 20.0,
            y: 20.0,
            width: 120.0,
            height: 120.0,
        };
        let jpeg = render_blocking(&request(area, AspectRatio::Square)).unwrap();

        let output = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(output.width(), 800);
        assert_eq!(output.height(), 800);
    }

    #[test]
    fn render_portrait_uses_portrait_canvas() {
        let area = CropArea {
            x: 10.0,
            y: 10.0,
            width: 90.0,
            height: 120.0,
        };
        let jpeg = render_blocking(&request(area, AspectRatio::Portrait)).unwrap();

        let output = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((output.width(), output.height()), (600, 800));
    }

    #[test]
    fn render_rejects_original_ratio() {
        let area = CropArea {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let err = render_blocking(&request(area, AspectRatio::Original)).unwrap_err();
        assert!(matches!(err, RenderError::UncroppableRatio));
    }

    #[test]
    fn render_survives_edge_touching_rectangle() {
        // Rectangle flush against the bottom-right corner; rounding must not
        // push the source crop out of the natural bounds.
        let img = DisplayImage::new(640, 480, Layout::Wide);
        let area = CropArea {
            x: img.display_width - 100.0,
            y: img.display_height - 100.0,
            width: 100.0,
            height: 100.0,
        };
        let mut req = request(area, AspectRatio::Square);
        req.image = img;
        assert!(render_blocking(&req).is_ok());
    }

    #[tokio::test]
    async fn failed_decode_becomes_logged_noop() {
        let req = CropRequest {
            file_id: "file-2".to_string(),
            generation: 7,
            source: vec![0, 1, 2, 3],
            image: DisplayImage::new(100, 100, Layout::Wide),
            area: CropArea {
                x: 0.0,
                y: 0.0,
                width: 60.0,
                height: 60.0,
            },
            ratio: AspectRatio::Square,
        };
        let rendered = render_output(req).await;
        assert_eq!(rendered.generation, 7);
        assert!(rendered.jpeg.is_none());
    }
}
