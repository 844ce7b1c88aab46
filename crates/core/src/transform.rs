//! Rotate/crop raster transforms for scanned cheques (PRD-34).
//!
//! Scans arrive skewed or upside down; users rotate in degree steps and
//! crop to the cheque area before attaching. Rotation and cropping are
//! two independent, sequential steps: rotate first, then crop in the
//! rotated coordinate space.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Bounds math
// ---------------------------------------------------------------------------

/// Bounding box of a `width` x `height` image rotated by `degrees`:
/// `w' = w*|cos t| + h*|sin t|`, `h' = w*|sin t| + h*|cos t|`, rounded.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let w = f64::from(width);
    let h = f64::from(height);
    let out_w = (w * cos + h * sin).round() as u32;
    let out_h = (w * sin + h * cos).round() as u32;
    (out_w.max(1), out_h.max(1))
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// Rotate by `degrees` around the image center, resizing the canvas to
/// the rotated bounding box.
///
/// The angle is taken modulo 360; negative values rotate left. Exact
/// right angles take the lossless fast path. Arbitrary angles sample by
/// inverse mapping with nearest-neighbor lookup; uncovered corners stay
/// transparent.
pub fn rotate(source: &DynamicImage, degrees: f64) -> DynamicImage {
    let degrees = degrees.rem_euclid(360.0);
    if degrees == 0.0 {
        return source.clone();
    }
    if degrees == 90.0 {
        return source.rotate90();
    }
    if degrees == 180.0 {
        return source.rotate180();
    }
    if degrees == 270.0 {
        return source.rotate270();
    }

    let rgba = source.to_rgba8();
    let (src_w, src_h) = rgba.dimensions();
    let (dst_w, dst_h) = rotated_bounds(src_w, src_h, degrees);

    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin(), radians.cos());
    let src_cx = f64::from(src_w) / 2.0;
    let src_cy = f64::from(src_h) / 2.0;
    let dst_cx = f64::from(dst_w) / 2.0;
    let dst_cy = f64::from(dst_h) / 2.0;

    let mut out = RgbaImage::from_pixel(dst_w, dst_h, Rgba([0, 0, 0, 0]));
    for y in 0..dst_h {
        for x in 0..dst_w {
            // Map the destination pixel center back into source space
            // (inverse rotation, i.e. by -degrees).
            let dx = f64::from(x) + 0.5 - dst_cx;
            let dy = f64::from(y) + 0.5 - dst_cy;
            let sx = (dx * cos + dy * sin + src_cx).floor();
            let sy = (-dx * sin + dy * cos + src_cy).floor();
            if sx >= 0.0 && sy >= 0.0 && sx < f64::from(src_w) && sy < f64::from(src_h) {
                out.put_pixel(x, y, *rgba.get_pixel(sx as u32, sy as u32));
            }
        }
    }
    DynamicImage::ImageRgba8(out)
}

// ---------------------------------------------------------------------------
// Cropping
// ---------------------------------------------------------------------------

/// A crop region in normalized coordinates (fractions of the image
/// dimensions, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Valid when the region has positive area and lies within [0, 1].
    pub fn is_valid(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.x + self.width <= 1.0
            && self.y + self.height <= 1.0
    }
}

/// Crop to a normalized region, scaling it to pixel space first.
pub fn crop_normalized(source: &DynamicImage, rect: CropRect) -> Result<DynamicImage, CoreError> {
    if !rect.is_valid() {
        return Err(CoreError::Validation(format!(
            "crop region out of bounds: {rect:?}"
        )));
    }
    let w = f64::from(source.width());
    let h = f64::from(source.height());
    // Rounding may push the region one pixel past the edge; clamp the
    // origin first, then the size.
    let px = ((rect.x * w).round() as u32).min(source.width().saturating_sub(1));
    let py = ((rect.y * h).round() as u32).min(source.height().saturating_sub(1));
    let pw = (((rect.width * w).round() as u32).max(1)).min(source.width() - px);
    let ph = (((rect.height * h).round() as u32).max(1)).min(source.height() - py);
    Ok(source.crop_imm(px, py, pw, ph))
}

// ---------------------------------------------------------------------------
// Byte-level entry point
// ---------------------------------------------------------------------------

/// Map a file extension to the output encoding.
pub fn format_for_extension(extension: &str) -> Result<ImageFormat, CoreError> {
    match extension.to_lowercase().as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "webp" => Ok(ImageFormat::WebP),
        other => Err(CoreError::UnsupportedFormat(other.to_string())),
    }
}

/// Decode, rotate, optionally crop, re-encode.
pub fn transform_bytes(
    bytes: &[u8],
    degrees: f64,
    crop: Option<CropRect>,
    format: ImageFormat,
) -> Result<Vec<u8>, CoreError> {
    let decoded = image::load_from_memory(bytes)?;
    let rotated = rotate(&decoded, degrees);
    let result = match crop {
        Some(rect) => crop_normalized(&rotated, rect)?,
        None => rotated,
    };
    // JPEG has no alpha channel; flatten before encoding.
    let result = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(result.to_rgb8())
    } else {
        result
    };
    let mut out = Vec::new();
    result.write_to(&mut Cursor::new(&mut out), format)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- rotated_bounds tests --

    #[test]
    fn test_bounds_right_angle_swaps_dimensions() {
        assert_eq!(rotated_bounds(100, 50, 90.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, 270.0), (50, 100));
    }

    #[test]
    fn test_bounds_zero_and_half_turn_keep_dimensions() {
        assert_eq!(rotated_bounds(100, 50, 0.0), (100, 50));
        assert_eq!(rotated_bounds(100, 50, 180.0), (100, 50));
    }

    #[test]
    fn test_bounds_forty_five_degrees_grow() {
        let (w, h) = rotated_bounds(100, 100, 45.0);
        assert_eq!((w, h), (141, 141));
    }

    // -- rotate tests --

    fn checker() -> DynamicImage {
        let mut img = RgbaImage::from_pixel(4, 2, Rgba([255, 255, 255, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(3, 1, Rgba([0, 0, 255, 255]));
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_rotate_right_angle_dimensions() {
        let rotated = rotate(&checker(), 90.0);
        assert_eq!((rotated.width(), rotated.height()), (2, 4));
    }

    #[test]
    fn test_rotate_negative_equals_complement() {
        let left = rotate(&checker(), -90.0);
        let right = rotate(&checker(), 270.0);
        assert_eq!(left.to_rgba8(), right.to_rgba8());
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let rotated = rotate(&checker(), 0.0);
        assert_eq!(rotated.to_rgba8(), checker().to_rgba8());
        let full_turn = rotate(&checker(), 360.0);
        assert_eq!(full_turn.to_rgba8(), checker().to_rgba8());
    }

    #[test]
    fn test_rotate_ninety_moves_corner() {
        let rotated = rotate(&checker(), 90.0).to_rgba8();
        // Top-left source pixel lands in the top-right corner after a
        // clockwise quarter turn.
        assert_eq!(*rotated.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*rotated.get_pixel(0, 3), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_rotate_arbitrary_angle_bounds() {
        let rotated = rotate(&checker(), 45.0);
        let (w, h) = rotated_bounds(4, 2, 45.0);
        assert_eq!((rotated.width(), rotated.height()), (w, h));
    }

    // -- crop tests --

    #[test]
    fn test_crop_scales_normalized_rect() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(100, 50));
        let rect = CropRect {
            x: 0.25,
            y: 0.2,
            width: 0.5,
            height: 0.6,
        };
        let cropped = crop_normalized(&img, rect).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (50, 30));
    }

    #[test]
    fn test_crop_rejects_out_of_bounds_rect() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(10, 10));
        let rect = CropRect {
            x: 0.8,
            y: 0.0,
            width: 0.5,
            height: 0.5,
        };
        assert!(crop_normalized(&img, rect).is_err());
        let negative = CropRect {
            x: -0.1,
            y: 0.0,
            width: 0.5,
            height: 0.5,
        };
        assert!(crop_normalized(&img, negative).is_err());
    }

    // -- transform_bytes tests --

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 20, 30, 255]),
        ));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_transform_bytes_rotate_and_reencode() {
        let input = png_bytes(4, 2);
        let output = transform_bytes(&input, 90.0, None, ImageFormat::Png).unwrap();
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 4));
    }

    #[test]
    fn test_transform_bytes_rotate_then_crop() {
        let input = png_bytes(8, 4);
        let rect = CropRect {
            x: 0.0,
            y: 0.0,
            width: 0.5,
            height: 0.5,
        };
        // Crop applies in the rotated space: 8x4 becomes 4x8, then halves.
        let output = transform_bytes(&input, 90.0, Some(rect), ImageFormat::Png).unwrap();
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 4));
    }

    #[test]
    fn test_transform_bytes_jpeg_flattens_alpha() {
        let input = png_bytes(4, 4);
        let output = transform_bytes(&input, 0.0, None, ImageFormat::Jpeg).unwrap();
        assert!(image::load_from_memory(&output).is_ok());
    }

    #[test]
    fn test_transform_bytes_rejects_garbage() {
        assert!(transform_bytes(b"not an image", 0.0, None, ImageFormat::Png).is_err());
    }

    // -- format_for_extension tests --

    #[test]
    fn test_format_for_extension() {
        assert_eq!(format_for_extension("png").unwrap(), ImageFormat::Png);
        assert_eq!(format_for_extension("JPG").unwrap(), ImageFormat::Jpeg);
        assert_eq!(format_for_extension("jpeg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(format_for_extension("webp").unwrap(), ImageFormat::WebP);
        assert!(format_for_extension("tiff").is_err());
    }
}
