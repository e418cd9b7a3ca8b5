// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLOv8

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Target size for the YOLOv8 detector
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Gray value used for letterbox padding
pub const PAD_VALUE: u8 = 114;

/// Geometry of a letterbox transform, used to map boxes back to the source image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale applied to the source image
    pub scale: f32,
    /// Horizontal padding (left) in model input pixels
    pub pad_x: f32,
    /// Vertical padding (top) in model input pixels
    pub pad_y: f32,
    /// Source image width
    pub source_width: u32,
    /// Source image height
    pub source_height: u32,
}

impl Letterbox {
    /// Map a point in model input space back to source pixels, clamped to the image
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        let sx = ((x - self.pad_x) / self.scale).clamp(0.0, self.source_width as f32);
        let sy = ((y - self.pad_y) / self.scale).clamp(0.0, self.source_height as f32);
        (sx, sy)
    }
}

/// Resize keeping aspect ratio, then pad to a square with gray
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();

    // Handle edge cases
    if orig_w == 0 || orig_h == 0 {
        let canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
        let geometry = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            source_width: orig_w,
            source_height: orig_h,
        };
        return (canvas, geometry);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);

    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image
        .resize_exact(new_w, new_h, image::imageops::FilterType::Triangle)
        .to_rgb8();

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;

    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
    for y in 0..new_h {
        for x in 0..new_w {
            canvas.put_pixel(x + offset_x, y + offset_y, *resized.get_pixel(x, y));
        }
    }

    let geometry = Letterbox {
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
        source_width: orig_w,
        source_height: orig_h,
    };

    (canvas, geometry)
}

/// Preprocess an image for YOLOv8
///
/// Steps:
/// 1. Letterbox to YOLO_INPUT_SIZE x YOLO_INPUT_SIZE
/// 2. Scale pixels to [0, 1] (no mean/std normalization)
/// 3. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_yolo(image: &DynamicImage) -> (Array4<f32>, Letterbox) {
    let (canvas, geometry) = letterbox(image, YOLO_INPUT_SIZE);

    let size = YOLO_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, geometry)
}
