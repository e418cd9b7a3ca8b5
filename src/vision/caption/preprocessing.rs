// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the BLIP vision encoder

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;

/// Target size for the BLIP vision encoder
pub const BLIP_INPUT_SIZE: u32 = 384;

/// CLIP normalization mean values (BLIP uses the OpenAI CLIP statistics)
pub const MEAN: [f32; 3] = [0.48145466, 0.4578275, 0.40821073];

/// CLIP normalization std values
pub const STD: [f32; 3] = [0.26862954, 0.26130258, 0.27577711];

/// Preprocess an image for the BLIP encoder
///
/// Steps:
/// 1. Resize to BLIP_INPUT_SIZE x BLIP_INPUT_SIZE (bicubic, aspect ratio not kept)
/// 2. Convert to RGB
/// 3. Normalize with CLIP mean/std: (pixel/255 - mean) / std
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_blip(image: &DynamicImage) -> Array4<f32> {
    preprocess_with_size(image, BLIP_INPUT_SIZE)
}

/// Preprocess to an arbitrary square size
pub fn preprocess_with_size(image: &DynamicImage, target_size: u32) -> Array4<f32> {
    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        // Zero after normalization is the mean color
        return tensor;
    }

    let rgb = image
        .resize_exact(target_size, target_size, FilterType::CatmullRom)
        .to_rgb8();

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    tensor
}
