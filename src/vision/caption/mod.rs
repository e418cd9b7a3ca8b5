// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image captioning
//!
//! Components:
//! - `preprocessing` - Resize and CLIP normalization
//! - `encoder` - BLIP vision encoder (ONNX)
//! - `decoder` - BLIP text decoder with greedy generation
//! - `model` - Complete pipeline

pub mod decoder;
pub mod encoder;
pub mod model;
pub mod preprocessing;

use anyhow::Result;
use image::DynamicImage;

pub use model::BlipCaptionModel;

/// Result of captioning an image
#[derive(Debug, Clone)]
pub struct CaptionResult {
    /// Generated caption (English for BLIP)
    pub caption: String,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// An image captioning engine
///
/// Implementations are blocking and are called from tokio's blocking pool.
pub trait ImageCaptioner: Send + Sync {
    /// Engine name, reported by the health endpoint
    fn name(&self) -> &str;

    /// Describe the image in one sentence
    fn caption(&self, image: &DynamicImage) -> Result<CaptionResult>;
}
