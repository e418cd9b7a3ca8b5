// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BLIP captioning pipeline
//!
//! Combines:
//! - Vision encoder (image feature extraction)
//! - Text decoder (caption generation)

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use super::decoder::BlipTextDecoder;
use super::encoder::BlipVisionEncoder;
use super::preprocessing::preprocess_for_blip;
use super::{CaptionResult, ImageCaptioner};

/// Candidate file names for the vision encoder
pub const ENCODER_FILE_NAMES: [&str; 3] =
    ["vision_model.onnx", "vision_encoder.onnx", "encoder_model.onnx"];

/// Candidate file names for the text decoder
pub const DECODER_FILE_NAMES: [&str; 3] = [
    "text_decoder_model.onnx",
    "text_decoder.onnx",
    "decoder_model.onnx",
];

/// Tokenizer file name
pub const TOKENIZER_FILE_NAME: &str = "tokenizer.json";

/// BLIP image captioning model (CPU-only)
#[derive(Clone)]
pub struct BlipCaptionModel {
    encoder: BlipVisionEncoder,
    decoder: BlipTextDecoder,
    /// Model directory path
    model_dir: String,
}

impl std::fmt::Debug for BlipCaptionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlipCaptionModel")
            .field("model_dir", &self.model_dir)
            .field("max_length", &self.decoder.max_length())
            .finish_non_exhaustive()
    }
}

impl BlipCaptionModel {
    /// Load BLIP models from a directory
    ///
    /// Expected files:
    /// - vision_model.onnx (or vision_encoder.onnx / encoder_model.onnx)
    /// - text_decoder_model.onnx (or text_decoder.onnx / decoder_model.onnx)
    /// - tokenizer.json
    ///
    /// Files directly in `model_dir` are preferred; an `onnx/` subdirectory
    /// (the layout of Hugging Face ONNX exports) is searched next.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model directory doesn't exist
    /// - Required model files are missing
    /// - ONNX Runtime initialization fails
    pub fn new<P: AsRef<Path>>(model_dir: P, intra_threads: usize) -> Result<Self> {
        let model_dir = model_dir.as_ref();

        if !model_dir.exists() {
            anyhow::bail!("BLIP model directory not found: {}", model_dir.display());
        }

        info!("Loading BLIP caption models from {}", model_dir.display());

        let encoder_path = find_model_file(model_dir, &ENCODER_FILE_NAMES)?;
        let decoder_path = find_model_file(model_dir, &DECODER_FILE_NAMES)?;
        let tokenizer_path = find_model_file(model_dir, &[TOKENIZER_FILE_NAME])?;

        let encoder = BlipVisionEncoder::new(&encoder_path, intra_threads)
            .context("Failed to load BLIP encoder")?;
        let decoder = BlipTextDecoder::new(&decoder_path, &tokenizer_path, intra_threads)
            .context("Failed to load BLIP decoder")?;

        info!("✅ BLIP caption pipeline ready (CPU-only)");

        Ok(Self {
            encoder,
            decoder,
            model_dir: model_dir.to_string_lossy().to_string(),
        })
    }

    /// Set the maximum caption length in tokens
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.decoder = self.decoder.with_max_length(max_length);
        self
    }
}

impl ImageCaptioner for BlipCaptionModel {
    fn name(&self) -> &str {
        "blip"
    }

    fn caption(&self, image: &DynamicImage) -> Result<CaptionResult> {
        let start = Instant::now();

        debug!("Captioning image {}x{}", image.width(), image.height());
        let pixel_values = preprocess_for_blip(image);

        let hidden_states = self
            .encoder
            .encode(pixel_values)
            .context("Failed to encode image")?;
        debug!("Encoder hidden states: {:?}", hidden_states.shape());

        let caption = self
            .decoder
            .generate(&hidden_states)
            .context("Failed to generate caption")?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "BLIP caption complete: '{}' ({}ms)",
            caption, processing_time_ms
        );

        Ok(CaptionResult {
            caption,
            processing_time_ms,
        })
    }
}

/// Find a model file by trying multiple possible names
pub fn find_model_file(dir: &Path, names: &[&str]) -> Result<PathBuf> {
    for base in [dir.to_path_buf(), dir.join("onnx")] {
        for name in names {
            let path = base.join(name);
            if path.exists() {
                return Ok(path);
            }
        }
    }
    anyhow::bail!(
        "Model file not found in {}. Tried: {:?}",
        dir.display(),
        names
    );
}
