// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR result type and engine trait

use anyhow::Result;
use image::DynamicImage;

/// Result of OCR processing
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Full extracted text, exactly as the engine produced it
    pub text: String,
    /// Language pack used for recognition (e.g. "spa")
    pub language: String,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// A text extraction engine
///
/// Implementations are blocking and are called from tokio's blocking pool.
pub trait TextRecognizer: Send + Sync {
    /// Engine name, reported by the health endpoint
    fn name(&self) -> &str;

    /// Language the engine recognizes
    fn language(&self) -> &str;

    /// Extract all text from an image
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult>;
}
