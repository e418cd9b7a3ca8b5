// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - OCR (text extraction) via Tesseract
//! - Object detection via YOLOv8
//! - Image captioning via BLIP
//!
//! The ONNX models run on CPU through ONNX Runtime.

pub mod caption;
pub mod detection;
pub mod image_utils;
pub mod model_manager;
pub mod ocr;
pub mod onnx;

pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use model_manager::{VisionModelConfig, VisionModelInfo, VisionModelManager};
