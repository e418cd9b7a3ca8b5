// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction (OCR)
//!
//! Components:
//! - `model` - `TextRecognizer` trait and result type
//! - `tesseract` - Tesseract engine driven over stdin/stdout

pub mod model;
pub mod tesseract;

pub use model::{OcrResult, TextRecognizer};
pub use tesseract::{TesseractOcr, DEFAULT_LANGUAGE};
