// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR response types

use serde::{Deserialize, Serialize};

/// Response from OCR processing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrResponse {
    /// Extracted text, exactly as the engine produced it
    pub text: String,
}

impl OcrResponse {
    pub fn new(text: String) -> Self {
        Self { text }
    }
}
