// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection response types

use serde::{Deserialize, Serialize};

/// Response from object detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectResponse {
    /// Distinct class names found in the image
    pub objects: Vec<String>,
}

impl DetectResponse {
    pub fn new(objects: Vec<String>) -> Self {
        Self { objects }
    }
}
