// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection
//!
//! Components:
//! - `preprocessing` - Letterbox resize to the detector input
//! - `postprocess` - Output decoding and NMS
//! - `labels` - Class names (COCO or `labels.txt`)
//! - `yolo` - YOLOv8 ONNX detector

pub mod labels;
pub mod postprocess;
pub mod preprocessing;
pub mod yolo;

use anyhow::Result;
use image::DynamicImage;
use serde::Serialize;
use std::collections::HashSet;

pub use yolo::YoloDetector;

/// Bounding box in source image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A detected object
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Class name
    pub label: String,
    /// Class index in the model's label table
    pub class_id: usize,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Location in the source image
    pub bounding_box: BoundingBox,
}

/// Result of running a detector on one image
#[derive(Debug, Clone, Default)]
pub struct DetectionResult {
    /// Detections ordered by descending confidence
    pub detections: Vec<Detection>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl DetectionResult {
    /// Distinct class names, in order of first appearance
    pub fn unique_labels(&self) -> Vec<String> {
        unique_labels(&self.detections)
    }
}

/// An object detection engine
///
/// Implementations are blocking and are called from tokio's blocking pool.
pub trait ObjectDetector: Send + Sync {
    /// Engine name, reported by the health endpoint
    fn name(&self) -> &str;

    /// Detect objects in an image
    fn detect(&self, image: &DynamicImage) -> Result<DetectionResult>;
}

/// Deduplicate class names, keeping first-appearance order
pub fn unique_labels(detections: &[Detection]) -> Vec<String> {
    let mut seen = HashSet::new();
    detections
        .iter()
        .filter(|d| seen.insert(d.label.as_str()))
        .map(|d| d.label.clone())
        .collect()
}
