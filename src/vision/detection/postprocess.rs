// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 output decoding and non-maximum suppression

use anyhow::Result;
use ndarray::{ArrayViewD, IxDyn};
use std::cmp::Ordering;

/// Default confidence threshold (matches the ultralytics predictor)
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// Default IoU threshold for NMS (matches the ultralytics predictor)
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;

/// Maximum detections kept per image
pub const MAX_DETECTIONS: usize = 300;

/// A raw detection in model input space
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Predicted class index
    pub class_id: usize,
    /// Class score (0.0-1.0)
    pub confidence: f32,
    /// Box corners [x1, y1, x2, y2]
    pub bbox: [f32; 4],
}

/// Decode a YOLOv8 output tensor into candidates above the threshold
///
/// YOLOv8 exports produce `[1, 4 + classes, anchors]`, e.g. `[1, 84, 8400]`.
/// Each anchor column holds `cx, cy, w, h` followed by one score per class.
/// Some exports are transposed to `[1, anchors, 4 + classes]`; the smaller
/// of the two trailing dimensions is taken as the attribute axis.
pub fn decode_output(output: &ArrayViewD<f32>, confidence_threshold: f32) -> Result<Vec<Candidate>> {
    let shape = output.shape();
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected detector output shape: {:?}, expected [1, A, N]", shape);
    }

    let channels_first = shape[1] <= shape[2];
    let (attributes, anchors) = if channels_first {
        (shape[1], shape[2])
    } else {
        (shape[2], shape[1])
    };

    if attributes <= 4 {
        anyhow::bail!("Detector output has no class scores: {:?}", shape);
    }
    let num_classes = attributes - 4;

    let value = |attr: usize, anchor: usize| -> f32 {
        if channels_first {
            output[IxDyn(&[0, attr, anchor])]
        } else {
            output[IxDyn(&[0, anchor, attr])]
        }
    };

    let mut candidates = Vec::new();

    for anchor in 0..anchors {
        let (class_id, confidence) = (0..num_classes)
            .map(|c| (c, value(4 + c, anchor)))
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .unwrap_or((0, 0.0));

        if confidence < confidence_threshold {
            continue;
        }

        let cx = value(0, anchor);
        let cy = value(1, anchor);
        let w = value(2, anchor);
        let h = value(3, anchor);

        candidates.push(Candidate {
            class_id,
            confidence,
            bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
        });
    }

    Ok(candidates)
}

/// Intersection over union of two [x1, y1, x2, y2] boxes
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - intersection;

    if union <= 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Class-wise non-maximum suppression
///
/// Returns the kept candidates ordered by descending confidence, capped at
/// `MAX_DETECTIONS`. Boxes of different classes never suppress each other.
pub fn non_max_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && iou(&k.bbox, &candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
            if kept.len() >= MAX_DETECTIONS {
                break;
            }
        }
    }

    kept
}
