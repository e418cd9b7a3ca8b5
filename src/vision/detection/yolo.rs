// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detector (ONNX)

use anyhow::{Context, Result};
use image::DynamicImage;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::labels::{label_for, labels_for_model};
use super::postprocess::{
    decode_output, non_max_suppression, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD,
};
use super::preprocessing::{preprocess_for_yolo, Letterbox};
use super::{BoundingBox, Detection, DetectionResult, ObjectDetector};
use crate::vision::onnx::{build_cpu_session, first_input_name, lock_session};

/// YOLOv8 detector running on CPU
///
/// Expects an ultralytics export with a single `images` input of shape
/// [1, 3, 640, 640] and a single output of shape [1, 4 + classes, 8400].
#[derive(Clone)]
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Class names indexed by class id
    labels: Arc<Vec<String>>,
    /// Minimum class score to keep a box
    confidence_threshold: f32,
    /// IoU above which same-class boxes are suppressed
    iou_threshold: f32,
    /// Model file path
    model_path: String,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("model_path", &self.model_path)
            .field("input_name", &self.input_name)
            .field("num_labels", &self.labels.len())
            .field("confidence_threshold", &self.confidence_threshold)
            .field("iou_threshold", &self.iou_threshold)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load a YOLOv8 ONNX model
    ///
    /// Class names come from a `labels.txt` beside the model if present,
    /// otherwise the 80 COCO classes are used.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - The labels file exists but cannot be read
    pub fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();

        info!("Loading YOLOv8 detector from {}", model_path.display());

        let session = build_cpu_session(model_path, intra_threads)
            .context("Failed to load YOLOv8 detector")?;
        let input_name = first_input_name(&session, "images");
        let labels = labels_for_model(model_path)?;

        debug!(
            "YOLOv8 detector input: {}, {} labels",
            input_name,
            labels.len()
        );

        info!("✅ YOLOv8 detector loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            labels: Arc::new(labels),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            model_path: model_path.to_string_lossy().to_string(),
        })
    }

    /// Override the confidence and IoU thresholds
    pub fn with_thresholds(mut self, confidence: f32, iou: f32) -> Self {
        self.confidence_threshold = confidence.clamp(0.0, 1.0);
        self.iou_threshold = iou.clamp(0.0, 1.0);
        self
    }

    /// Confidence threshold in use
    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// IoU threshold in use
    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }

    /// Class names known to the detector
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn to_source_box(geometry: &Letterbox, bbox: &[f32; 4]) -> BoundingBox {
        let (x1, y1) = geometry.to_source(bbox[0], bbox[1]);
        let (x2, y2) = geometry.to_source(bbox[2], bbox[3]);
        BoundingBox {
            x: x1.round() as u32,
            y: y1.round() as u32,
            width: (x2 - x1).max(0.0).round() as u32,
            height: (y2 - y1).max(0.0).round() as u32,
        }
    }
}

impl ObjectDetector for YoloDetector {
    fn name(&self) -> &str {
        "yolov8"
    }

    fn detect(&self, image: &DynamicImage) -> Result<DetectionResult> {
        let start = Instant::now();

        let (input, geometry) = preprocess_for_yolo(image);
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let candidates = {
            let mut session = lock_session(&self.session)?;
            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Detector inference failed")?;

            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract detector output")?;
            debug!("Detector output shape: {:?}", output_tensor.shape());

            decode_output(&output_tensor, self.confidence_threshold)?
        };

        let kept = non_max_suppression(candidates, self.iou_threshold);

        let detections: Vec<Detection> = kept
            .iter()
            .map(|c| Detection {
                label: label_for(&self.labels, c.class_id),
                class_id: c.class_id,
                confidence: c.confidence,
                bounding_box: Self::to_source_box(&geometry, &c.bbox),
            })
            .collect();

        let processing_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "YOLOv8 found {} objects in {}ms",
            detections.len(),
            processing_time_ms
        );

        Ok(DetectionResult {
            detections,
            processing_time_ms,
        })
    }
}
