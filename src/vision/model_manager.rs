// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager for loading the OCR, detection and caption engines

use serde::Serialize;
use std::sync::Arc;

use crate::vision::caption::{BlipCaptionModel, ImageCaptioner};
use crate::vision::detection::postprocess::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};
use crate::vision::detection::{ObjectDetector, YoloDetector};
use crate::vision::caption::decoder::DEFAULT_MAX_LENGTH;
use crate::vision::ocr::{TesseractOcr, TextRecognizer, DEFAULT_LANGUAGE};
use crate::vision::onnx::DEFAULT_INTRA_THREADS;

/// Configuration for loading vision models
///
/// `None` for a path disables that engine.
#[derive(Debug, Clone)]
pub struct VisionModelConfig {
    /// Tesseract binary (optional)
    pub tesseract_path: Option<String>,
    /// Tesseract language pack(s)
    pub ocr_language: String,
    /// Path to the YOLOv8 ONNX file (optional)
    pub detector_model_path: Option<String>,
    /// Path to the BLIP model directory (optional)
    pub caption_model_dir: Option<String>,
    /// Detector confidence threshold
    pub detection_confidence: f32,
    /// Detector NMS IoU threshold
    pub detection_iou: f32,
    /// Maximum caption length in tokens
    pub caption_max_length: usize,
    /// Intra-op threads per ONNX session
    pub intra_threads: usize,
}

impl Default for VisionModelConfig {
    fn default() -> Self {
        Self {
            tesseract_path: Some("tesseract".to_string()),
            ocr_language: DEFAULT_LANGUAGE.to_string(),
            detector_model_path: Some("./models/yolov8n.onnx".to_string()),
            caption_model_dir: Some("./models/blip-image-captioning-base-onnx".to_string()),
            detection_confidence: DEFAULT_CONFIDENCE_THRESHOLD,
            detection_iou: DEFAULT_IOU_THRESHOLD,
            caption_max_length: DEFAULT_MAX_LENGTH,
            intra_threads: DEFAULT_INTRA_THREADS,
        }
    }
}

impl VisionModelConfig {
    /// Configuration with every engine disabled
    pub fn disabled() -> Self {
        Self {
            tesseract_path: None,
            detector_model_path: None,
            caption_model_dir: None,
            ..Self::default()
        }
    }
}

/// Information about a vision engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisionModelInfo {
    /// Engine name
    pub name: String,
    /// Model type (ocr, detection, caption)
    pub model_type: String,
    /// Whether the engine is available
    pub available: bool,
}

/// Manager for the vision engines
///
/// Each engine is optional. A failed load is logged and leaves the engine
/// unavailable; requests for it then fail with a 500 instead of the whole
/// server refusing to start. All engines run on CPU.
#[derive(Default)]
pub struct VisionModelManager {
    ocr: Option<Arc<dyn TextRecognizer>>,
    detector: Option<Arc<dyn ObjectDetector>>,
    captioner: Option<Arc<dyn ImageCaptioner>>,
}

impl std::fmt::Debug for VisionModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionModelManager")
            .field("has_ocr", &self.has_ocr())
            .field("has_detector", &self.has_detector())
            .field("has_captioner", &self.has_captioner())
            .finish()
    }
}

impl VisionModelManager {
    /// Create a new VisionModelManager with the given configuration
    ///
    /// Loading runs on the blocking pool. Missing or broken models are
    /// handled gracefully.
    pub async fn new(config: VisionModelConfig) -> anyhow::Result<Self> {
        let manager = tokio::task::spawn_blocking(move || Self::load(&config)).await?;
        Ok(manager)
    }

    /// Manager with no engines loaded
    pub fn empty() -> Self {
        Self::default()
    }

    fn load(config: &VisionModelConfig) -> Self {
        let ocr = config.tesseract_path.as_ref().and_then(|path| {
            match TesseractOcr::new(path, &config.ocr_language) {
                Ok(engine) => {
                    tracing::info!("✅ Tesseract OCR loaded from {} ({})", path, engine.version());
                    Some(Arc::new(engine) as Arc<dyn TextRecognizer>)
                }
                Err(e) => {
                    tracing::warn!("⚠️ Failed to load Tesseract OCR from {}: {:#}", path, e);
                    None
                }
            }
        });

        let detector = config.detector_model_path.as_ref().and_then(|path| {
            match YoloDetector::new(path, config.intra_threads) {
                Ok(model) => {
                    tracing::info!("✅ YOLOv8 detector loaded from {}", path);
                    let model = model.with_thresholds(config.detection_confidence, config.detection_iou);
                    Some(Arc::new(model) as Arc<dyn ObjectDetector>)
                }
                Err(e) => {
                    tracing::warn!("⚠️ Failed to load detection model from {}: {:#}", path, e);
                    None
                }
            }
        });

        let captioner = config.caption_model_dir.as_ref().and_then(|dir| {
            match BlipCaptionModel::new(dir, config.intra_threads) {
                Ok(model) => {
                    tracing::info!("✅ BLIP caption model loaded from {}", dir);
                    let model = model.with_max_length(config.caption_max_length);
                    Some(Arc::new(model) as Arc<dyn ImageCaptioner>)
                }
                Err(e) => {
                    tracing::warn!("⚠️ Failed to load caption model from {}: {:#}", dir, e);
                    None
                }
            }
        });

        Self {
            ocr,
            detector,
            captioner,
        }
    }

    /// Replace the OCR engine
    pub fn with_ocr(mut self, engine: Arc<dyn TextRecognizer>) -> Self {
        self.ocr = Some(engine);
        self
    }

    /// Replace the object detector
    pub fn with_detector(mut self, engine: Arc<dyn ObjectDetector>) -> Self {
        self.detector = Some(engine);
        self
    }

    /// Replace the captioner
    pub fn with_captioner(mut self, engine: Arc<dyn ImageCaptioner>) -> Self {
        self.captioner = Some(engine);
        self
    }

    /// Get the OCR engine if available
    pub fn ocr(&self) -> Option<Arc<dyn TextRecognizer>> {
        self.ocr.clone()
    }

    /// Get the object detector if available
    pub fn detector(&self) -> Option<Arc<dyn ObjectDetector>> {
        self.detector.clone()
    }

    /// Get the captioner if available
    pub fn captioner(&self) -> Option<Arc<dyn ImageCaptioner>> {
        self.captioner.clone()
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    pub fn has_captioner(&self) -> bool {
        self.captioner.is_some()
    }

    /// List all vision engines and whether each is available
    pub fn list_models(&self) -> Vec<VisionModelInfo> {
        let info = |default_name: &str, model_type: &str, name: Option<&str>| VisionModelInfo {
            name: name.unwrap_or(default_name).to_string(),
            model_type: model_type.to_string(),
            available: name.is_some(),
        };

        vec![
            info("tesseract", "ocr", self.ocr.as_deref().map(|e| e.name())),
            info("yolov8", "detection", self.detector.as_deref().map(|e| e.name())),
            info("blip", "caption", self.captioner.as_deref().map(|e| e.name())),
        ]
    }
}
