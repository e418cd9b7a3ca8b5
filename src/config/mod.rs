// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Every option can be set by flag or environment variable. `.env` is
//! loaded before parsing, so values there act as environment defaults.

use clap::Parser;
use std::net::SocketAddr;

use crate::translation::config::DEFAULT_ENDPOINT;
use crate::translation::TranslationConfig;
use crate::vision::VisionModelConfig;

/// Visual Assistant API server
#[derive(Parser, Debug, Clone)]
#[command(name = "visual-assistant-api")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "OCR, object detection and image captioning over HTTP", long_about = None)]
pub struct AppConfig {
    /// Address to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Tesseract binary; empty disables OCR
    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    pub tesseract_path: String,

    /// Tesseract language pack(s)
    #[arg(long, env = "OCR_LANGUAGE", default_value = "spa")]
    pub ocr_language: String,

    /// YOLOv8 ONNX model; empty disables detection
    #[arg(long, env = "DETECTOR_MODEL_PATH", default_value = "./models/yolov8n.onnx")]
    pub detector_model_path: String,

    /// BLIP ONNX model directory; empty disables captioning
    #[arg(
        long,
        env = "CAPTION_MODEL_DIR",
        default_value = "./models/blip-image-captioning-base-onnx"
    )]
    pub caption_model_dir: String,

    /// Minimum detection confidence
    #[arg(long, env = "DETECTION_CONFIDENCE", default_value_t = 0.25)]
    pub detection_confidence: f32,

    /// NMS IoU threshold
    #[arg(long, env = "DETECTION_IOU", default_value_t = 0.7)]
    pub detection_iou: f32,

    /// Maximum caption length in tokens
    #[arg(long, env = "CAPTION_MAX_LENGTH", default_value_t = 20)]
    pub caption_max_length: usize,

    /// Intra-op threads per ONNX session
    #[arg(long, env = "VISION_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Translate captions
    #[arg(
        long,
        env = "TRANSLATE_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub translate_enabled: bool,

    /// Translation endpoint
    #[arg(long, env = "TRANSLATE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub translate_endpoint: String,

    /// Caption source language
    #[arg(long, env = "TRANSLATE_SOURCE_LANG", default_value = "en")]
    pub translate_source: String,

    /// Caption target language
    #[arg(long, env = "TRANSLATE_TARGET_LANG", default_value = "es")]
    pub translate_target: String,

    /// Translation request timeout in seconds
    #[arg(long, env = "TRANSLATE_TIMEOUT_SECS", default_value_t = 5)]
    pub translate_timeout_secs: u64,

    /// Maximum upload body size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.detection_confidence > 0.0 && self.detection_confidence <= 1.0) {
            return Err(format!(
                "Detection confidence must be in (0, 1], got {}",
                self.detection_confidence
            ));
        }
        if !(self.detection_iou > 0.0 && self.detection_iou <= 1.0) {
            return Err(format!(
                "Detection IoU must be in (0, 1], got {}",
                self.detection_iou
            ));
        }
        if self.caption_max_length == 0 {
            return Err("Caption max length must be greater than 0".to_string());
        }
        if self.intra_threads == 0 {
            return Err("Intra threads must be greater than 0".to_string());
        }
        if self.max_upload_bytes == 0 {
            return Err("Max upload bytes must be greater than 0".to_string());
        }
        self.translation_config().validate()
    }

    /// Socket address to bind
    pub fn bind_address(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }

    /// Vision engine configuration; empty paths disable an engine
    pub fn vision_config(&self) -> VisionModelConfig {
        VisionModelConfig {
            tesseract_path: non_empty(&self.tesseract_path),
            ocr_language: self.ocr_language.clone(),
            detector_model_path: non_empty(&self.detector_model_path),
            caption_model_dir: non_empty(&self.caption_model_dir),
            detection_confidence: self.detection_confidence,
            detection_iou: self.detection_iou,
            caption_max_length: self.caption_max_length,
            intra_threads: self.intra_threads,
        }
    }

    /// Translation configuration
    pub fn translation_config(&self) -> TranslationConfig {
        TranslationConfig {
            enabled: self.translate_enabled,
            endpoint: self.translate_endpoint.clone(),
            source_lang: self.translate_source.clone(),
            target_lang: self.translate_target.clone(),
            timeout_ms: self.translate_timeout_secs.saturating_mul(1000),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
