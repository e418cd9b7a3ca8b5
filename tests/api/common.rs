// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for API tests: fake engines, multipart bodies, request
//! dispatch.

#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`
use visual_assistant::api::{create_app, AppState};
use visual_assistant::translation::{PassthroughTranslator, Translator};
use visual_assistant::vision::caption::{CaptionResult, ImageCaptioner};
use visual_assistant::vision::detection::{
    BoundingBox, Detection, DetectionResult, ObjectDetector,
};
use visual_assistant::vision::ocr::{OcrResult, TextRecognizer};
use visual_assistant::vision::VisionModelManager;

pub const BOUNDARY: &str = "visual-assistant-test-boundary";

/// OCR engine that always returns the same text
pub struct FixedOcr(pub String);

impl TextRecognizer for FixedOcr {
    fn name(&self) -> &str {
        "fixed-ocr"
    }

    fn language(&self) -> &str {
        "spa"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<OcrResult> {
        Ok(OcrResult {
            text: self.0.clone(),
            language: "spa".to_string(),
            processing_time_ms: 1,
        })
    }
}

/// Detector that returns a scripted list of (label, confidence)
pub struct FixedDetector(pub Vec<(&'static str, f32)>);

impl ObjectDetector for FixedDetector {
    fn name(&self) -> &str {
        "fixed-detector"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<DetectionResult> {
        let detections = self
            .0
            .iter()
            .enumerate()
            .map(|(i, (label, confidence))| Detection {
                label: label.to_string(),
                class_id: i,
                confidence: *confidence,
                bounding_box: BoundingBox {
                    x: 0,
                    y: 0,
                    width: 10,
                    height: 10,
                },
            })
            .collect();
        Ok(DetectionResult {
            detections,
            processing_time_ms: 1,
        })
    }
}

/// Detector whose inference always fails
pub struct FailingDetector;

impl ObjectDetector for FailingDetector {
    fn name(&self) -> &str {
        "failing-detector"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<DetectionResult> {
        anyhow::bail!("session run failed")
    }
}

/// Captioner that always returns the same English caption
pub struct FixedCaptioner(pub String);

impl ImageCaptioner for FixedCaptioner {
    fn name(&self) -> &str {
        "fixed-captioner"
    }

    fn caption(&self, _image: &DynamicImage) -> Result<CaptionResult> {
        Ok(CaptionResult {
            caption: self.0.clone(),
            processing_time_ms: 1,
        })
    }
}

/// Encode a blank image in the given format
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

pub fn png_bytes() -> Vec<u8> {
    image_bytes(32, 24, ImageFormat::Png)
}

/// Build a multipart/form-data body with a single file field
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// POST a multipart upload to `uri`
pub fn upload_request(uri: &str, field: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, "image.png", "image/png", data)))
        .unwrap()
}

/// POST a PNG image in the `file` field
pub fn image_request(uri: &str) -> Request<Body> {
    upload_request(uri, "file", &png_bytes())
}

pub fn app_with(manager: VisionModelManager, translator: Arc<dyn Translator>) -> Router {
    let mut state = AppState::new_for_test();
    state.vision_model_manager = Arc::new(manager);
    state.translator = translator;
    create_app(Arc::new(state))
}

pub fn app_with_manager(manager: VisionModelManager) -> Router {
    app_with(manager, Arc::new(PassthroughTranslator))
}

/// Dispatch a request and parse the JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
