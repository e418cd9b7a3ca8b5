// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OCR endpoint tests

use axum::http::StatusCode;
use std::sync::Arc;
use visual_assistant::vision::VisionModelManager;

use super::common::{app_with_manager, image_request, send, upload_request, FixedOcr};

/// Test 1: Extracted text is returned verbatim
#[tokio::test]
async fn test_ocr_returns_text() {
    let manager =
        VisionModelManager::empty().with_ocr(Arc::new(FixedOcr("Hola Mundo\n\x0c".to_string())));
    let app = app_with_manager(manager);

    let (status, json) = send(app, image_request("/ocr/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"text": "Hola Mundo\n\x0c"}));
}

/// Test 2: An image without text yields an empty string
#[tokio::test]
async fn test_ocr_empty_text() {
    let manager = VisionModelManager::empty().with_ocr(Arc::new(FixedOcr(String::new())));
    let app = app_with_manager(manager);

    let (status, json) = send(app, image_request("/ocr")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "");
}

/// Test 3: Missing engine is a 500 with an error message
#[tokio::test]
async fn test_ocr_engine_unavailable() {
    let app = app_with_manager(VisionModelManager::empty());

    let (status, json) = send(app, image_request("/ocr/")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("OCR"));
}

/// Test 4: Bytes that are not an image are rejected
#[tokio::test]
async fn test_ocr_rejects_non_image() {
    let manager = VisionModelManager::empty().with_ocr(Arc::new(FixedOcr("x".to_string())));
    let app = app_with_manager(manager);

    let (status, json) = send(app, upload_request("/ocr/", "file", b"not an image")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}
