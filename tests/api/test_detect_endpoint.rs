// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Object detection endpoint tests

use axum::http::StatusCode;
use std::sync::Arc;
use visual_assistant::vision::VisionModelManager;

use super::common::{app_with_manager, image_request, send, FailingDetector, FixedDetector};

/// Test 1: Duplicate labels collapse to one entry each
#[tokio::test]
async fn test_detect_returns_unique_objects() {
    let detector = FixedDetector(vec![
        ("person", 0.91),
        ("dog", 0.88),
        ("person", 0.75),
        ("car", 0.52),
        ("dog", 0.40),
    ]);
    let manager = VisionModelManager::empty().with_detector(Arc::new(detector));
    let app = app_with_manager(manager);

    let (status, json) = send(app, image_request("/detect/")).await;

    assert_eq!(status, StatusCode::OK);
    let objects: Vec<&str> = json["objects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(objects.len(), 3);
    assert!(objects.contains(&"person"));
    assert!(objects.contains(&"dog"));
    assert!(objects.contains(&"car"));
}

/// Test 2: Nothing detected is an empty list, not an error
#[tokio::test]
async fn test_detect_nothing_found() {
    let manager = VisionModelManager::empty().with_detector(Arc::new(FixedDetector(vec![])));
    let app = app_with_manager(manager);

    let (status, json) = send(app, image_request("/detect")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"objects": []}));
}

/// Test 3: Missing detection model is a 500
#[tokio::test]
async fn test_detect_model_unavailable() {
    let app = app_with_manager(VisionModelManager::empty());

    let (status, json) = send(app, image_request("/detect/")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Object detection model is not available");
}

/// Test 4: Inference failure is a 500 with an error message
#[tokio::test]
async fn test_detect_inference_failure() {
    let manager = VisionModelManager::empty().with_detector(Arc::new(FailingDetector));
    let app = app_with_manager(manager);

    let (status, json) = send(app, image_request("/detect/")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("session run failed"));
}
