// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint behavior with the real engines
//!
//! Needs the `tesseract` binary with the `spa` pack, `./models/yolov8n.onnx`
//! and `./models/blip-image-captioning-base-onnx`. The street photo is
//! fetched once into `tests/fixtures/` when absent.

use axum::http::StatusCode;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use visual_assistant::translation::{GoogleTranslateClient, TranslationConfig};
use visual_assistant::vision::caption::{BlipCaptionModel, ImageCaptioner};
use visual_assistant::vision::detection::YoloDetector;
use visual_assistant::vision::ocr::TesseractOcr;
use visual_assistant::vision::{decode_image_bytes, VisionModelManager};
use visual_assistant::vision::image_utils::MAX_IMAGE_SIZE;

use super::common::{app_with, app_with_manager, send, upload_request};

const FIXTURES: &str = "tests/fixtures";
const DETECTOR_MODEL: &str = "./models/yolov8n.onnx";
const CAPTION_MODEL_DIR: &str = "./models/blip-image-captioning-base-onnx";

/// Street scene with a bus and several people
const STREET_PHOTO: &str = "bus.jpg";
const STREET_PHOTO_URL: &str = "https://ultralytics.com/images/bus.jpg";

fn fixture(name: &str) -> PathBuf {
    Path::new(FIXTURES).join(name)
}

async fn street_photo() -> Vec<u8> {
    let path = fixture(STREET_PHOTO);
    if let Ok(data) = std::fs::read(&path) {
        return data;
    }

    let data = reqwest::get(STREET_PHOTO_URL)
        .await
        .and_then(|r| r.error_for_status())
        .expect("street photo download failed")
        .bytes()
        .await
        .unwrap()
        .to_vec();
    std::fs::write(&path, &data).unwrap();
    data
}

fn load_detector() -> YoloDetector {
    YoloDetector::new(DETECTOR_MODEL, 2).expect("YOLOv8 model must be downloaded")
}

fn load_captioner() -> BlipCaptionModel {
    BlipCaptionModel::new(CAPTION_MODEL_DIR, 2).expect("BLIP model must be downloaded")
}

/// Test 1: Tesseract reads the Spanish text fixture
#[tokio::test]
#[ignore] // Only run if tesseract with the spa language pack is installed
async fn test_ocr_reads_fixture_text() {
    let engine = TesseractOcr::new("tesseract", "spa").expect("tesseract with spa must be installed");
    let app = app_with_manager(VisionModelManager::empty().with_ocr(Arc::new(engine)));

    let data = std::fs::read(fixture("hola_mundo.png")).unwrap();
    let (status, json) = send(app, upload_request("/ocr/", "file", &data)).await;

    assert_eq!(status, StatusCode::OK);
    let text = json["text"].as_str().unwrap().to_uppercase();
    assert!(text.contains("HOLA"), "{:?}", text);
    assert!(text.contains("MUNDO"), "{:?}", text);
}

/// Test 2: Known classes are reported, each once
#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_detect_known_classes() {
    let data = street_photo().await;
    let manager = VisionModelManager::empty().with_detector(Arc::new(load_detector()));

    let (status, json) = send(app_with_manager(manager), upload_request("/detect/", "file", &data)).await;

    assert_eq!(status, StatusCode::OK);
    let objects: Vec<&str> = json["objects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(objects.contains(&"bus"), "{:?}", objects);
    assert!(objects.contains(&"person"), "{:?}", objects);

    let unique: HashSet<&str> = objects.iter().copied().collect();
    assert_eq!(unique.len(), objects.len(), "{:?}", objects);
}

/// Test 3: Caption is non-empty
#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_caption_is_non_empty() {
    let data = street_photo().await;
    let manager = VisionModelManager::empty().with_captioner(Arc::new(load_captioner()));

    let (status, json) = send(app_with_manager(manager), upload_request("/caption/", "file", &data)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!json["caption"].as_str().unwrap().trim().is_empty());
}

/// Test 4: With translation unreachable the caption is the model's English output
#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_caption_untranslated_when_translation_fails() {
    let data = street_photo().await;
    let captioner = Arc::new(load_captioner());

    let (image, _) = decode_image_bytes(&data, MAX_IMAGE_SIZE).unwrap();
    let english = captioner.caption(&image).unwrap().caption;

    let config = TranslationConfig {
        endpoint: "http://127.0.0.1:59999/translate_a/single".to_string(),
        timeout_ms: 1000,
        ..Default::default()
    };
    let translator = Arc::new(GoogleTranslateClient::new(&config).unwrap());
    let app = app_with(VisionModelManager::empty().with_captioner(captioner), translator);

    let (status, json) = send(app, upload_request("/caption/", "file", &data)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["caption"], english.as_str());
}
