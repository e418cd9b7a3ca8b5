// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Caption endpoint tests, including the translation step

use async_trait::async_trait;
use axum::http::StatusCode;
use mockall::mock;
use std::sync::Arc;
use visual_assistant::translation::{TranslationError, Translator};
use visual_assistant::vision::VisionModelManager;

use super::common::{app_with, app_with_manager, image_request, send, FixedCaptioner};

mock! {
    pub CaptionTranslator {}

    #[async_trait]
    impl Translator for CaptionTranslator {
        async fn translate(&self, text: &str) -> Result<String, TranslationError>;
        fn name(&self) -> &str;
    }
}

fn captioning_manager(caption: &str) -> VisionModelManager {
    VisionModelManager::empty().with_captioner(Arc::new(FixedCaptioner(caption.to_string())))
}

/// Test 1: The English caption is passed to the translator and the
/// translation is returned
#[tokio::test]
async fn test_caption_is_translated() {
    let mut translator = MockCaptionTranslator::new();
    translator
        .expect_translate()
        .withf(|text| text.contains("a dog on the beach"))
        .times(1)
        .returning(|_| Ok("un perro en la playa".to_string()));
    translator.expect_name().return_const("mock".to_owned());

    let app = app_with(captioning_manager("a dog on the beach"), Arc::new(translator));

    let (status, json) = send(app, image_request("/caption/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"caption": "un perro en la playa"}));
}

/// Test 2: A failed translation falls back to the English caption
#[tokio::test]
async fn test_caption_falls_back_to_english() {
    let mut translator = MockCaptionTranslator::new();
    translator.expect_translate().times(1).returning(|_| {
        Err(TranslationError::Timeout { timeout_ms: 5000 })
    });
    translator.expect_name().return_const("mock".to_owned());

    let app = app_with(captioning_manager("a cat on a sofa"), Arc::new(translator));

    let (status, json) = send(app, image_request("/caption")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["caption"], "a cat on a sofa");
}

/// Test 3: An empty caption is returned as-is without a translation call
#[tokio::test]
async fn test_empty_caption_skips_translation() {
    let mut translator = MockCaptionTranslator::new();
    translator.expect_translate().never();
    translator.expect_name().return_const("mock".to_owned());

    let app = app_with(captioning_manager(""), Arc::new(translator));

    let (status, json) = send(app, image_request("/caption/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["caption"], "");
}

/// Test 4: Missing caption model is a 500 and the translator is never used
#[tokio::test]
async fn test_caption_model_unavailable() {
    let mut translator = MockCaptionTranslator::new();
    translator.expect_translate().never();
    translator.expect_name().return_const("mock".to_owned());

    let app = app_with(VisionModelManager::empty(), Arc::new(translator));

    let (status, json) = send(app, image_request("/caption/")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Image captioning model is not available");
}

/// Test 5: Passthrough translator returns the English caption
#[tokio::test]
async fn test_caption_with_translation_disabled() {
    let app = app_with_manager(captioning_manager("a red bicycle"));

    let (status, json) = send(app, image_request("/caption/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["caption"], "a red bicycle");
}
