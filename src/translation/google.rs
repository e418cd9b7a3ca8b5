// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Google Translate (public `gtx` endpoint) client
//!
//! The endpoint is undocumented and unauthenticated. Callers should treat
//! every error as routine and fall back to the source text.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::config::TranslationConfig;
use super::provider::{TranslationError, Translator};

/// Translator backed by the public Google Translate endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslateClient {
    client: Client,
    endpoint: String,
    source_lang: String,
    target_lang: String,
    timeout_ms: u64,
}

impl GoogleTranslateClient {
    /// Create a client from configuration
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| TranslationError::Http {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// Endpoint URL in use
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        debug!(
            "Translating {} chars {} -> {}",
            text.len(),
            self.source_lang,
            self.target_lang
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    TranslationError::Http {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| TranslationError::MalformedResponse {
                message: format!("JSON parse error: {}", e),
            })?;

        parse_translation(&data, text)
    }

    fn name(&self) -> &str {
        "google-gtx"
    }
}

/// Extract the translated text from a `gtx` response
///
/// The response is a nested array whose first element lists sentence
/// segments, each `[translated, original, ...]`. Long inputs are split
/// into several segments, which are joined back together. An empty or null
/// segment list yields `original`.
pub fn parse_translation(data: &Value, original: &str) -> Result<String, TranslationError> {
    let root = data
        .as_array()
        .ok_or_else(|| TranslationError::MalformedResponse {
            message: "expected a top-level JSON array".to_string(),
        })?;

    let segments = match root.first().and_then(Value::as_array) {
        Some(segments) if !segments.is_empty() => segments,
        _ => return Ok(original.to_string()),
    };

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        Ok(original.to_string())
    } else {
        Ok(translated)
    }
}
