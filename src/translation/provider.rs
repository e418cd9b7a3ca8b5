// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Translator trait and fallback helpers

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Errors from a translation backend
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Request timed out
    #[error("Translation timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Transport-level failure (connect, TLS, body read)
    #[error("Translation request failed: {message}")]
    Http { message: String },

    /// Non-success status from the endpoint
    #[error("Translation API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Body was not the expected JSON structure
    #[error("Malformed translation response: {message}")]
    MalformedResponse { message: String },
}

/// A text translation backend
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`, returning the translated string
    async fn translate(&self, text: &str) -> Result<String, TranslationError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Translator that returns the input unchanged
///
/// Used when translation is disabled.
#[derive(Debug, Clone, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// Translate, falling back to the original text on any failure
///
/// Empty or whitespace-only input is returned without calling the backend.
pub async fn translate_or_original(translator: &dyn Translator, text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    match translator.translate(text).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!(
                "⚠️ Translation via {} failed, returning original text: {}",
                translator.name(),
                e
            );
            text.to_string()
        }
    }
}
