// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for caption translation

/// Public Google Translate endpoint used by the `gtx` web client
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Configuration for the outbound translation call
#[derive(Debug, Clone)]
pub struct TranslationConfig {
    /// Whether captions are translated at all
    pub enabled: bool,
    /// Translation endpoint URL
    pub endpoint: String,
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl TranslationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("Translation endpoint must not be empty".to_string());
        }
        if self.source_lang.is_empty() || self.target_lang.is_empty() {
            return Err("Translation languages must not be empty".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("Translation timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            source_lang: "en".to_string(),
            target_lang: "es".to_string(),
            timeout_ms: 5000,
        }
    }
}
