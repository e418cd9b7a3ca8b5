// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caption translation
//!
//! Best-effort outbound translation. Any failure degrades to the
//! untranslated text; nothing here ever fails a request.

pub mod config;
pub mod google;
pub mod provider;

use std::sync::Arc;

pub use config::TranslationConfig;
pub use google::{parse_translation, GoogleTranslateClient};
pub use provider::{translate_or_original, PassthroughTranslator, TranslationError, Translator};

/// Build the translator for a configuration
///
/// Disabled translation yields a `PassthroughTranslator`.
pub fn build_translator(config: &TranslationConfig) -> Result<Arc<dyn Translator>, TranslationError> {
    if !config.enabled {
        return Ok(Arc::new(PassthroughTranslator));
    }
    let client = GoogleTranslateClient::new(config)?;
    tracing::info!(
        "Caption translation {} -> {} via {}",
        config.source_lang,
        config.target_lang,
        client.endpoint()
    );
    Ok(Arc::new(client))
}
