// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image caption endpoint handler

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::response::CaptionResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::{read_image, require_multipart};
use crate::translation::translate_or_original;

/// POST /caption/ - Describe an image in one sentence
///
/// The BLIP caption (English) is translated to Spanish. Translation is
/// best effort: if the translation call fails for any reason the English
/// caption is returned instead.
///
/// # Request
/// - multipart/form-data with the image in the `file` field
///
/// # Response
/// - `caption`: Translated caption
///
/// # Errors
/// - 400 Bad Request: Missing `file` field or undecodable image
/// - 413 Payload Too Large: Upload exceeds the body limit
/// - 500 Internal Server Error: Caption model unavailable or inference failed
pub async fn caption_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CaptionResponse>, ApiError> {
    debug!("Caption request received");

    let captioner = state.vision_model_manager.captioner().ok_or_else(|| {
        warn!("Caption model not loaded");
        ApiError::ModelUnavailable("Image captioning model is not available".to_string())
    })?;

    let mut multipart = require_multipart(multipart)?;
    let (image, image_info) = read_image(&mut multipart, state.max_upload_bytes).await?;
    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    let result = tokio::task::spawn_blocking(move || captioner.caption(&image))
        .await
        .map_err(|e| ApiError::InternalError(format!("Caption task failed: {}", e)))?
        .map_err(|e| {
            warn!("Image captioning failed: {:#}", e);
            ApiError::InferenceFailed(format!("Image captioning failed: {}", e))
        })?;

    let caption = translate_or_original(state.translator.as_ref(), &result.caption).await;

    info!(
        "Caption complete: '{}' -> '{}' ({}ms)",
        result.caption, caption, result.processing_time_ms
    );

    Ok(Json(CaptionResponse::new(caption)))
}
