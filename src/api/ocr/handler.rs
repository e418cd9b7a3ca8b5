// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handler

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::response::OcrResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::{read_image, require_multipart};

/// POST /ocr/ - Extract text from an image
///
/// Uses Tesseract with the configured language (Spanish by default).
///
/// # Request
/// - multipart/form-data with the image in the `file` field
///
/// # Response
/// - `text`: Extracted text, unmodified
///
/// # Errors
/// - 400 Bad Request: Missing `file` field or undecodable image
/// - 413 Payload Too Large: Upload exceeds the body limit
/// - 500 Internal Server Error: OCR engine unavailable or failed
pub async fn ocr_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrResponse>, ApiError> {
    debug!("OCR request received");

    // 1. Get OCR engine
    let engine = state.vision_model_manager.ocr().ok_or_else(|| {
        warn!("OCR engine not loaded");
        ApiError::ModelUnavailable("OCR engine is not available".to_string())
    })?;

    // 2. Read and decode the upload
    let mut multipart = require_multipart(multipart)?;
    let (image, image_info) = read_image(&mut multipart, state.max_upload_bytes).await?;
    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    // 3. Run OCR on the blocking pool
    let result = tokio::task::spawn_blocking(move || engine.recognize(&image))
        .await
        .map_err(|e| ApiError::InternalError(format!("OCR task failed: {}", e)))?
        .map_err(|e| {
            warn!("OCR processing failed: {:#}", e);
            ApiError::InferenceFailed(format!("OCR processing failed: {}", e))
        })?;

    info!(
        "OCR complete: {} chars ({}), {}ms",
        result.text.len(),
        result.language,
        result.processing_time_ms
    );

    Ok(Json(OcrResponse::new(result.text)))
}
