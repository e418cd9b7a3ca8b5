// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection endpoint handler

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::response::DetectResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::{read_image, require_multipart};

/// POST /detect/ - List the objects in an image
///
/// Runs the YOLOv8 detector and returns each detected class once.
///
/// # Request
/// - multipart/form-data with the image in the `file` field
///
/// # Response
/// - `objects`: Unique class names, highest-confidence first
///
/// # Errors
/// - 400 Bad Request: Missing `file` field or undecodable image
/// - 413 Payload Too Large: Upload exceeds the body limit
/// - 500 Internal Server Error: Detector unavailable or inference failed
pub async fn detect_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    debug!("Detect request received");

    let detector = state.vision_model_manager.detector().ok_or_else(|| {
        warn!("Detection model not loaded");
        ApiError::ModelUnavailable("Object detection model is not available".to_string())
    })?;

    let mut multipart = require_multipart(multipart)?;
    let (image, image_info) = read_image(&mut multipart, state.max_upload_bytes).await?;
    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    let result = tokio::task::spawn_blocking(move || detector.detect(&image))
        .await
        .map_err(|e| ApiError::InternalError(format!("Detection task failed: {}", e)))?
        .map_err(|e| {
            warn!("Object detection failed: {:#}", e);
            ApiError::InferenceFailed(format!("Object detection failed: {}", e))
        })?;

    let objects = result.unique_labels();

    info!(
        "Detection complete: {} boxes, {} classes {:?}, {}ms",
        result.detections.len(),
        objects.len(),
        objects,
        result.processing_time_ms
    );

    Ok(Json(DetectResponse::new(objects)))
}
