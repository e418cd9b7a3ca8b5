// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart image upload extraction

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use bytes::Bytes;
use image::DynamicImage;
use tracing::{debug, warn};

use super::errors::ApiError;
use crate::vision::{decode_image_bytes, ImageInfo};

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// An uploaded file
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Read the `file` field from a multipart body, ignoring other fields
pub async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        debug!(
            "Received upload {:?} ({:?}), {} bytes",
            file_name,
            content_type,
            data.len()
        );

        return Ok(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    Err(ApiError::InvalidRequest(format!(
        "multipart field '{}' is required",
        FILE_FIELD
    )))
}

/// Read the `file` field and decode it as an image no larger than `max_bytes`
pub async fn read_image(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<(DynamicImage, ImageInfo), ApiError> {
    let upload = read_file_field(multipart).await?;
    decode_image_bytes(&upload.data, max_bytes).map_err(|e| {
        warn!("Failed to decode image: {}", e);
        ApiError::from(e)
    })
}

/// Turn a rejected multipart extraction (wrong content type, missing
/// boundary) into a JSON error
pub fn require_multipart(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Multipart, ApiError> {
    multipart.map_err(|rejection| {
        warn!("Rejected multipart request: {}", rejection.body_text());
        ApiError::InvalidRequest(rejection.body_text())
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    warn!("Multipart error: {}", err);
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::InvalidRequest(err.body_text())
    }
}
