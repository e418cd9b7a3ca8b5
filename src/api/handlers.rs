// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::http_server::AppState;
use crate::vision::VisionModelInfo;

/// Banner returned by `GET /`
pub const ROOT_MESSAGE: &str = "Visual Assistant API";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub models: Vec<VisionModelInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

impl HealthResponse {
    /// "healthy" when every engine loaded, "degraded" otherwise
    pub fn from_models(models: Vec<VisionModelInfo>) -> Self {
        let issues: Vec<String> = models
            .iter()
            .filter(|m| !m.available)
            .map(|m| format!("{} model ({}) not available", m.model_type, m.name))
            .collect();

        Self {
            status: if issues.is_empty() { "healthy" } else { "degraded" }.to_string(),
            version: crate::version::VERSION_NUMBER.to_string(),
            models,
            issues: if issues.is_empty() { None } else { Some(issues) },
        }
    }
}

/// GET / - Service banner
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// GET /health - Engine availability
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let models = state.vision_model_manager.list_models();
    debug!("Health check: {} engines", models.len());
    Json(HealthResponse::from_models(models))
}
