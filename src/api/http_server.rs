// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::caption::caption_handler;
use super::detect::detect_handler;
use super::handlers::{health_handler, root_handler};
use super::ocr::ocr_handler;
use crate::translation::{PassthroughTranslator, Translator};
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::VisionModelManager;

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub vision_model_manager: Arc<VisionModelManager>,
    pub translator: Arc<dyn Translator>,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("vision_model_manager", &self.vision_model_manager)
            .field("translator", &self.translator.name())
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AppState {
    pub fn new(
        vision_model_manager: Arc<VisionModelManager>,
        translator: Arc<dyn Translator>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            vision_model_manager,
            translator,
            max_upload_bytes,
        }
    }

    /// State with no engines and translation disabled
    pub fn new_for_test() -> Self {
        Self::new(
            Arc::new(VisionModelManager::empty()),
            Arc::new(PassthroughTranslator),
            MAX_IMAGE_SIZE,
        )
    }
}

/// Build the application router
///
/// Each endpoint answers with and without the trailing slash.
pub fn create_app(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ocr/", post(ocr_handler))
        .route("/ocr", post(ocr_handler))
        .route("/detect/", post(detect_handler))
        .route("/detect", post(detect_handler))
        .route("/caption/", post(caption_handler))
        .route("/caption", post(caption_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves
pub async fn start_server<F>(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
