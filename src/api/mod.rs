// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod caption;
pub mod detect;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod ocr;
pub mod upload;

pub use caption::{caption_handler, CaptionResponse};
pub use detect::{detect_handler, DetectResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, root_handler, HealthResponse, RootResponse};
pub use http_server::{create_app, start_server, AppState};
pub use ocr::{ocr_handler, OcrResponse};
