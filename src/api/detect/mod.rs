// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection API endpoint module
//!
//! Provides POST /detect/ for listing the objects in an image.

pub mod handler;
pub mod response;

pub use handler::detect_handler;
pub use response::DetectResponse;
