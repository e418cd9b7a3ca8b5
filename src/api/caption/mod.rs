// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image caption API endpoint module
//!
//! Provides POST /caption/ for a translated one-sentence description.

pub mod handler;
pub mod response;

pub use handler::caption_handler;
pub use response::CaptionResponse;
