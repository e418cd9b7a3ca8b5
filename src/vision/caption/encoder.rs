// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BLIP vision encoder
//!
//! Runs the ViT image encoder and returns the patch embeddings the text
//! decoder cross-attends to.

use anyhow::{Context, Result};
use ndarray::{Array3, Array4, ArrayViewD, IxDyn};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::BLIP_INPUT_SIZE;
use crate::vision::onnx::{build_cpu_session, first_input_name, lock_session};

/// BLIP vision encoder
#[derive(Clone)]
pub struct BlipVisionEncoder {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
}

impl std::fmt::Debug for BlipVisionEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlipVisionEncoder")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl BlipVisionEncoder {
    /// Load the vision encoder from an ONNX file
    ///
    /// # Errors
    /// Returns error if the file is missing or ONNX Runtime rejects it
    pub fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();

        info!("Loading BLIP vision encoder from {}", model_path.display());

        let session = build_cpu_session(model_path, intra_threads)
            .context("Failed to load BLIP vision encoder")?;
        let input_name = first_input_name(&session, "pixel_values");

        debug!("BLIP vision encoder input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
        })
    }

    /// Encode a preprocessed image into hidden states [1, seq_len, hidden]
    pub fn encode(&self, input: Array4<f32>) -> Result<Array3<f32>> {
        let shape = input.shape();
        if shape.len() != 4 || shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        if shape[2] != BLIP_INPUT_SIZE as usize || shape[3] != BLIP_INPUT_SIZE as usize {
            debug!(
                "Input size {}x{} differs from expected {}x{}",
                shape[2], shape[3], BLIP_INPUT_SIZE, BLIP_INPUT_SIZE
            );
        }

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = lock_session(&self.session)?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Vision encoder inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract encoder output")?;
        debug!("Encoder output shape: {:?}", output_tensor.shape());

        to_hidden_states(&output_tensor)
    }
}

/// Copy an encoder output into an owned [1, seq_len, hidden] array
pub fn to_hidden_states(output: &ArrayViewD<f32>) -> Result<Array3<f32>> {
    let shape = output.shape();
    let (seq_len, hidden) = match shape.len() {
        3 if shape[0] == 1 => (shape[1], shape[2]),
        2 => (shape[0], shape[1]),
        _ => anyhow::bail!("Unexpected encoder output shape: {:?}", shape),
    };

    let mut states = Array3::<f32>::zeros((1, seq_len, hidden));
    for s in 0..seq_len {
        for h in 0..hidden {
            states[[0, s, h]] = if shape.len() == 3 {
                output[IxDyn(&[0, s, h])]
            } else {
                output[IxDyn(&[s, h])]
            };
        }
    }

    Ok(states)
}
