// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BLIP text decoder
//!
//! Generates a caption from vision encoder hidden states with greedy
//! decoding. Every step re-runs the decoder over the full token prefix,
//! which is cheap at BLIP's 20-token caption length.

use anyhow::{Context, Result};
use ndarray::{Array2, Array3, IxDyn};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::vision::onnx::{build_cpu_session, has_input, lock_session};

/// Default maximum caption length in tokens (BLIP generation default)
pub const DEFAULT_MAX_LENGTH: usize = 20;

/// Minimum caption length setting
pub const MIN_LENGTH: usize = 1;

/// Maximum caption length setting
pub const MAX_LENGTH: usize = 128;

/// BLIP decoder start token id when the tokenizer lacks `[DEC]`
pub const DEFAULT_BOS_TOKEN_ID: u32 = 30522;

/// BERT `[SEP]` token id, BLIP's end of sequence
pub const DEFAULT_EOS_TOKEN_ID: u32 = 102;

/// Special tokens stripped from generated text
const SPECIAL_TOKENS: [&str; 5] = ["[DEC]", "[SEP]", "[CLS]", "[PAD]", "[UNK]"];

/// BLIP text decoder model
#[derive(Clone)]
pub struct BlipTextDecoder {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Tokenizer for decoding generated ids
    tokenizer: Arc<Tokenizer>,
    /// Whether the export takes an explicit `encoder_attention_mask`
    needs_encoder_mask: bool,
    /// Maximum tokens to generate
    max_length: usize,
    bos_token_id: u32,
    eos_token_id: u32,
}

impl std::fmt::Debug for BlipTextDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlipTextDecoder")
            .field("max_length", &self.max_length)
            .field("bos_token_id", &self.bos_token_id)
            .field("eos_token_id", &self.eos_token_id)
            .field("needs_encoder_mask", &self.needs_encoder_mask)
            .finish_non_exhaustive()
    }
}

impl BlipTextDecoder {
    /// Load the text decoder and its tokenizer
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - Tokenizer file not found or unreadable
    /// - ONNX Runtime initialization fails
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        tokenizer_path: P,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !tokenizer_path.exists() {
            anyhow::bail!("BLIP tokenizer not found: {}", tokenizer_path.display());
        }

        info!("Loading BLIP text decoder from {}", model_path.display());

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let session = build_cpu_session(model_path, intra_threads)
            .context("Failed to load BLIP text decoder")?;

        let input_names: Vec<_> = session.inputs.iter().map(|i| &i.name).collect();
        debug!("Decoder inputs: {:?}", input_names);
        let needs_encoder_mask = has_input(&session, "encoder_attention_mask");

        let bos_token_id = tokenizer
            .token_to_id("[DEC]")
            .unwrap_or(DEFAULT_BOS_TOKEN_ID);
        let eos_token_id = tokenizer
            .token_to_id("[SEP]")
            .unwrap_or(DEFAULT_EOS_TOKEN_ID);

        debug!(
            "Special tokens - BOS: {}, EOS: {}",
            bos_token_id, eos_token_id
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            needs_encoder_mask,
            max_length: DEFAULT_MAX_LENGTH,
            bos_token_id,
            eos_token_id,
        })
    }

    /// Set the maximum caption length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length.clamp(MIN_LENGTH, MAX_LENGTH);
        self
    }

    /// Current maximum caption length
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Generate a caption from encoder hidden states [1, seq_len, hidden]
    pub fn generate(&self, encoder_hidden_states: &Array3<f32>) -> Result<String> {
        let tokens = greedy_decode(
            self.bos_token_id,
            self.eos_token_id,
            self.max_length,
            |prefix| self.forward(encoder_hidden_states, prefix),
        )?;

        debug!("Generated {} tokens: {:?}", tokens.len(), tokens);

        let text = self
            .tokenizer
            .decode(&tokens, true)
            .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))?;

        Ok(clean_caption(&text))
    }

    /// Run a single forward pass, returning logits for the last position
    fn forward(&self, encoder_hidden_states: &Array3<f32>, input_ids: &[u32]) -> Result<Vec<f32>> {
        let len = input_ids.len();
        let ids = Array2::from_shape_vec(
            (1, len),
            input_ids.iter().map(|&t| t as i64).collect(),
        )
        .context("Failed to shape input ids")?;
        let attention_mask = Array2::<i64>::ones((1, len));

        let ids_value = Value::from_array(ids).context("Failed to create input ids tensor")?;
        let mask_value =
            Value::from_array(attention_mask).context("Failed to create attention mask tensor")?;
        let encoder_value = Value::from_array(encoder_hidden_states.to_owned())
            .context("Failed to create encoder hidden states tensor")?;

        let mut session = lock_session(&self.session)?;

        let outputs = if self.needs_encoder_mask {
            let encoder_mask = Array2::<i64>::ones((1, encoder_hidden_states.shape()[1]));
            let encoder_mask_value = Value::from_array(encoder_mask)
                .context("Failed to create encoder attention mask tensor")?;
            session
                .run(ort::inputs![
                    "input_ids" => ids_value,
                    "attention_mask" => mask_value,
                    "encoder_hidden_states" => encoder_value,
                    "encoder_attention_mask" => encoder_mask_value
                ])
                .context("Decoder inference failed")?
        } else {
            session
                .run(ort::inputs![
                    "input_ids" => ids_value,
                    "attention_mask" => mask_value,
                    "encoder_hidden_states" => encoder_value
                ])
                .context("Decoder inference failed")?
        };

        let logits = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract logits tensor")?;

        let shape = logits.shape();
        match shape.len() {
            3 => {
                let last = shape[1].saturating_sub(1);
                Ok((0..shape[2]).map(|v| logits[IxDyn(&[0, last, v])]).collect())
            }
            2 => Ok((0..shape[1]).map(|v| logits[IxDyn(&[0, v])]).collect()),
            _ => anyhow::bail!("Unexpected decoder output shape: {:?}", shape),
        }
    }
}

/// Greedy autoregressive decoding
///
/// `step` receives the current token prefix (BOS first) and returns the
/// next-token logits. Generation stops at `eos` or when the sequence holds
/// `max_length` tokens, BOS included. The returned ids exclude BOS and EOS.
pub fn greedy_decode<F>(bos: u32, eos: u32, max_length: usize, mut step: F) -> Result<Vec<u32>>
where
    F: FnMut(&[u32]) -> Result<Vec<f32>>,
{
    let mut tokens = vec![bos];

    while tokens.len() < max_length.max(1) {
        let logits = step(&tokens)?;
        let next = argmax(&logits).context("Decoder returned empty logits")?;
        if next == eos {
            break;
        }
        tokens.push(next);
    }

    Ok(tokens.split_off(1))
}

fn argmax(logits: &[f32]) -> Option<u32> {
    logits
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx as u32)
}

/// Strip leftover special tokens and collapse whitespace
pub fn clean_caption(text: &str) -> String {
    let mut cleaned = text.to_string();
    for token in SPECIAL_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
