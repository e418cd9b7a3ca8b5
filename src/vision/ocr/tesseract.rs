// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tesseract OCR engine
//!
//! Drives the `tesseract` binary over stdin/stdout. The image is re-encoded
//! as PNG and piped in; whatever Tesseract prints is the extracted text.

use anyhow::{Context, Result};
use image::DynamicImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, info};

use super::model::{OcrResult, TextRecognizer};
use crate::vision::image_utils::encode_png;

/// Default OCR language (Spanish)
pub const DEFAULT_LANGUAGE: &str = "spa";

/// Tesseract-backed text recognizer
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    /// Path or name of the tesseract binary
    binary: PathBuf,
    /// Language pack(s), e.g. "spa" or "spa+eng"
    language: String,
    /// Reported engine version
    version: String,
}

impl TesseractOcr {
    /// Locate the tesseract binary and verify the language pack is installed
    ///
    /// # Errors
    /// Returns error if:
    /// - The binary cannot be executed
    /// - Any requested language pack is missing
    pub fn new<P: AsRef<Path>>(binary: P, language: &str) -> Result<Self> {
        let binary = binary.as_ref().to_path_buf();

        let output = Command::new(&binary)
            .arg("--version")
            .output()
            .with_context(|| format!("Failed to run tesseract binary at {}", binary.display()))?;

        if !output.status.success() {
            anyhow::bail!(
                "tesseract --version exited with {}",
                output.status
            );
        }

        // Older releases print the version banner on stderr
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        let version = banner.lines().next().unwrap_or("tesseract").trim().to_string();

        let output = Command::new(&binary)
            .arg("--list-langs")
            .output()
            .context("Failed to list tesseract languages")?;

        let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
        listing.push_str(&String::from_utf8_lossy(&output.stderr));
        let installed = parse_language_list(&listing);

        for lang in language.split('+').filter(|l| !l.is_empty()) {
            if !installed.iter().any(|l| l == lang) {
                anyhow::bail!(
                    "Tesseract language pack '{}' not installed (available: {:?})",
                    lang,
                    installed
                );
            }
        }

        info!("Tesseract ready: {} (language: {})", version, language);

        Ok(Self {
            binary,
            language: language.to_string(),
            version,
        })
    }

    /// Engine version banner (e.g. "tesseract 5.3.0")
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl TextRecognizer for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult> {
        let start = Instant::now();
        let png = encode_png(image).context("Failed to encode image for tesseract")?;

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to start tesseract")?;

        let mut stdin = child
            .stdin
            .take()
            .context("Failed to open tesseract stdin")?;

        // Write stdin on its own thread; tesseract may fill stdout before reading all input
        let writer = std::thread::spawn(move || stdin.write_all(&png));

        let output = child
            .wait_with_output()
            .context("Failed to wait for tesseract")?;

        let written = writer
            .join()
            .map_err(|_| anyhow::anyhow!("tesseract stdin writer panicked"))?;

        // A rejected image ends tesseract early and breaks the pipe; its stderr explains why
        if !output.status.success() {
            anyhow::bail!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        written.context("Failed to write image to tesseract")?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        let processing_time_ms = start.elapsed().as_millis() as u64;

        debug!(
            "Tesseract extracted {} chars in {}ms",
            text.len(),
            processing_time_ms
        );

        Ok(OcrResult {
            text,
            language: self.language.clone(),
            processing_time_ms,
        })
    }
}

/// Parse the output of `tesseract --list-langs`
///
/// The first line is a header ("List of available languages in ..."),
/// followed by one language code per line.
pub fn parse_language_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of available languages"))
        .filter(|line| !line.contains(' '))
        .map(str::to_string)
        .collect()
}
