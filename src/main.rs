// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use std::{env, sync::Arc};
use tokio::signal;
use visual_assistant::{
    api::{start_server, AppState},
    config::AppConfig,
    translation::build_translator,
    vision::VisionModelManager,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = AppConfig::parse();
    config.validate().map_err(anyhow::Error::msg)?;
    let addr = config.bind_address().map_err(anyhow::Error::msg)?;

    println!("🚀 Starting Visual Assistant API...\n");
    println!("📦 BUILD VERSION: {}", visual_assistant::version::VERSION);
    println!("📅 Build Date: {}", visual_assistant::version::BUILD_DATE);
    println!();

    // Load vision engines; each one is optional
    println!("👁️  Initializing vision model manager...");
    let manager = Arc::new(VisionModelManager::new(config.vision_config()).await?);

    println!("   Vision engines:");
    for model in manager.list_models() {
        let status = if model.available { "✓" } else { "✗" };
        println!("     {} {} ({})", status, model.name, model.model_type);
    }
    if !manager.has_detector() {
        println!("   /detect/ will return 500 until a detection model is available");
    }
    if !manager.has_captioner() {
        println!("   /caption/ will return 500 until a caption model is available");
    }

    let translation_config = config.translation_config();
    let translator = build_translator(&translation_config)?;
    if translation_config.enabled {
        println!(
            "🌐 Caption translation: {} -> {} via {}",
            translation_config.source_lang, translation_config.target_lang, translator.name()
        );
    } else {
        println!("🌐 Caption translation disabled");
    }

    let state = Arc::new(AppState::new(manager, translator, config.max_upload_bytes));

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("Listening on:   {}", addr);
    println!("\nAPI Endpoints:");
    println!("  Root:         GET  http://localhost:{}/", config.port);
    println!("  Health:       GET  http://localhost:{}/health", config.port);
    println!("  OCR:          POST http://localhost:{}/ocr/", config.port);
    println!("  Detect:       POST http://localhost:{}/detect/", config.port);
    println!("  Caption:      POST http://localhost:{}/caption/", config.port);
    println!("\nTest with curl:");
    println!(
        "  curl -X POST -F 'file=@photo.jpg' http://localhost:{}/caption/",
        config.port
    );
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    start_server(addr, state, async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        println!("\n⏹️  Shutting down...");
    })
    .await?;

    println!("👋 Goodbye!");
    Ok(())
}
