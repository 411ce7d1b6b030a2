// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! qrlink desktop application entry point.

use anyhow::Result;
use qrlink::app::TrackerApp;
use qrlink::config::TrackerConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = TrackerConfig::load_or_default();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("qrlink - Object Tracking & QR Association"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "qrlink",
        options,
        Box::new(|_cc| Ok(Box::new(TrackerApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
