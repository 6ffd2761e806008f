#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod helpers;
mod modules;
mod theme;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use folio_core::FolioConfig;
use log::{error, info};

/// Showcase data used when no config path is given.
const BUNDLED_CONFIG: &str = include_str!("../assets/folio.json");

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => load_config(&path).unwrap_or_else(|e| {
            error!("[app] {e:#}; falling back to the bundled config");
            bundled_config()
        }),
        None => {
            info!("[app] no config given, using the bundled one");
            bundled_config()
        }
    };

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("Folio")
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([360.0, 480.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Folio",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::FolioApp::new(cc, config)))),
    )
}

fn bundled_config() -> FolioConfig {
    FolioConfig::from_json_str(BUNDLED_CONFIG).unwrap_or_else(|e| {
        error!("[app] bundled config is invalid: {e}; using defaults");
        FolioConfig::default()
    })
}

fn load_config(path: &Path) -> anyhow::Result<FolioConfig> {
    let config = FolioConfig::load(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    info!(
        "[app] config {}: {} project(s), {} track(s), {} preload url(s)",
        path.display(),
        config.projects.len(),
        config.music.tracks.len(),
        config.preload.urls.len(),
    );
    Ok(config)
}
