use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use eframe::egui;

use marker_viewer::app::MarkerViewerApp;
use marker_viewer::config::Config;
use marker_viewer::state::AppState;
use marker_viewer::sync::Outcome;

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = Config::from_path(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let mut state = AppState::new(&config);
    match state.sync.load_path(&config.csv_file_path, &state.load_options) {
        Outcome::Ok(frames) => log::info!("Data loaded successfully with {frames} frames."),
        Outcome::Fatal(err) => {
            return Err(err).with_context(|| {
                format!("loading recording {}", config.csv_file_path.display())
            });
        }
        Outcome::Skipped(reason) => log::warn!("Recording not loaded: {reason}"),
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Marker Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(MarkerViewerApp::new(state)))),
    )
    .map_err(|e| anyhow!("viewer window failed: {e}"))
}
