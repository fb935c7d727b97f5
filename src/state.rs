use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::data::loader::LoadOptions;
use crate::sync::{Outcome, SyncController};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Orbit camera of the 3D panel, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            yaw: -std::f32::consts::FRAC_PI_4,
            pitch: std::f32::consts::FRAC_PI_6,
        }
    }
}

impl Orbit {
    /// Rotate by a pointer drag (in points).
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * 0.01;
        self.pitch = (self.pitch + dy * 0.01).clamp(-1.5, 1.5);
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Synchronization core: recording, active frame, 3D scene.
    pub sync: SyncController,

    /// How recordings are parsed (from the config file).
    pub load_options: LoadOptions,

    /// 3D panel camera.
    pub orbit: Orbit,

    /// Last skipped update or load failure, shown in the top bar.
    pub status_message: Option<String>,

    /// Last hover position fed to the controller, so a still pointer is not re-sent.
    pub last_hover: Option<f64>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            sync: SyncController::from_config(config),
            load_options: config.load_options(),
            orbit: Orbit::default(),
            status_message: None,
            last_hover: None,
        }
    }

    /// Replace the recording. On failure the previous one stays loaded.
    pub fn open_recording(&mut self, path: &Path) {
        match self.sync.load_path(path, &self.load_options) {
            Outcome::Ok(frames) => {
                log::info!("Opened {} ({frames} frames)", path.display());
                self.status_message = None;
                self.last_hover = None;
                self.orbit = Orbit::default();
            }
            Outcome::Fatal(err) => {
                self.status_message = Some(format!("Error: {err}"));
            }
            Outcome::Skipped(reason) => {
                self.status_message = Some(reason.to_string());
            }
        }
    }

    /// Feed a hover position from the time-series plot.
    pub fn hover_frame_axis(&mut self, x: f64) {
        match self.sync.pointer_moved(x, Instant::now()) {
            Outcome::Ok(_) => self.status_message = None,
            Outcome::Skipped(reason) => self.status_message = Some(reason.to_string()),
            Outcome::Fatal(err) => self.status_message = Some(format!("Error: {err}")),
        }
    }
}
