use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, scene_view};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MarkerViewerApp {
    pub state: AppState,
}

impl MarkerViewerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for MarkerViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Right side panel: markers of the active frame ----
        egui::SidePanel::right("frame_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::frame_panel(ui, &self.state);
            });

        // ---- Bottom panel: 3D scatter ----
        egui::TopBottomPanel::bottom("scene_panel")
            .default_height(380.0)
            .resizable(true)
            .show(ctx, |ui| {
                scene_view::scene_panel(ui, &mut self.state);
            });

        // ---- Central panel: time series ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::marker_plot(ui, &mut self.state);
        });
    }
}
