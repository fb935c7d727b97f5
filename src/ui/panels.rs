use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{HIGHLIGHT_COLOR, MARKER_COLOR};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Right side panel – markers of the active frame
// ---------------------------------------------------------------------------

/// List the markers drawn in the 3D view.
pub fn frame_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Frame");
    ui.separator();

    let scene = state.sync.view();
    let Some(frame_number) = scene.frame_number() else {
        ui.label("Hover the plot to inspect a frame.");
        return;
    };
    ui.label(format!("Frame {frame_number}: {} markers", scene.markers().len()));

    match scene.highlight() {
        Some([x, y, z]) => ui.label(
            RichText::new(format!("Selected: ({x:.1}, {y:.1}, {z:.1})")).color(HIGHLIGHT_COLOR),
        ),
        None => ui.label(RichText::new("Selected marker not valid in this frame").weak()),
    };
    let limits = state.sync.limits();
    ui.label(
        RichText::new(format!(
            "Plausible {:.0}..{:.0}, extreme {:.0}..{:.0}",
            limits.plausible.0, limits.plausible.1, limits.extreme.0, limits.extreme.1
        ))
        .weak(),
    );
    ui.add_space(4.0);

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(60.0))
        .columns(Column::auto().at_least(50.0), 3)
        .header(18.0, |mut header| {
            for title in ["Marker", "X", "Y", "Z"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for marker in scene.markers() {
                body.row(16.0, |mut row| {
                    row.col(|ui| {
                        ui.label(RichText::new(&marker.name).color(MARKER_COLOR));
                    });
                    for v in marker.position {
                        row.col(|ui| {
                            ui.monospace(format!("{v:.1}"));
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = state.sync.table() {
            ui.label(table.to_string());
        }

        if let Some(index) = state.sync.active_frame() {
            ui.separator();
            ui.label(format!("frame index {index}"));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open marker recording")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_recording(&path);
    }
}
