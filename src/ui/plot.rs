use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, VLine};

use crate::color::axis_colors;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Time-series plot (central panel)
// ---------------------------------------------------------------------------

const AXIS_LABELS: [&str; 3] = ["X Position", "Y Position", "Z Position"];

/// Render the selected marker's X/Y/Z over time; hovering drives the 3D view.
pub fn marker_plot(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.sync.table() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a recording to view markers  (File → Open…)");
        });
        return;
    };

    ui.heading(format!("Marker {} Position Over Time", table.selected_name()));

    let colors = axis_colors();
    let frames = table.frame_numbers();
    let series = table.selected_series();
    let cursor = state
        .sync
        .active_frame()
        .and_then(|i| frames.get(i))
        .map(|&f| f as f64);

    let response = Plot::new("marker_plot")
        .legend(Legend::default())
        .x_axis_label("Time (frames)")
        .y_axis_label("Position (units)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (axis, (&label, &color)) in AXIS_LABELS.iter().zip(colors.iter()).enumerate() {
                let points: PlotPoints = frames
                    .iter()
                    .zip(series.iter())
                    .map(|(&f, pos)| [f as f64, pos[axis]])
                    .collect();
                plot_ui.line(Line::new(label, points).color(color).width(1.5));
            }

            if let Some(x) = cursor {
                plot_ui.vline(VLine::new("Frame", x).color(Color32::GRAY));
            }

            plot_ui.pointer_coordinate().map(|p| p.x)
        });

    if !response.response.hovered() {
        state.last_hover = None;
        return;
    }
    if let Some(x) = response.inner {
        if state.last_hover != Some(x) {
            state.last_hover = Some(x);
            state.hover_frame_axis(x);
        }
    }
}
