use eframe::egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui};
use glam::{Mat3, Vec3};

use crate::color::{depth_shade, HIGHLIGHT_COLOR, MARKER_COLOR};
use crate::data::model::Position;
use crate::state::{AppState, Orbit};
use crate::view::Bounds;

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Camera rotation for the orbit. Recording space is Z-up, view space Y-up.
fn rotation(orbit: &Orbit) -> Mat3 {
    Mat3::from_rotation_x(orbit.pitch) * Mat3::from_rotation_y(orbit.yaw)
}

fn to_view_space([x, y, z]: Position) -> Vec3 {
    Vec3::new(x as f32, z as f32, -(y as f32))
}

/// Orthographic projection of `pos`, fitted to `bounds`.
///
/// Returns the point in unit screen space (roughly `-0.5..=0.5` for points
/// inside the bounds, +y up) and its depth (larger is further away).
pub fn project(pos: Position, bounds: &Bounds, orbit: &Orbit) -> (glam::Vec2, f32) {
    let centered = to_view_space(pos) - to_view_space(bounds.center());
    let v = rotation(orbit) * (centered / bounds.extent() as f32);
    (v.truncate(), -v.z)
}

fn to_screen(rect: &Rect, p: glam::Vec2) -> Pos2 {
    let scale = rect.width().min(rect.height()) * 0.8;
    Pos2::new(rect.center().x + p.x * scale, rect.center().y - p.y * scale)
}

// ---------------------------------------------------------------------------
// 3D scatter panel
// ---------------------------------------------------------------------------

/// Paint the current scene: general markers, the highlighted marker, and an
/// axis gizmo. Drag to orbit.
pub fn scene_panel(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Marker Positions at Selected Frame");

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::drag());
    if response.dragged() {
        let d = response.drag_delta();
        state.orbit.drag(d.x, d.y);
    }
    let rect = response.rect;
    painter.rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);

    let scene = state.sync.view();
    let Some(bounds) = scene.bounds() else {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No frame selected",
            FontId::proportional(14.0),
            ui.visuals().weak_text_color(),
        );
        return;
    };
    let orbit = state.orbit;

    draw_gizmo(&painter, rect, &orbit);

    let mut points: Vec<(Pos2, f32)> = scene
        .markers()
        .iter()
        .map(|m| {
            let (p, depth) = project(m.position, &bounds, &orbit);
            (to_screen(&rect, p), depth)
        })
        .collect();
    points.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (pos, depth) in points {
        let shade = depth_shade(MARKER_COLOR, depth + 0.5);
        painter.circle_filled(pos, 3.5, shade);
    }

    if let Some(h) = scene.highlight() {
        let (p, _) = project(h, &bounds, &orbit);
        let pos = to_screen(&rect, p);
        painter.circle_filled(pos, 7.0, HIGHLIGHT_COLOR);
        painter.circle_stroke(pos, 8.0, Stroke::new(1.0, Color32::WHITE));
    }

    if let Some(frame) = scene.frame_number() {
        painter.text(
            rect.right_top() + eframe::egui::vec2(-8.0, 8.0),
            Align2::RIGHT_TOP,
            format!("frame {frame}"),
            FontId::monospace(12.0),
            ui.visuals().text_color(),
        );
    }
}

/// Small X/Y/Z tripod in the lower-left corner.
fn draw_gizmo(painter: &eframe::egui::Painter, rect: Rect, orbit: &Orbit) {
    let origin = rect.left_bottom() + eframe::egui::vec2(36.0, -36.0);
    let rot = rotation(orbit);
    let axes = [
        ("X", [1.0, 0.0, 0.0], Color32::from_rgb(220, 80, 80)),
        ("Y", [0.0, 1.0, 0.0], Color32::from_rgb(80, 200, 80)),
        ("Z", [0.0, 0.0, 1.0], Color32::from_rgb(80, 120, 230)),
    ];
    for (label, axis, color) in axes {
        let v = rot * to_view_space(axis);
        let end = origin + eframe::egui::vec2(v.x * 24.0, -v.y * 24.0);
        painter.line_segment([origin, end], Stroke::new(2.0, color));
        painter.text(end, Align2::CENTER_CENTER, label, FontId::proportional(11.0), color);
    }
}
