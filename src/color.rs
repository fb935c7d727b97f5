use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lighten, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

fn to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// View colours
// ---------------------------------------------------------------------------

/// X, Y and Z series of the time-series plot.
pub fn axis_colors() -> [Color32; 3] {
    let p = generate_palette(3);
    [p[0], p[1], p[2]]
}

/// General marker set in the 3D view.
pub const MARKER_COLOR: Color32 = Color32::from_rgb(40, 90, 220);

/// The selected marker in the 3D view.
pub const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(220, 40, 40);

/// Lighten `color` for points further from the camera.
/// `depth` runs from 0 (nearest) to 1 (farthest).
pub fn depth_shade(color: Color32, depth: f32) -> Color32 {
    let rgb = Srgb::new(
        color.r() as f32 / 255.0,
        color.g() as f32 / 255.0,
        color.b() as f32 / 255.0,
    );
    let hsl: Hsl = rgb.into_color();
    to_color32(hsl.lighten(0.35 * depth.clamp(0.0, 1.0)))
}
