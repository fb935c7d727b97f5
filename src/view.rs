use crate::data::model::Position;
use crate::sync::validator::{FramePositions, MarkerPosition};

// ---------------------------------------------------------------------------
// 3D view contract
// ---------------------------------------------------------------------------

/// Receiver of validated frames: the per-frame 3D scatter view.
pub trait MarkerView {
    /// Replace the previously drawn general set and highlight with `frame`
    /// and refit the bounds. Repeating the same frame must not accumulate.
    fn show_frame(&mut self, frame: &FramePositions);

    /// Drop everything drawn (a new recording was loaded).
    fn clear(&mut self);
}

/// Axis-aligned box around the drawn points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub fn around<'a>(points: impl IntoIterator<Item = &'a Position>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(p[axis]);
                bounds.max[axis] = bounds.max[axis].max(p[axis]);
            }
        }
        Some(bounds)
    }

    pub fn center(&self) -> Position {
        [0, 1, 2].map(|a| (self.min[a] + self.max[a]) * 0.5)
    }

    /// Longest edge, never zero so it can be used as a scale divisor.
    pub fn extent(&self) -> f64 {
        let longest = (0..3)
            .map(|a| self.max[a] - self.min[a])
            .fold(0.0_f64, f64::max);
        if longest > f64::EPSILON {
            longest
        } else {
            1.0
        }
    }
}

// ---------------------------------------------------------------------------
// Scene – retained state of the 3D scatter view
// ---------------------------------------------------------------------------

/// What the 3D panel currently draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    frame_number: Option<i64>,
    markers: Vec<MarkerPosition>,
    highlight: Option<Position>,
    bounds: Option<Bounds>,
}

impl Scene {
    pub fn frame_number(&self) -> Option<i64> {
        self.frame_number
    }

    pub fn markers(&self) -> &[MarkerPosition] {
        &self.markers
    }

    pub fn highlight(&self) -> Option<Position> {
        self.highlight
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.highlight.is_none()
    }
}

impl MarkerView for Scene {
    fn show_frame(&mut self, frame: &FramePositions) {
        self.markers.clear();
        self.markers.extend_from_slice(&frame.markers);
        self.highlight = frame.highlighted;
        self.frame_number = Some(frame.frame_number);
        self.bounds = Bounds::around(
            self.markers
                .iter()
                .map(|m| &m.position)
                .chain(self.highlight.as_ref()),
        );
    }

    fn clear(&mut self) {
        *self = Scene::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(number: i64, points: &[Position], highlighted: Option<Position>) -> FramePositions {
        FramePositions {
            index: 0,
            frame_number: number,
            markers: points
                .iter()
                .enumerate()
                .map(|(i, &position)| MarkerPosition {
                    name: format!("m{i}"),
                    position,
                })
                .collect(),
            highlighted,
            rejected: Vec::new(),
        }
    }

    #[test]
    fn repeated_frames_do_not_accumulate() {
        let mut scene = Scene::default();
        let f = frame(1, &[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]], Some([1.0, 2.0, 3.0]));
        scene.show_frame(&f);
        let once = scene.clone();
        scene.show_frame(&f);
        assert_eq!(scene, once);
        assert_eq!(scene.markers().len(), 2);
    }

    #[test]
    fn new_frame_replaces_previous_points_and_highlight() {
        let mut scene = Scene::default();
        scene.show_frame(&frame(1, &[[0.0; 3], [5.0; 3]], Some([5.0; 3])));
        scene.show_frame(&frame(2, &[[1.0; 3]], None));
        assert_eq!(scene.markers().len(), 1);
        assert_eq!(scene.highlight(), None);
        assert_eq!(scene.frame_number(), Some(2));
    }

    #[test]
    fn bounds_fit_drawn_points() {
        let mut scene = Scene::default();
        scene.show_frame(&frame(1, &[[-1.0, 2.0, 0.0], [3.0, -4.0, 10.0]], None));
        let b = scene.bounds().unwrap();
        assert_eq!(b.min, [-1.0, -4.0, 0.0]);
        assert_eq!(b.max, [3.0, 2.0, 10.0]);
        assert_eq!(b.center(), [1.0, -1.0, 5.0]);
        assert_eq!(b.extent(), 10.0);
    }

    #[test]
    fn single_point_extent_is_not_zero() {
        let b = Bounds::around(&[[2.0, 2.0, 2.0]]).unwrap();
        assert_eq!(b.extent(), 1.0);
    }

    #[test]
    fn clear_empties_the_scene() {
        let mut scene = Scene::default();
        scene.show_frame(&frame(1, &[[0.0; 3]], None));
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.bounds(), None);
    }
}
