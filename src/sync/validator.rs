use crate::data::model::{is_finite, MarkerTable, Position};
use crate::error::SkipReason;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Coordinate bounds a renderable marker must respect.
///
/// Both envelopes are checked on every component and both must pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionLimits {
    /// Expected capture volume.
    pub plausible: (f64, f64),
    /// Anything beyond this is a sensor or format error.
    pub extreme: (f64, f64),
}

impl Default for PositionLimits {
    fn default() -> Self {
        PositionLimits {
            plausible: (-1000.0, 10000.0),
            extreme: (-1e5, 1e5),
        }
    }
}

fn within(pos: &Position, (lo, hi): (f64, f64)) -> bool {
    pos.iter().all(|&v| v >= lo && v <= hi)
}

impl PositionLimits {
    pub fn within_plausible(&self, pos: &Position) -> bool {
        within(pos, self.plausible)
    }

    pub fn within_extreme(&self, pos: &Position) -> bool {
        within(pos, self.extreme)
    }

    /// Check one marker position.
    pub fn check(&self, pos: &Position) -> Result<(), Rejection> {
        if !is_finite(pos) {
            Err(Rejection::NonFinite)
        } else if !self.within_extreme(pos) {
            Err(Rejection::Extreme)
        } else if !self.within_plausible(pos) {
            Err(Rejection::OutOfBounds)
        } else {
            Ok(())
        }
    }
}

/// Why a single marker was left out of the rendered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NonFinite,
    /// Outside the plausible capture volume.
    OutOfBounds,
    /// Outside the extreme envelope.
    Extreme,
}

// ---------------------------------------------------------------------------
// FramePositions – the validated markers of one frame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPosition {
    pub name: String,
    pub position: Position,
}

/// Markers of one frame that are safe to render. Built per update, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePositions {
    pub index: usize,
    pub frame_number: i64,
    pub markers: Vec<MarkerPosition>,
    /// The selected marker, if it passed the same checks on its own.
    pub highlighted: Option<Position>,
    /// Markers left out, with the reason.
    pub rejected: Vec<(String, Rejection)>,
}

/// Validate one frame's flat X/Y/Z values.
///
/// `values` holds one triplet per entry of `markers`; anything else is a
/// malformed frame and the whole update is skipped. A frame where no marker
/// passes is skipped with [`SkipReason::NoValidMarkers`].
pub fn validate_frame(
    index: usize,
    frame_number: i64,
    markers: &[String],
    values: &[f64],
    selected: Option<usize>,
    limits: &PositionLimits,
) -> Result<FramePositions, SkipReason> {
    if values.len() % 3 != 0 || values.len() / 3 != markers.len() {
        return Err(SkipReason::MalformedFrame {
            index,
            values: values.len(),
            markers: markers.len(),
        });
    }

    let mut accepted = Vec::with_capacity(markers.len());
    let mut rejected = Vec::new();
    let mut highlighted = None;

    for (i, (name, chunk)) in markers.iter().zip(values.chunks_exact(3)).enumerate() {
        let position: Position = [chunk[0], chunk[1], chunk[2]];
        match limits.check(&position) {
            Ok(()) => {
                if selected == Some(i) {
                    highlighted = Some(position);
                }
                accepted.push(MarkerPosition {
                    name: name.clone(),
                    position,
                });
            }
            Err(reason) => {
                log::debug!("Skipping marker {name} at {position:?} in frame {index}: {reason:?}");
                rejected.push((name.clone(), reason));
            }
        }
    }

    if accepted.is_empty() {
        return Err(SkipReason::NoValidMarkers { index });
    }

    Ok(FramePositions {
        index,
        frame_number,
        markers: accepted,
        highlighted,
        rejected,
    })
}

/// Validate the frame at `index` of a loaded table.
pub fn validate_table_frame(
    table: &MarkerTable,
    index: usize,
    limits: &PositionLimits,
) -> Result<FramePositions, SkipReason> {
    let out_of_range = || SkipReason::FrameIndexOutOfRange {
        index,
        len: table.len(),
    };
    let values = table.frame_values(index).ok_or_else(out_of_range)?;
    let frame_number = *table.frame_numbers().get(index).ok_or_else(out_of_range)?;
    validate_frame(
        index,
        frame_number,
        table.markers(),
        values,
        table.selected_group(),
        limits,
    )
}
