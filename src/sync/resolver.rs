use crate::error::SkipReason;

// ---------------------------------------------------------------------------
// Pointer position → frame index
// ---------------------------------------------------------------------------

/// Maps a continuous position on the frame axis to the nearest frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameIndexResolver<'a> {
    frames: &'a [i64],
}

impl<'a> FrameIndexResolver<'a> {
    pub fn new(frames: &'a [i64]) -> Self {
        FrameIndexResolver { frames }
    }

    /// Smallest and largest frame number, or `None` for an empty table.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let min = self.frames.iter().min()?;
        let max = self.frames.iter().max()?;
        Some((*min as f64, *max as f64))
    }

    /// Index of the frame whose number is closest to `query`.
    ///
    /// Ties go to the lower index. Queries outside `[min, max]`, non-finite
    /// queries and empty tables yield [`SkipReason::QueryOutOfBounds`].
    pub fn resolve(&self, query: f64) -> Result<usize, SkipReason> {
        let out_of_bounds = |min: f64, max: f64| SkipReason::QueryOutOfBounds { query, min, max };

        let Some((min, max)) = self.bounds() else {
            return Err(out_of_bounds(f64::NAN, f64::NAN));
        };
        if !query.is_finite() || query < min || query > max {
            return Err(out_of_bounds(min, max));
        }

        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, &frame) in self.frames.iter().enumerate() {
            let dist = (frame as f64 - query).abs();
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        Ok(best)
    }
}

/// Convenience wrapper for a one-off lookup.
pub fn resolve_frame_index(query: f64, frames: &[i64]) -> Result<usize, SkipReason> {
    FrameIndexResolver::new(frames).resolve(query)
}
