use std::fmt;

// ---------------------------------------------------------------------------
// Position – one marker sample
// ---------------------------------------------------------------------------

/// X, Y, Z coordinates of a marker in recording units.
pub type Position = [f64; 3];

/// Whether every component is neither NaN nor infinite.
pub fn is_finite(pos: &Position) -> bool {
    pos.iter().all(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// MarkerTable – the sanitized recording
// ---------------------------------------------------------------------------

/// The sanitized recording. Immutable once built by the loader.
///
/// Marker positions are stored flat and row-major:
/// `positions[(frame * markers.len() + marker) * 3 + axis]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerTable {
    frame_numbers: Vec<i64>,
    /// Names of the all-marker groups, in column order.
    markers: Vec<String>,
    positions: Vec<f64>,
    /// The selected marker's own X/Y/Z series (time-series view).
    selected_name: String,
    selected_series: Vec<Position>,
    /// Group index of the selected marker, if its columns are one of the groups.
    selected_group: Option<usize>,
}

impl MarkerTable {
    /// Assemble a table from sanitized columns.
    ///
    /// Callers guarantee `positions.len() == frame_numbers.len() * markers.len() * 3`
    /// and `selected_series.len() == frame_numbers.len()`.
    pub(crate) fn from_parts(
        frame_numbers: Vec<i64>,
        markers: Vec<String>,
        positions: Vec<f64>,
        selected_name: String,
        selected_series: Vec<Position>,
        selected_group: Option<usize>,
    ) -> Self {
        debug_assert_eq!(positions.len(), frame_numbers.len() * markers.len() * 3);
        debug_assert_eq!(selected_series.len(), frame_numbers.len());
        MarkerTable {
            frame_numbers,
            markers,
            positions,
            selected_name,
            selected_series,
            selected_group,
        }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frame_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_numbers.is_empty()
    }

    pub fn frame_numbers(&self) -> &[i64] {
        &self.frame_numbers
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn selected_name(&self) -> &str {
        &self.selected_name
    }

    pub fn selected_series(&self) -> &[Position] {
        &self.selected_series
    }

    pub fn selected_group(&self) -> Option<usize> {
        self.selected_group
    }

    /// Flat X/Y/Z values of every marker at `index`.
    pub fn frame_values(&self, index: usize) -> Option<&[f64]> {
        let stride = self.markers.len() * 3;
        let start = index.checked_mul(stride)?;
        self.positions.get(start..start + stride)
    }

    /// Position of one named marker at `index`.
    pub fn position(&self, index: usize, marker: &str) -> Option<Position> {
        let m = self.markers.iter().position(|name| name == marker)?;
        let values = self.frame_values(index)?;
        Some([values[m * 3], values[m * 3 + 1], values[m * 3 + 2]])
    }

    /// Smallest and largest frame number.
    pub fn frame_range(&self) -> Option<(i64, i64)> {
        Some((*self.frame_numbers.first()?, *self.frame_numbers.last()?))
    }
}

impl fmt::Display for MarkerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame_range() {
            Some((lo, hi)) => write!(
                f,
                "{} frames ({lo}..={hi}), {} markers, selected '{}'",
                self.len(),
                self.markers.len(),
                self.selected_name
            ),
            None => write!(f, "empty recording, selected '{}'", self.selected_name),
        }
    }
}
