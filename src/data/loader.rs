use std::path::Path;

use crate::error::LoadError;

use super::model::{MarkerTable, Position};
use super::raw::{self, Cell, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// What the loader needs to know about the recording's layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Substring identifying the selected marker's three columns.
    pub marker_name: String,
    pub frame_column: String,
    /// Substring shared by all-marker position columns.
    pub marker_group_prefix: String,
    /// Metadata lines before the CSV header.
    pub skip_rows: usize,
}

impl LoadOptions {
    pub fn new(marker_name: impl Into<String>) -> Self {
        LoadOptions {
            marker_name: marker_name.into(),
            frame_column: "Frame".to_string(),
            marker_group_prefix: "<T-".to_string(),
            skip_rows: 1,
        }
    }
}

/// Load and sanitize a recording.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row after `skip_rows` metadata lines
/// * `.parquet` – one flat column per header (no metadata rows)
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<MarkerTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" | "txt" => raw::read_csv_file(path, options.skip_rows)?,
        "parquet" | "pq" => raw::read_parquet_file(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let table = sanitize(raw, options)?;
    log::info!("Loaded {}: {table}", path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Sanitation pipeline
// ---------------------------------------------------------------------------

/// Row counts removed or repaired by each sanitation stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitationReport {
    pub input_rows: usize,
    pub empty_rows: usize,
    pub incomplete_rows: usize,
    pub zero_filled_cells: usize,
    pub non_finite_rows: usize,
    /// Rows whose frame number went backwards.
    pub out_of_order_rows: usize,
    pub duplicate_frames: usize,
}

impl SanitationReport {
    pub fn kept_rows(&self) -> usize {
        self.input_rows
            - self.empty_rows
            - self.incomplete_rows
            - self.non_finite_rows
            - self.out_of_order_rows
    }
}

/// Column positions resolved once against the header.
#[derive(Debug)]
struct Layout {
    frame: usize,
    selected: [usize; 3],
    groups: Vec<usize>,
    marker_names: Vec<String>,
    selected_group: Option<usize>,
}

fn resolve_layout(raw: &RawTable, options: &LoadOptions) -> Result<Layout, LoadError> {
    let frame = raw
        .column_index(&options.frame_column)
        .ok_or_else(|| LoadError::MissingColumn(options.frame_column.clone()))?;

    let selected: Vec<usize> = raw
        .columns_containing(&options.marker_name)
        .into_iter()
        .filter(|&c| c != frame)
        .collect();
    let selected: [usize; 3] = selected
        .as_slice()
        .try_into()
        .map_err(|_| LoadError::MarkerColumns {
            marker: options.marker_name.clone(),
            found: selected.len(),
        })?;

    let groups: Vec<usize> = raw
        .columns_containing(&options.marker_group_prefix)
        .into_iter()
        .filter(|&c| c != frame)
        .collect();
    if groups.len() % 3 != 0 {
        return Err(LoadError::MarkerGroupNotTriplet {
            prefix: options.marker_group_prefix.clone(),
            count: groups.len(),
        });
    }

    let marker_names: Vec<String> = groups
        .chunks_exact(3)
        .map(|g| marker_label(&raw.headers()[g[0]], &options.marker_group_prefix))
        .collect();

    let selected_group = groups
        .chunks_exact(3)
        .position(|g| g == selected.as_slice());

    if groups.is_empty() {
        log::warn!(
            "No marker columns with prefix '{}'; the 3D view will stay empty",
            options.marker_group_prefix
        );
    } else if selected_group.is_none() {
        log::warn!(
            "Marker '{}' is not one of the {} marker groups; it will not be highlighted",
            options.marker_name,
            marker_names.len()
        );
    }

    Ok(Layout {
        frame,
        selected,
        groups,
        marker_names,
        selected_group,
    })
}

/// Readable marker name from the first header of its group:
/// `"<T-RKNE> X"` becomes `"RKNE"`.
fn marker_label(header: &str, prefix: &str) -> String {
    let mut name = header.trim();
    if let Some(stripped) = name
        .strip_suffix(['X', 'Y', 'Z', 'x', 'y', 'z'])
        .and_then(|s| s.strip_suffix([' ', '_', ':', '.']))
    {
        name = stripped.trim_end();
    }
    let name = name.replacen(prefix, "", 1);
    let name = name.trim().trim_end_matches('>').trim();
    if name.is_empty() {
        header.trim().to_string()
    } else {
        name.to_string()
    }
}

/// Frame numbers are integral; a fractional value counts as missing.
fn frame_cell(cell: Cell) -> Cell {
    cell.filter(|v| !v.is_finite() || v.fract() == 0.0)
}

/// Run the sanitation pipeline over a raw table.
pub fn sanitize(raw: RawTable, options: &LoadOptions) -> Result<MarkerTable, LoadError> {
    sanitize_with_report(raw, options).map(|(table, _)| table)
}

/// Like [`sanitize`], also returning what each stage removed or repaired.
pub fn sanitize_with_report(
    raw: RawTable,
    options: &LoadOptions,
) -> Result<(MarkerTable, SanitationReport), LoadError> {
    let layout = resolve_layout(&raw, options)?;
    let mut report = SanitationReport {
        input_rows: raw.len(),
        ..Default::default()
    };

    let n_markers = layout.marker_names.len();
    let mut frame_numbers: Vec<i64> = Vec::with_capacity(raw.len());
    let mut positions: Vec<f64> = Vec::with_capacity(raw.len() * n_markers * 3);
    let mut selected_series: Vec<Position> = Vec::with_capacity(raw.len());

    for mut row in raw.into_rows() {
        // 1. Rows where every cell is empty.
        if row.iter().all(Option::is_none) {
            report.empty_rows += 1;
            continue;
        }

        // 2. Rows missing the frame number or a selected-marker value.
        row[layout.frame] = frame_cell(row[layout.frame]);
        let required = std::iter::once(layout.frame).chain(layout.selected);
        if required.into_iter().any(|c| row[c].is_none()) {
            report.incomplete_rows += 1;
            continue;
        }

        // 3. Remaining gaps become zero.
        for cell in row.iter_mut().filter(|c| c.is_none()) {
            *cell = Some(0.0);
            report.zero_filled_cells += 1;
        }

        // 4. Infinity counts as missing, and missing rows are dropped.
        if row.iter().flatten().any(|v| !v.is_finite()) {
            report.non_finite_rows += 1;
            continue;
        }

        let value = |c: usize| row[c].unwrap_or(0.0);
        let frame = value(layout.frame) as i64;

        // 5. Frame numbers never go backwards.
        match frame_numbers.last() {
            Some(&previous) if frame < previous => {
                report.out_of_order_rows += 1;
                continue;
            }
            Some(&previous) if frame == previous => report.duplicate_frames += 1,
            _ => {}
        }

        frame_numbers.push(frame);
        positions.extend(layout.groups.iter().map(|&c| value(c)));
        selected_series.push(layout.selected.map(value));
    }

    log::debug!("Sanitation report: {report:?}");
    if report.out_of_order_rows > 0 {
        log::info!(
            "{} rows dropped because their frame number went backwards",
            report.out_of_order_rows
        );
    }
    if report.duplicate_frames > 0 {
        log::warn!("{} duplicate frame numbers in recording", report.duplicate_frames);
    }
    if report.zero_filled_cells > 0 {
        log::info!(
            "{} missing cells filled with 0; trajectories near gaps may be distorted",
            report.zero_filled_cells
        );
    }

    let table = MarkerTable::from_parts(
        frame_numbers,
        layout.marker_names,
        positions,
        options.marker_name.clone(),
        selected_series,
        layout.selected_group,
    );
    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::raw::read_csv;

    const HEADER: &str = "Frame,<T-M> X,<T-M> Y,<T-M> Z,<T-N> X,<T-N> Y,<T-N> Z";

    fn load(body: &str) -> Result<(MarkerTable, SanitationReport), LoadError> {
        let text = format!("meta\n{HEADER}\n{body}");
        let raw = read_csv(text.as_bytes(), 1)?;
        sanitize_with_report(raw, &LoadOptions::new("<T-M>"))
    }

    #[test]
    fn clean_rows_are_kept_in_order() {
        let (table, report) = load("0,1,2,3,4,5,6\n1,1,2,3,4,5,6\n").unwrap();
        assert_eq!(table.frame_numbers(), &[0, 1]);
        assert_eq!(table.markers(), &["M".to_string(), "N".to_string()]);
        assert_eq!(table.selected_group(), Some(0));
        assert_eq!(table.selected_series()[1], [1.0, 2.0, 3.0]);
        assert_eq!(report.kept_rows(), 2);
    }

    #[test]
    fn empty_rows_are_dropped() {
        let (table, report) = load("0,1,2,3,4,5,6\n,,,,,,\n1,1,2,3,4,5,6\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(report.empty_rows, 1);
    }

    #[test]
    fn rows_missing_frame_or_selected_are_dropped() {
        let (table, report) =
            load("0,1,2,3,4,5,6\n,1,2,3,4,5,6\n2,1,,3,4,5,6\n3,1,2,3,4,5,6\n").unwrap();
        assert_eq!(table.frame_numbers(), &[0, 3]);
        assert_eq!(report.incomplete_rows, 2);
    }

    #[test]
    fn other_gaps_are_zero_filled() {
        let (table, report) = load("0,1,2,3,,5,NaN\n").unwrap();
        assert_eq!(table.position(0, "N"), Some([0.0, 5.0, 0.0]));
        assert_eq!(report.zero_filled_cells, 2);
    }

    #[test]
    fn infinity_anywhere_drops_the_row() {
        let (table, report) = load("0,1,2,3,4,5,6\n1,1,2,3,inf,5,6\n2,1,-inf,3,4,5,6\n").unwrap();
        assert_eq!(table.frame_numbers(), &[0]);
        assert_eq!(report.non_finite_rows, 2);
    }

    #[test]
    fn fractional_frame_number_counts_as_missing() {
        let (table, report) = load("0,1,2,3,4,5,6\n0.5,1,2,3,4,5,6\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(report.incomplete_rows, 1);
    }

    #[test]
    fn missing_frame_column_is_structural() {
        let raw = read_csv("<T-M> X,<T-M> Y,<T-M> Z\n1,2,3\n".as_bytes(), 0).unwrap();
        let err = sanitize(raw, &LoadOptions::new("<T-M>")).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "Frame"));
    }

    #[test]
    fn selected_marker_needs_three_columns() {
        let raw = read_csv("Frame,<T-M> X,<T-M> Y\n0,1,2\n".as_bytes(), 0).unwrap();
        let err = sanitize(raw, &LoadOptions::new("<T-M>")).unwrap_err();
        assert!(matches!(err, LoadError::MarkerColumns { found: 2, .. }));
    }

    #[test]
    fn marker_groups_must_be_triplets() {
        let raw = read_csv(
            "Frame,M X,M Y,M Z,<T-A> X,<T-A> Y,<T-A> Z,<T-B> X\n0,1,2,3,4,5,6,7\n".as_bytes(),
            0,
        )
        .unwrap();
        let err = sanitize(raw, &LoadOptions::new("M ")).unwrap_err();
        assert!(matches!(err, LoadError::MarkerGroupNotTriplet { count: 4, .. }));
    }

    #[test]
    fn rows_going_back_in_time_are_dropped() {
        let (table, report) =
            load("1,1,2,3,4,5,6\n0,1,2,3,4,5,6\n2,1,2,3,4,5,6\n1,1,2,3,4,5,6\n").unwrap();
        assert_eq!(table.frame_numbers(), &[1, 2]);
        assert_eq!(report.out_of_order_rows, 2);
        assert_eq!(report.kept_rows(), 2);
    }

    #[test]
    fn ragged_raw_rows_do_not_break_sanitation() {
        let headers = HEADER.split(',').map(String::from).collect();
        let raw = RawTable::new(
            headers,
            vec![
                vec![Some(0.0), Some(1.0)],
                [1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 9.0].map(Some).to_vec(),
            ],
        );
        let (table, report) = sanitize_with_report(raw, &LoadOptions::new("<T-M>")).unwrap();
        assert_eq!(table.frame_numbers(), &[1]);
        assert_eq!(table.position(0, "N"), Some([4.0, 5.0, 6.0]));
        assert_eq!(report.incomplete_rows, 1);
    }

    #[test]
    fn duplicate_frames_are_kept() {
        let (table, report) = load("1,1,2,3,4,5,6\n1,1,2,3,4,5,6\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(report.duplicate_frames, 1);
    }

    #[test]
    fn marker_outside_groups_is_not_highlighted() {
        let raw = read_csv(
            "Frame,Head X,Head Y,Head Z,<T-A> X,<T-A> Y,<T-A> Z\n0,1,2,3,4,5,6\n".as_bytes(),
            0,
        )
        .unwrap();
        let table = sanitize(raw, &LoadOptions::new("Head")).unwrap();
        assert_eq!(table.selected_group(), None);
        assert_eq!(table.selected_series(), &[[1.0, 2.0, 3.0]]);
    }

    #[test]
    fn marker_label_strips_axis_and_prefix() {
        assert_eq!(marker_label("<T-RKNE> X", "<T-"), "RKNE");
        assert_eq!(marker_label("<T-LASI>_y", "<T-"), "LASI");
        assert_eq!(marker_label("<T-Toe>", "<T-"), "Toe");
        assert_eq!(marker_label("<T-", "<T-"), "<T-");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("capture.xlsx"), &LoadOptions::new("M")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }
}
