use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// RawTable – the recording before sanitation
// ---------------------------------------------------------------------------

/// A single parsed cell. `None` is a missing value (empty, NaN or not a number).
pub type Cell = Option<f64>;

/// Untouched tabular recording: header names plus numeric cells.
///
/// Every row has exactly `headers.len()` cells; short rows are padded with
/// missing cells and extra trailing fields are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        RawTable { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Indices of every header containing `needle`, in header order.
    pub fn columns_containing(&self, needle: &str) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(needle))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse one text cell.
///
/// Empty text, `NaN` and anything non-numeric are missing; the usual
/// spellings of infinity parse to `±inf` so the pipeline can drop them.
pub fn parse_cell(text: &str) -> Cell {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_nan() => None,
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Read a CSV recording, skipping `skip_rows` metadata lines before the header.
///
/// Metadata lines are counted as raw lines, not CSV records, so blank lines or
/// stray quotes in the metadata block do not shift the header.
pub fn read_csv<R: Read>(reader: R, skip_rows: usize) -> Result<RawTable, LoadError> {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    for _ in 0..skip_rows {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(csv::Error::from)? == 0 {
            return Err(LoadError::NoHeader(skip_rows));
        }
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = rdr.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|h| h.trim().to_string()).collect(),
        None => return Err(LoadError::NoHeader(skip_rows)),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    Ok(RawTable::new(headers, rows))
}

pub fn read_csv_file(path: &Path, skip_rows: usize) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(file, skip_rows)
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Read a Parquet recording with one flat column per header.
///
/// Numeric columns (Float64/Float32/Int64/Int32) map directly, nulls become
/// missing cells. Text columns go through [`parse_cell`]. Any other column
/// type is read as all-missing.
pub fn read_parquet_file(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns: Vec<Vec<Cell>> = batch.columns().iter().map(column_cells).collect();

        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| col[row]).collect());
        }
    }

    Ok(RawTable::new(headers, rows))
}

fn column_cells(col: &Arc<dyn Array>) -> Vec<Cell> {
    let n = col.len();
    match col.data_type() {
        DataType::Float64 => match col.as_any().downcast_ref::<Float64Array>() {
            Some(arr) => arr.iter().map(|v| v.filter(|x| !x.is_nan())).collect(),
            None => vec![None; n],
        },
        DataType::Float32 => match col.as_any().downcast_ref::<Float32Array>() {
            Some(arr) => arr
                .iter()
                .map(|v| v.map(f64::from).filter(|x| !x.is_nan()))
                .collect(),
            None => vec![None; n],
        },
        DataType::Int64 => match col.as_any().downcast_ref::<Int64Array>() {
            Some(arr) => arr.iter().map(|v| v.map(|i| i as f64)).collect(),
            None => vec![None; n],
        },
        DataType::Int32 => match col.as_any().downcast_ref::<Int32Array>() {
            Some(arr) => arr.iter().map(|v| v.map(f64::from)).collect(),
            None => vec![None; n],
        },
        DataType::Utf8 => match col.as_any().downcast_ref::<StringArray>() {
            Some(arr) => arr.iter().map(|v| v.and_then(parse_cell)).collect(),
            None => vec![None; n],
        },
        DataType::LargeUtf8 => col
            .as_string::<i64>()
            .iter()
            .map(|v| v.and_then(parse_cell))
            .collect(),
        other => {
            log::debug!("Ignoring parquet column of type {other:?}");
            vec![None; n]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cell_treats_nan_and_text_as_missing() {
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("   "), None);
        assert_eq!(parse_cell("NaN"), None);
        assert_eq!(parse_cell("nan"), None);
        assert_eq!(parse_cell("abc"), None);
        assert_eq!(parse_cell(" 1.5 "), Some(1.5));
        assert_eq!(parse_cell("-3"), Some(-3.0));
    }

    #[test]
    fn parse_cell_keeps_infinity() {
        assert_eq!(parse_cell("inf"), Some(f64::INFINITY));
        assert_eq!(parse_cell("-inf"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_cell("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_cell("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn read_csv_skips_metadata_and_pads_short_rows() {
        let text = "Recorded by rig 7\nFrame,a,b\n0,1,2\n1,3\n";
        let raw = read_csv(text.as_bytes(), 1).unwrap();
        assert_eq!(raw.headers(), ["Frame", "a", "b"]);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.rows()[1], vec![Some(1.0), Some(3.0), None]);
    }

    #[test]
    fn metadata_lines_are_counted_verbatim() {
        let text = "Session 4\n\nnote: \"unterminated\nFrame,a\n\n0,1\n";
        let raw = read_csv(text.as_bytes(), 3).unwrap();
        assert_eq!(raw.headers(), ["Frame", "a"]);
        assert_eq!(raw.rows(), [vec![Some(0.0), Some(1.0)]]);
    }

    #[test]
    fn ragged_rows_are_squared_to_the_header() {
        let raw = RawTable::new(
            vec!["Frame".into(), "a".into()],
            vec![vec![Some(0.0)], vec![Some(1.0), Some(2.0), Some(3.0)]],
        );
        assert!(raw.rows().iter().all(|row| row.len() == 2));
        assert_eq!(raw.rows()[0], vec![Some(0.0), None]);
    }

    #[test]
    fn read_csv_without_header_fails() {
        let err = read_csv("only metadata\n".as_bytes(), 1).unwrap_err();
        assert!(matches!(err, LoadError::NoHeader(1)));
    }

    #[test]
    fn columns_containing_preserves_header_order() {
        let raw = RawTable::new(
            vec!["Frame".into(), "M X".into(), "N X".into(), "M Y".into()],
            vec![],
        );
        assert_eq!(raw.columns_containing("M"), vec![1, 3]);
        assert_eq!(raw.column_index("Frame"), Some(0));
        assert_eq!(raw.column_index("Time"), None);
    }
}
