use thiserror::Error;

// ---------------------------------------------------------------------------
// Structural load failures – fatal, no partial table is returned
// ---------------------------------------------------------------------------

/// Errors that abort loading a recording.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No column header matches the configured frame column.
    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// The selected marker does not resolve to exactly three coordinate columns.
    #[error("marker '{marker}' must have exactly 3 columns (X, Y, Z), found {found}")]
    MarkerColumns { marker: String, found: usize },

    /// The all-marker column set cannot be split into X/Y/Z triplets.
    #[error("{count} marker columns with prefix '{prefix}' is not a multiple of 3")]
    MarkerGroupNotTriplet { prefix: String, count: usize },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// The input has no header row after the skipped metadata rows.
    #[error("no header row after skipping {0} metadata rows")]
    NoHeader(usize),
}

// ---------------------------------------------------------------------------
// Per-update skip reasons – benign, the view keeps its last good state
// ---------------------------------------------------------------------------

/// Why an interactive update was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("no recording loaded")]
    NoRecording,

    #[error("query {query} outside frame range [{min}, {max}]")]
    QueryOutOfBounds { query: f64, min: f64, max: f64 },

    #[error("frame index {index} out of range ({len} frames)")]
    FrameIndexOutOfRange { index: usize, len: usize },

    /// The frame's marker array cannot be split into one triplet per marker.
    #[error("frame {index}: {values} values do not form {markers} X/Y/Z triplets")]
    MalformedFrame {
        index: usize,
        values: usize,
        markers: usize,
    },

    #[error("no valid markers found for frame {index}")]
    NoValidMarkers { index: usize },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
