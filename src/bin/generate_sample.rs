use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, Int64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Marker name and its rest position (mm) on a walking subject.
const MARKERS: [(&str, [f64; 3]); 6] = [
    ("HEAD", [0.0, 0.0, 1700.0]),
    ("LSHO", [-180.0, 0.0, 1450.0]),
    ("RSHO", [180.0, 0.0, 1450.0]),
    ("LASI", [-120.0, 20.0, 950.0]),
    ("RKNE", [100.0, 30.0, 500.0]),
    ("RTOE", [100.0, 120.0, 40.0]),
];

const FRAMES: i64 = 600;

/// One row per frame: frame number followed by X/Y/Z of every marker.
/// `None` is a missing cell.
fn generate_rows(rng: &mut SimpleRng) -> Vec<Vec<Option<f64>>> {
    let mut rows = Vec::with_capacity(FRAMES as usize);
    for frame in 0..FRAMES {
        let t = frame as f64 / 100.0;
        let forward = 1200.0 * t;
        let mut row = vec![Some(frame as f64)];
        for (i, (_, rest)) in MARKERS.iter().enumerate() {
            let swing = 80.0 * (2.0 * std::f64::consts::PI * t + i as f64).sin();
            row.push(Some(rest[0] + rng.gauss(0.0, 1.5)));
            row.push(Some(rest[1] + forward + swing + rng.gauss(0.0, 1.5)));
            row.push(Some(rest[2] + 0.3 * swing.abs() + rng.gauss(0.0, 1.5)));
        }
        rows.push(row);
    }

    // Data-quality problems the loader and validator must absorb.
    let width = rows[0].len();
    rows[50] = vec![None; width]; // empty row
    rows[120][1 + 3 * 4 + 1] = None; // selected marker (RKNE) Y missing
    rows[200][1 + 3 * 2] = Some(f64::INFINITY); // RSHO X infinite
    rows[310][1 + 3 * 5 + 2] = None; // RTOE Z gap, zero-filled
    rows[420][1 + 3 * 1] = Some(20000.0); // LSHO outside capture volume
    rows
}

fn headers() -> Vec<String> {
    let mut headers = vec!["Frame".to_string()];
    for (name, _) in MARKERS {
        for axis in ["X", "Y", "Z"] {
            headers.push(format!("<T-{name}> {axis}"));
        }
    }
    headers
}

fn write_csv(path: &Path, rows: &[Vec<Option<f64>>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("creating CSV")?;
    // Metadata line skipped by the loader (skip_rows = 1).
    writer.write_record(["Generated sample", "units: mm", "rate: 100 Hz"])?;
    writer.write_record(headers())?;
    for row in rows {
        writer.write_record(row.iter().enumerate().map(|(col, cell)| match cell {
            Some(v) if col == 0 => format!("{}", *v as i64),
            Some(v) if v.is_infinite() => "inf".to_string(),
            Some(v) => format!("{v:.3}"),
            None => String::new(),
        }))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Vec<Option<f64>>]) -> Result<()> {
    let headers = headers();

    let mut frame_builder = Int64Builder::new();
    let mut value_builders: Vec<Float64Builder> =
        (1..headers.len()).map(|_| Float64Builder::new()).collect();
    for row in rows {
        frame_builder.append_option(row[0].map(|f| f as i64));
        for (builder, cell) in value_builders.iter_mut().zip(&row[1..]) {
            builder.append_option(*cell);
        }
    }

    let mut fields = vec![Field::new(&headers[0], DataType::Int64, true)];
    fields.extend(
        headers[1..]
            .iter()
            .map(|h| Field::new(h, DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![Arc::new(frame_builder.finish())];
    columns.extend(
        value_builders
            .iter_mut()
            .map(|b| Arc::new(b.finish()) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let parquet = std::env::args().any(|a| a == "--parquet");
    let output_path = PathBuf::from(if parquet {
        "sample_markers.parquet"
    } else {
        "sample_markers.csv"
    });

    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    if parquet {
        write_parquet(&output_path, &rows)?;
    } else {
        write_csv(&output_path, &rows)?;
    }

    println!(
        "Wrote {} frames of {} markers to {}",
        rows.len(),
        MARKERS.len(),
        output_path.display()
    );
    Ok(())
}
