//! CSV ingest of measured polarization spectra.
//!
//! Two layouts are accepted (header names are case-insensitive, any column order):
//!
//! - fractional: `freq_hz, q, u, dq, du` where q = Q/I and u = U/I
//! - Stokes: `freq_hz, i, q, u, di, dq, du`, converted to fractional values with
//!   `q = Q/I` and `dq = sqrt((dQ/I)² + (Q·dI/I²)²)` (likewise for u)
//!
//! Rows that cannot be used (unparseable, non-finite, non-positive frequency,
//! error or Stokes I) are skipped and reported, never silently fixed up.
//! Blank lines and `#` comment lines are ignored.

use std::collections::HashMap;
use std::path::Path;

use csv::StringRecord;
use log::{debug, warn};

use crate::domain::QuData;
use crate::error::AppError;
use crate::math::lambda_sq_from_freq;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the usable spectrum plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub data: QuData,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Whether the file carried Stokes I (and was normalised by it).
    pub from_stokes: bool,
}

struct Columns {
    freq: usize,
    q: usize,
    u: usize,
    dq: usize,
    du: usize,
    stokes_i: Option<(usize, usize)>,
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, AppError> {
    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect();
    let col = |name: &str| {
        index.get(name).copied().ok_or_else(|| {
            AppError::new(2, format!("Missing required column '{name}' in QU data file."))
        })
    };

    let stokes_i = match (index.get("i"), index.get("di")) {
        (Some(&i), Some(&di)) => Some((i, di)),
        (None, None) => None,
        _ => {
            return Err(AppError::new(
                2,
                "Columns 'i' and 'di' must be given together.",
            ));
        }
    };

    Ok(Columns {
        freq: col("freq_hz")?,
        q: col("q")?,
        u: col("u")?,
        dq: col("dq")?,
        du: col("du")?,
        stokes_i,
    })
}

fn parse_field(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record.get(idx).unwrap_or("").trim();
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("could not parse {name} '{raw}'"))?;
    if !v.is_finite() {
        return Err(format!("{name} is not finite"));
    }
    Ok(v)
}

/// One usable channel in fractional form.
struct Channel {
    freq: f64,
    q: f64,
    u: f64,
    dq: f64,
    du: f64,
}

fn parse_row(record: &StringRecord, cols: &Columns) -> Result<Channel, String> {
    let freq = parse_field(record, cols.freq, "freq_hz")?;
    let q = parse_field(record, cols.q, "q")?;
    let u = parse_field(record, cols.u, "u")?;
    let dq = parse_field(record, cols.dq, "dq")?;
    let du = parse_field(record, cols.du, "du")?;

    if freq <= 0.0 {
        return Err(format!("freq_hz must be > 0 (got {freq})"));
    }
    if dq <= 0.0 || du <= 0.0 {
        return Err("dq and du must be > 0".to_string());
    }

    let Some((i_idx, di_idx)) = cols.stokes_i else {
        return Ok(Channel { freq, q, u, dq, du });
    };

    let i = parse_field(record, i_idx, "i")?;
    let di = parse_field(record, di_idx, "di")?;
    if i <= 0.0 {
        return Err(format!("Stokes I must be > 0 (got {i})"));
    }
    let frac_err = |x: f64, dx: f64| ((dx / i).powi(2) + (x * di / (i * i)).powi(2)).sqrt();
    Ok(Channel {
        freq,
        q: q / i,
        u: u / i,
        dq: frac_err(q, dq),
        du: frac_err(u, du),
    })
}

/// Physical line numbers and text of the lines that are neither blank nor `#` comments.
fn content_lines(text: &str) -> Vec<(usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| {
            let t = l.trim();
            !t.is_empty() && !t.starts_with('#')
        })
        .collect()
}

/// Load a QU spectrum from a CSV file.
///
/// Blank lines and lines starting with `#` are ignored; reported row errors
/// carry the physical line number in the file.
pub fn read_qu_csv(path: &Path) -> Result<IngestedData, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::new(2, format!("Failed to open QU data '{}': {e}", path.display()))
    })?;
    let lines = content_lines(&text);
    let body = lines.iter().map(|(_, l)| *l).collect::<Vec<_>>().join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV header: {e}")))?
        .clone();
    let cols = resolve_columns(&headers)?;

    let mut channels = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0;

    for (idx, result) in reader.records().enumerate() {
        rows_read += 1;
        // Record idx sits on content line idx + 1 (line 0 is the header).
        let line = lines.get(idx + 1).map_or(idx + 2, |(n, _)| *n);
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        match parse_row(&record, &cols) {
            Ok(ch) => channels.push(ch),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for e in &row_errors {
        warn!("Skipping line {}: {}", e.line, e.message);
    }
    if channels.is_empty() {
        return Err(AppError::new(
            3,
            format!("No usable channels in '{}'.", path.display()),
        ));
    }
    debug!(
        "Read {} of {rows_read} rows from {}",
        channels.len(),
        path.display()
    );

    let freq_hz: Vec<f64> = channels.iter().map(|c| c.freq).collect();
    let data = QuData {
        lam_sq: lambda_sq_from_freq(&freq_hz),
        freq_hz,
        q: channels.iter().map(|c| c.q).collect(),
        u: channels.iter().map(|c| c.u).collect(),
        dq: channels.iter().map(|c| c.dq).collect(),
        du: channels.iter().map(|c| c.du).collect(),
    };

    Ok(IngestedData {
        data,
        row_errors,
        rows_read,
        from_stokes: cols.stokes_i.is_some(),
    })
}
