use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::error::LoadError;
use super::model::Series;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one IR trace from any reader.
///
/// Layout:  one header line (ignored), then `wavenumber;transmission` rows.
/// A row is dropped when it does not have exactly two fields or when either
/// field is not a finite number. Surviving rows keep their file order.
pub fn load_reader<R: Read>(name: &str, reader: R) -> Result<Series, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut series = Series::new();
    let mut dropped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::from_csv(name, e))?;

        match parse_row(&record) {
            Some((x, y)) => {
                series.push(x, y);
            }
            None => {
                log::debug!("{name}: dropping row {}: {:?}", row_no + 2, record);
                dropped += 1;
            }
        }
    }

    log::info!("{name}: kept {} rows, dropped {dropped}", series.len());
    Ok(series)
}

/// Load one IR trace from an in-memory upload.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Series, LoadError> {
    load_reader(name, bytes)
}

/// Load one IR trace from disk; the file name becomes the series name.
pub fn load_path(path: &Path) -> (String, Result<Series, LoadError>) {
    let name = file_name(path);
    let result = File::open(path)
        .map_err(|source| LoadError::Io {
            name: name.clone(),
            source,
        })
        .and_then(|file| load_reader(&name, file));
    (name, result)
}

/// Load several uploads. One result per input, in input order; a failing
/// input never stops the ones after it.
pub fn load_batch<I, R>(inputs: I) -> Vec<(String, Result<Series, LoadError>)>
where
    I: IntoIterator<Item = (String, R)>,
    R: Read,
{
    inputs
        .into_iter()
        .map(|(name, reader)| {
            let result = load_reader(&name, reader);
            if let Err(e) = &result {
                log::warn!("Failed to load {name}: {e}");
            }
            (name, result)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_row(record: &csv::StringRecord) -> Option<(f64, f64)> {
    if record.len() != 2 {
        return None;
    }
    let x = parse_number(record.get(0)?)?;
    let y = parse_number(record.get(1)?)?;
    Some((x, y))
}

/// Locale-agnostic coercion: `.` decimal separator, finite values only.
fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
