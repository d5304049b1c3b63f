use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Series – one (wavenumber, transmission) trace
// ---------------------------------------------------------------------------

/// An ordered IR trace stored as parallel arrays.
///
/// Every pushed point is finite; `x` and `y` always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    /// Wavenumber axis (x), cm⁻¹.
    x: Vec<f64>,
    /// Transmission axis (y), %T – same length as `x`.
    y: Vec<f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point. Returns `false` (and stores nothing) if either value
    /// is not finite.
    pub fn push(&mut self, wavenumber: f64, transmission: f64) -> bool {
        if !wavenumber.is_finite() || !transmission.is_finite() {
            return false;
        }
        self.x.push(wavenumber);
        self.y.push(transmission);
        true
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate `(wavenumber, transmission)` pairs in stored order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

impl FromIterator<(f64, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut series = Series::new();
        for (x, y) in iter {
            series.push(x, y);
        }
        series
    }
}

// ---------------------------------------------------------------------------
// WavenumberRange – closed interval, endpoints in any order
// ---------------------------------------------------------------------------

/// A closed wavenumber interval `[lo, hi]`.
///
/// The UI passes "start" and "end" with start usually the larger value
/// (spectra are read high-to-low), so construction normalises the order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavenumberRange {
    lo: f64,
    hi: f64,
}

impl WavenumberRange {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn contains(&self, wavenumber: f64) -> bool {
        self.lo <= wavenumber && wavenumber <= self.hi
    }
}

impl fmt::Display for WavenumberRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{} cm⁻¹", self.hi, self.lo)
    }
}

// ---------------------------------------------------------------------------
// Peak – one ranked absorption minimum
// ---------------------------------------------------------------------------

/// A negative peak as reported to the chart and the exports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    /// Wavenumber truncated toward zero (not rounded).
    pub wavenumber: i64,
    /// Transmission rounded to two decimals.
    pub transmission: f64,
}

impl Peak {
    /// Text shown next to the chart marker.
    pub fn label(&self) -> String {
        self.wavenumber.to_string()
    }
}

// ---------------------------------------------------------------------------
// SpectrumEntry – one uploaded file plus its display settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SpectrumEntry {
    /// Unique key, normally the uploaded file name.
    pub name: String,
    series: Series,
    /// Legend text, user-editable.
    pub label: String,
    /// Colour specification (`"blue"`, `"#1f77b4"`, …), user-editable.
    pub color: String,
}

impl SpectrumEntry {
    pub fn new(name: impl Into<String>, series: Series, color: impl Into<String>) -> Self {
        let name = name.into();
        let label = default_label(&name);
        Self {
            name,
            series,
            label,
            color: color.into(),
        }
    }

    /// The series is fixed once loaded.
    pub fn series(&self) -> &Series {
        &self.series
    }
}

/// Legend label derived from a file name: every `.csv` in it is removed.
pub fn default_label(name: &str) -> String {
    name.replace(".csv", "")
}

// ---------------------------------------------------------------------------
// Notice – non-fatal, user-visible conditions
// ---------------------------------------------------------------------------

/// Something the user should see that did not stop processing.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A file could not be read; other files were still processed.
    LoadFailed { name: String, reason: String },
    /// No points of this spectrum fall inside the selected range.
    EmptyWindow { name: String, range: WavenumberRange },
}

impl Notice {
    pub fn name(&self) -> &str {
        match self {
            Notice::LoadFailed { name, .. } | Notice::EmptyWindow { name, .. } => name,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LoadFailed { name, reason } => {
                write!(f, "Could not load `{name}`: {reason}")
            }
            Notice::EmptyWindow { name, range } => {
                write!(f, "`{name}` has no data in {range}; skipped")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_rejects_non_finite_points() {
        let mut s = Series::new();
        assert!(s.push(4000.0, 99.5));
        assert!(!s.push(f64::NAN, 1.0));
        assert!(!s.push(3000.0, f64::INFINITY));
        assert_eq!(s.len(), 1);
        assert_eq!(s.x(), &[4000.0]);
        assert_eq!(s.y(), &[99.5]);
    }

    #[test]
    fn range_normalises_endpoint_order() {
        let a = WavenumberRange::new(600.0, 4000.0);
        let b = WavenumberRange::new(4000.0, 600.0);
        assert_eq!(a, b);
        assert_eq!(a.lo(), 600.0);
        assert_eq!(a.hi(), 4000.0);
        assert!(a.contains(600.0));
        assert!(a.contains(4000.0));
        assert!(!a.contains(4000.5));
    }

    #[test]
    fn default_label_removes_every_csv_occurrence() {
        assert_eq!(default_label("sample.csv"), "sample");
        assert_eq!(default_label("sample.txt"), "sample.txt");
        assert_eq!(default_label("a.csv.csv"), "a");
        assert_eq!(default_label("run.csv.bak"), "run.bak");
        assert_eq!(default_label("sample.CSV"), "sample.CSV");
    }

    #[test]
    fn notice_names_the_file() {
        let n = Notice::EmptyWindow {
            name: "a.csv".into(),
            range: WavenumberRange::new(4000.0, 600.0),
        };
        assert_eq!(n.name(), "a.csv");
        assert!(n.to_string().contains("a.csv"));
    }
}
