use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

use crate::data::model::{Notice, WavenumberRange};
use crate::data::peaks::PeakParams;
use crate::data::spectrum_set::{SpectrumSet, TraceView};

/// Constant value of the peak-type column; only minima are reported.
pub const PEAK_TYPE: &str = "Negative";
/// Worksheet holding the peak table.
pub const SHEET_NAME: &str = "Negative Peaks";

pub const TABLE_HEADER: [&str; 3] = ["Filename", "Wavenumber (cm⁻¹)", "Transmission (%T)"];

pub const DEFAULT_TABLE_FILE: &str = "IR_negative_peaks.xlsx";
pub const DEFAULT_DELIMITED_FILE: &str = "IR_negative_peaks.txt";

// ---------------------------------------------------------------------------
// Report rows
// ---------------------------------------------------------------------------

/// One peak in the spreadsheet table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakRow {
    #[serde(rename = "Filename")]
    pub label: String,
    #[serde(rename = "Wavenumber (cm⁻¹)")]
    pub wavenumber: i64,
    #[serde(rename = "Transmission (%T)")]
    pub transmission: f64,
}

/// One peak in the delimited-text export, with its peak type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelimitedPeakRow {
    #[serde(rename = "Filename")]
    pub label: String,
    #[serde(rename = "Wavenumber (cm⁻¹)")]
    pub wavenumber: i64,
    #[serde(rename = "Transmission (%T)")]
    pub transmission: f64,
    #[serde(rename = "Peak type")]
    pub peak_type: &'static str,
}

// ---------------------------------------------------------------------------
// PeakReport
// ---------------------------------------------------------------------------

/// Negative peaks of every visible spectrum, flattened into table rows.
///
/// Rows follow the set's upload order, then rank order within a spectrum.
#[derive(Debug, Clone, Default)]
pub struct PeakReport {
    pub rows: Vec<PeakRow>,
    /// Spectra that contributed nothing, and why.
    pub notices: Vec<Notice>,
}

impl PeakReport {
    /// Window and extract every spectrum in `set` and collect its peaks.
    pub fn build(set: &SpectrumSet, range: WavenumberRange, params: PeakParams) -> Self {
        let (views, notices) = set.annotated(range, params);
        let mut report = Self::from_views(&views);
        report.notices = notices;
        report
    }

    /// Rows from already-annotated traces, e.g. the ones just drawn.
    pub fn from_views(views: &[TraceView]) -> Self {
        let rows = views
            .iter()
            .flat_map(|v| {
                v.peaks.iter().map(move |p| PeakRow {
                    label: v.label.clone(),
                    wavenumber: p.wavenumber,
                    transmission: p.transmission,
                })
            })
            .collect();
        Self {
            rows,
            notices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn delimited_rows(&self) -> Vec<DelimitedPeakRow> {
        self.rows
            .iter()
            .map(|r| DelimitedPeakRow {
                label: r.label.clone(),
                wavenumber: r.wavenumber,
                transmission: r.transmission,
                peak_type: PEAK_TYPE,
            })
            .collect()
    }

    /// The peak table as a single-sheet workbook: bold header row, then one
    /// row per peak.
    pub fn workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME).context("naming worksheet")?;

        for (col, title) in (0u16..).zip(TABLE_HEADER) {
            sheet.write_string_with_format(0, col, title, &header)?;
        }
        for (row, peak) in (1u32..).zip(&self.rows) {
            sheet.write_string(row, 0, &peak.label)?;
            sheet.write_number(row, 1, peak.wavenumber as f64)?;
            sheet.write_number(row, 2, peak.transmission)?;
        }
        sheet.set_column_width(0, 28)?;
        sheet.set_column_width(1, 20)?;
        sheet.set_column_width(2, 20)?;
        Ok(workbook)
    }

    /// Save the peak table as an `.xlsx` workbook at `path`.
    pub fn write_workbook(&self, path: &Path) -> Result<()> {
        self.workbook()?
            .save(path)
            .with_context(|| format!("writing {}", path.display()))
    }

    /// The `.xlsx` file contents, for callers that do their own I/O.
    pub fn workbook_bytes(&self) -> Result<Vec<u8>> {
        self.workbook()?
            .save_to_buffer()
            .context("building peak workbook")
    }

    /// Write rows plus the peak-type column, separated by `delimiter`.
    pub fn write_delimited<W: Write>(&self, out: W, delimiter: u8) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(out);
        let rows = self.delimited_rows();
        for row in &rows {
            writer.serialize(row).context("writing peak row")?;
        }
        if rows.is_empty() {
            writer
                .write_record(TABLE_HEADER.iter().copied().chain(["Peak type"]))
                .context("writing header")?;
        }
        writer.flush().context("flushing peak list")?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.rows).context("serialising peak rows")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::data::model::{Series, SpectrumEntry};

    fn set() -> SpectrumSet {
        let mut set = SpectrumSet::new();
        let a: Series = [
            (4000.0, 100.0),
            (3000.0, 80.0),
            (2000.0, 20.0),
            (1000.0, 90.0),
            (500.0, 95.0),
        ]
        .into_iter()
        .collect();
        let b: Series = [(3000.0, 90.0), (2500.5, 45.678), (2000.0, 88.0), (1500.0, 60.0), (1000.0, 70.0)]
            .into_iter()
            .collect();
        set.insert(SpectrumEntry::new("a.csv", a, "blue"));
        set.insert(SpectrumEntry::new("b.csv", b, "green"));
        set.insert(SpectrumEntry::new("far.csv", [(9000.0, 1.0)].into_iter().collect(), "red"));
        set.set_label("b.csv", "Sample B");
        set
    }

    fn build() -> PeakReport {
        PeakReport::build(&set(), WavenumberRange::new(4000.0, 600.0), PeakParams::default())
    }

    #[test]
    fn rows_follow_set_then_rank_order() {
        let report = build();
        let rows: Vec<(&str, i64, f64)> = report
            .rows
            .iter()
            .map(|r| (r.label.as_str(), r.wavenumber, r.transmission))
            .collect();
        assert_eq!(
            rows,
            vec![("a", 2000, 20.0), ("Sample B", 2500, 45.68), ("Sample B", 1500, 60.0)]
        );
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.notices[0].name(), "far.csv");
    }

    /// Unpack one part of an `.xlsx` archive as text.
    fn xlsx_part(bytes: &[u8], part: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut text = String::new();
        archive.by_name(part).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn workbook_has_named_sheet_and_one_row_per_peak() {
        let path = std::env::temp_dir().join(format!("ir-spectra-{}-report.xlsx", std::process::id()));
        build().write_workbook(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(!bytes.is_empty());
        assert!(bytes.starts_with(b"PK"));
        assert!(xlsx_part(&bytes, "xl/workbook.xml").contains(r#"name="Negative Peaks""#));
        // Header plus three peaks.
        assert_eq!(xlsx_part(&bytes, "xl/worksheets/sheet1.xml").matches("<row ").count(), 4);

        let strings = xlsx_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("Filename"));
        assert!(strings.contains("Transmission (%T)"));
        assert!(strings.contains("Sample B"));
    }

    #[test]
    fn delimited_export_adds_peak_type() {
        let mut out = Vec::new();
        build().write_delimited(&mut out, b';').unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Filename;Wavenumber (cm⁻¹);Transmission (%T);Peak type");
        assert_eq!(lines.len(), 4);
        assert!(lines[1..].iter().all(|l| l.ends_with(";Negative")));
    }

    #[test]
    fn empty_report_still_writes_header() {
        let report = PeakReport::default();
        let bytes = report.workbook_bytes().unwrap();
        assert_eq!(xlsx_part(&bytes, "xl/worksheets/sheet1.xml").matches("<row ").count(), 1);

        let mut out = Vec::new();
        report.write_delimited(&mut out, b';').unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap().trim_end(),
            "Filename;Wavenumber (cm⁻¹);Transmission (%T);Peak type"
        );
    }

    #[test]
    fn json_uses_column_names() {
        let json = build().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["Wavenumber (cm⁻¹)"], 2000);
        assert_eq!(value[0]["Filename"], "a");
    }
}
