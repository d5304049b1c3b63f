use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::loader::load_path;
use crate::data::model::{Notice, WavenumberRange};
use crate::data::peaks::PeakParams;
use crate::data::spectrum_set::{SpectrumSet, TraceView};
use crate::export::save_png;
use crate::report::PeakReport;
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Startup defaults (palette, export size).
    pub settings: Settings,

    /// Every uploaded spectrum with its label and colour.
    pub spectra: SpectrumSet,

    /// Range inputs as typed; may be in either order.
    pub start_wavenumber: f64,
    pub end_wavenumber: f64,

    pub peak_params: PeakParams,

    /// Whether negative peaks are drawn and exportable.
    pub show_peaks: bool,

    /// Files that failed to load in the last upload.
    pub load_notices: Vec<Notice>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

/// What the chart shows for the current range.
pub struct ChartView {
    pub traces: Vec<TraceView>,
    /// Spectra skipped because the range excludes all their points.
    pub notices: Vec<Notice>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            start_wavenumber: settings.start_wavenumber,
            end_wavenumber: settings.end_wavenumber,
            peak_params: settings.peaks,
            show_peaks: settings.show_peaks,
            settings,
            spectra: SpectrumSet::new(),
            load_notices: Vec::new(),
            status_message: None,
        }
    }

    pub fn range(&self) -> WavenumberRange {
        WavenumberRange::new(self.start_wavenumber, self.end_wavenumber)
    }

    /// Load each file independently; failures become notices and never
    /// stop the remaining files.
    pub fn load_paths(&mut self, paths: &[PathBuf]) {
        let batch: Vec<_> = paths.iter().map(|p| load_path(p)).collect();
        self.load_notices = self.spectra.add_uploads(batch, &self.settings.palette);
        log::info!(
            "{} spectra loaded, {} failed",
            self.spectra.len(),
            self.load_notices.len()
        );
        self.status_message = None;
    }

    /// Recompute windows and peaks for the current range.
    pub fn chart_view(&self) -> ChartView {
        let params = if self.show_peaks {
            self.peak_params
        } else {
            PeakParams {
                top_n: 0,
                ..self.peak_params
            }
        };
        let (traces, notices) = self.spectra.annotated(self.range(), params);
        ChartView { traces, notices }
    }

    pub fn peak_report(&self) -> PeakReport {
        PeakReport::build(&self.spectra, self.range(), self.peak_params)
    }

    /// Spreadsheet table of peaks (`.xlsx`).
    pub fn export_table(&self, path: &Path) -> Result<()> {
        let report = self.peak_report();
        report.write_workbook(path)?;
        log::info!("Exported {} peaks to {}", report.rows.len(), path.display());
        Ok(())
    }

    /// Semicolon-delimited peak list including the peak-type column.
    pub fn export_delimited(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let report = self.peak_report();
        report.write_delimited(BufWriter::new(file), b';')?;
        log::info!("Exported {} peaks to {}", report.rows.len(), path.display());
        Ok(())
    }

    pub fn export_chart(&self, path: &Path) -> Result<()> {
        let view = self.chart_view();
        save_png(
            path,
            &view.traces,
            self.range(),
            self.show_peaks,
            self.settings.export_width,
            self.settings.export_height,
        )
    }

    /// Keep the current range and peak options as the startup defaults.
    pub fn save_settings(&mut self, path: &Path) -> Result<()> {
        self.settings.start_wavenumber = self.start_wavenumber;
        self.settings.end_wavenumber = self.end_wavenumber;
        self.settings.show_peaks = self.show_peaks;
        self.settings.peaks = self.peak_params;
        self.settings.save(path)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Record the outcome of a fallible UI action.
    pub fn report_result(&mut self, what: &str, result: Result<()>) {
        match result {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::error!("{what} failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn clear(&mut self) {
        self.spectra.clear();
        self.load_notices.clear();
        self.status_message = None;
    }
}
