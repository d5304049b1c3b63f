use super::error::LoadError;
use super::model::{Notice, Peak, Series, SpectrumEntry, WavenumberRange};
use super::peaks::{PeakParams, extract_negative_peaks};
use super::window::window_range;

// ---------------------------------------------------------------------------
// SpectrumSet – every loaded spectrum plus its display settings
// ---------------------------------------------------------------------------

/// Loaded spectra keyed by name, kept in upload order.
#[derive(Debug, Clone, Default)]
pub struct SpectrumSet {
    entries: Vec<SpectrumEntry>,
}

/// One spectrum restricted to the current range.
#[derive(Debug, Clone)]
pub struct WindowedTrace<'a> {
    pub entry: &'a SpectrumEntry,
    pub series: Series,
}

/// Result of iterating a set over a range: the traces with data, and a
/// notice for every entry that had none.
#[derive(Debug, Clone, Default)]
pub struct InRange<'a> {
    pub traces: Vec<WindowedTrace<'a>>,
    pub notices: Vec<Notice>,
}

/// Everything a chart needs to draw one spectrum: the windowed series and
/// its ranked peaks, computed together.
#[derive(Debug, Clone)]
pub struct TraceView {
    pub name: String,
    pub label: String,
    pub color: String,
    pub series: Series,
    pub peaks: Vec<Peak>,
}

impl SpectrumSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from loader results. Entries get colours from `palette`
    /// by position in the batch; failed files become notices.
    pub fn from_uploads<I>(batch: I, palette: &[String]) -> (Self, Vec<Notice>)
    where
        I: IntoIterator<Item = (String, Result<Series, LoadError>)>,
    {
        let mut set = SpectrumSet::new();
        let notices = set.add_uploads(batch, palette);
        (set, notices)
    }

    /// Add loader results to the set; see [`SpectrumSet::from_uploads`].
    pub fn add_uploads<I>(&mut self, batch: I, palette: &[String]) -> Vec<Notice>
    where
        I: IntoIterator<Item = (String, Result<Series, LoadError>)>,
    {
        let mut notices = Vec::new();
        for (name, result) in batch {
            match result {
                Ok(series) => {
                    let entry = match self.get(&name) {
                        // Re-upload: keep what the user set for this name.
                        Some(old) => {
                            let mut entry = SpectrumEntry::new(name, series, old.color.clone());
                            entry.label = old.label.clone();
                            entry
                        }
                        None => {
                            let color = self.next_color(palette);
                            SpectrumEntry::new(name, series, color)
                        }
                    };
                    self.insert(entry);
                }
                Err(e) => {
                    log::warn!("Skipping {name}: {e}");
                    notices.push(Notice::LoadFailed {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }
        notices
    }

    /// Colour for the next new entry, cycling through `palette`.
    fn next_color(&self, palette: &[String]) -> String {
        if palette.is_empty() {
            return String::from("black");
        }
        palette[self.entries.len() % palette.len()].clone()
    }

    /// Insert an entry; an existing entry with the same name is replaced in
    /// place.
    pub fn insert(&mut self, entry: SpectrumEntry) {
        match self.position(&entry.name) {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, name: &str) -> Option<&SpectrumEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn entries(&self) -> &[SpectrumEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut SpectrumEntry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Change the legend label. Returns `false` for an unknown name.
    pub fn set_label(&mut self, name: &str, label: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.label = label.into();
                true
            }
            None => false,
        }
    }

    /// Change the trace colour. Returns `false` for an unknown name.
    pub fn set_color(&mut self, name: &str, color: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.color = color.into();
                true
            }
            None => false,
        }
    }

    /// Window every entry to `range`. Entries with no points in range are
    /// left out and reported as [`Notice::EmptyWindow`].
    ///
    /// Chart rendering and peak export both go through here so they always
    /// agree on what is visible.
    pub fn for_each_in_range(&self, range: WavenumberRange) -> InRange<'_> {
        let mut out = InRange::default();
        for entry in &self.entries {
            let series = window_range(entry.series(), range);
            if series.is_empty() {
                log::warn!("{}: no points in {range}", entry.name);
                out.notices.push(Notice::EmptyWindow {
                    name: entry.name.clone(),
                    range,
                });
                continue;
            }
            out.traces.push(WindowedTrace { entry, series });
        }
        out
    }

    /// Window every entry and extract its negative peaks.
    pub fn annotated(&self, range: WavenumberRange, params: PeakParams) -> (Vec<TraceView>, Vec<Notice>) {
        let InRange { traces, notices } = self.for_each_in_range(range);
        let views = traces
            .into_iter()
            .map(|t| {
                let peaks = extract_negative_peaks(&t.series, params);
                log::debug!("{}: {} negative peaks", t.entry.name, peaks.len());
                TraceView {
                    name: t.entry.name.clone(),
                    label: t.entry.label.clone(),
                    color: t.entry.color.clone(),
                    series: t.series,
                    peaks,
                }
            })
            .collect();
        (views, notices)
    }
}
