use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use crate::color::{color_or_fallback, to_hex};
use crate::data::model::Notice;
use crate::export::DEFAULT_PNG_FILE;
use crate::report::{DEFAULT_DELIMITED_FILE, DEFAULT_TABLE_FILE};
use crate::settings::Settings;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – range, peaks, legend settings
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, skipped: &[Notice]) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Graph display");
            ui.separator();

            let step = state.settings.range_step;
            egui::Grid::new("range_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Start wavenumber (cm⁻¹)");
                ui.add(DragValue::new(&mut state.start_wavenumber).speed(step));
                ui.end_row();
                ui.label("End wavenumber (cm⁻¹)");
                ui.add(DragValue::new(&mut state.end_wavenumber).speed(step));
                ui.end_row();
            });

            ui.add_space(6.0);
            ui.checkbox(&mut state.show_peaks, "Show negative peaks (minima)");
            ui.add_enabled_ui(state.show_peaks, |ui: &mut Ui| {
                egui::Grid::new("peak_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                    ui.label("Min. prominence (%T)");
                    ui.add(
                        DragValue::new(&mut state.peak_params.prominence)
                            .speed(0.05)
                            .range(0.0..=100.0),
                    );
                    ui.end_row();
                    ui.label("Peaks per spectrum");
                    ui.add(DragValue::new(&mut state.peak_params.top_n).range(0..=100));
                    ui.end_row();
                });
            });

            ui.separator();
            ui.heading("Legend settings");

            if state.spectra.is_empty() {
                ui.label("No spectra loaded.");
            }

            for entry in state.spectra.entries_mut() {
                ui.label(RichText::new(&entry.name).monospace());
                ui.horizontal(|ui: &mut Ui| {
                    let mut color = color_or_fallback(&entry.color);
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        entry.color = to_hex(color);
                    }
                    ui.text_edit_singleline(&mut entry.label);
                });
                ui.add_space(4.0);
            }

            let notices: Vec<&Notice> = state.load_notices.iter().chain(skipped).collect();
            if !notices.is_empty() {
                ui.separator();
                ui.strong("Notices");
                for notice in notices {
                    ui.label(RichText::new(notice.to_string()).color(Color32::from_rgb(200, 140, 0)));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, visible: usize) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let has_data = !state.spectra.is_empty();
            if ui
                .add_enabled(has_data && state.show_peaks, egui::Button::new("Export peaks (table)…"))
                .clicked()
            {
                if let Some(path) = save_dialog("Export peak table", DEFAULT_TABLE_FILE, "xlsx") {
                    let result = state.export_table(&path);
                    state.report_result("Peak table export", result);
                }
                ui.close_menu();
            }
            if ui
                .add_enabled(has_data && state.show_peaks, egui::Button::new("Export peaks (delimited)…"))
                .clicked()
            {
                if let Some(path) = save_dialog("Export peak list", DEFAULT_DELIMITED_FILE, "txt") {
                    let result = state.export_delimited(&path);
                    state.report_result("Peak list export", result);
                }
                ui.close_menu();
            }
            if ui
                .add_enabled(has_data, egui::Button::new("Export chart (PNG)…"))
                .clicked()
            {
                if let Some(path) = save_dialog("Export chart", DEFAULT_PNG_FILE, "png") {
                    let result = state.export_chart(&path);
                    state.report_result("Chart export", result);
                }
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Save settings").clicked() {
                let result = state.save_settings(&Settings::path());
                state.report_result("Saving settings", result);
                ui.close_menu();
            }
            if ui.button("Clear").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.spectra.is_empty() {
            ui.label(format!(
                "{} spectra loaded, {} visible in {}",
                state.spectra.len(),
                visible,
                state.range()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open IR spectra")
        .add_filter("CSV", &["csv"])
        .pick_files();

    if let Some(paths) = files {
        state.load_paths(&paths);
        for notice in &state.load_notices {
            log::warn!("{notice}");
        }
    }
}

fn save_dialog(title: &str, file_name: &str, ext: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(file_name)
        .add_filter(ext, &[ext])
        .save_file()
}
