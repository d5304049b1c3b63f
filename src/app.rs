use eframe::egui;

use crate::settings::Settings;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct IrSpectraApp {
    pub state: AppState,
}

impl IrSpectraApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for IrSpectraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Windows and peaks are recomputed every frame from the current inputs.
        let view = self.state.chart_view();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, view.traces.len());
        });

        // ---- Left side panel: range, peaks, legend ----
        egui::SidePanel::left("settings_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &view.notices);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::spectrum_plot(ui, &view, !self.state.spectra.is_empty());
        });
    }
}
