use eframe::egui::{Align2, RichText, Ui};
use egui_plot::{Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::color_or_fallback;
use crate::state::ChartView;

// ---------------------------------------------------------------------------
// Spectrum plot (central panel)
// ---------------------------------------------------------------------------

/// Render the overlaid spectra in the central panel.
///
/// IR spectra read high-to-low, so points are plotted at `-wavenumber` and
/// the axis labels are negated back.
pub fn spectrum_plot(ui: &mut Ui, view: &ChartView, has_spectra: bool) {
    if !has_spectra {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open one or more CSV files to view spectra  (File → Open…)");
        });
        return;
    }

    Plot::new("ir_spectrum_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Wavenumber (cm⁻¹)")
        .y_axis_label("Transmission (%T)")
        .x_axis_formatter(|mark, _range| format!("{}", -mark.value))
        .label_formatter(|name, value| {
            let prefix = if name.is_empty() {
                String::new()
            } else {
                format!("{name}\n")
            };
            format!("{prefix}{:.1} cm⁻¹\n{:.2} %T", -value.x, value.y)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for trace in &view.traces {
                let color = color_or_fallback(&trace.color);

                let points: PlotPoints = trace
                    .series
                    .points()
                    .map(|(x, y)| [-x, y])
                    .collect();

                plot_ui.line(Line::new(points).name(&trace.label).color(color).width(1.5));

                if trace.peaks.is_empty() {
                    continue;
                }

                let markers: PlotPoints = trace
                    .peaks
                    .iter()
                    .map(|p| [-(p.wavenumber as f64), p.transmission])
                    .collect();
                plot_ui.points(Points::new(markers).radius(3.0).color(color));

                for peak in &trace.peaks {
                    let at = PlotPoint::new(-(peak.wavenumber as f64), peak.transmission);
                    let text = RichText::new(peak.label()).size(10.0).color(color);
                    plot_ui.text(Text::new(at, text).anchor(Align2::CENTER_TOP));
                }
            }
        });
}
