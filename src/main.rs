use eframe::egui;
use ir_spectra::app::IrSpectraApp;
use ir_spectra::settings::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "IR Spectrum Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(IrSpectraApp::new(settings)))),
    )
}
