mod app;
mod ui;

use app::RvrCompareApp;
use eframe::egui;
use rvr_compare::config::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Wi-Fi RvR Comparison",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render vendor logos and device images.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(RvrCompareApp::new(settings)))
        }),
    )
}
