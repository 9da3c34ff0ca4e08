use eframe::egui;

use rvr_compare::config::Settings;
use rvr_compare::state::AppState;

use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RvrCompareApp {
    pub state: AppState,
}

impl RvrCompareApp {
    pub fn new(settings: Settings) -> Self {
        let mut state = AppState::new(settings);
        state.refresh_catalog();
        Self { state }
    }
}

impl eframe::App for RvrCompareApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Dropped files ----
        let dropped: Vec<_> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.state.load_local_files(&dropped);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: library and test list ----
        egui::SidePanel::left("side_panel")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: comparison table ----
        egui::TopBottomPanel::bottom("comparison")
            .resizable(true)
            .default_height(200.0)
            .show(ctx, |ui| {
                egui::ScrollArea::both().show(ui, |ui| {
                    table::comparison_table(ui, &self.state);
                });
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::rvr_plot(ui, &self.state);
        });
    }
}
