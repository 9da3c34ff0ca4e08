use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use rvr_compare::state::AppState;

const HEADERS: [&str; 7] = [
    "Device",
    "Version",
    "Band",
    "Mode",
    "Max (Mbps)",
    "Avg (Mbps)",
    "Range (dB)",
];

/// Per-configuration comparison of the selected tests, best values highlighted.
pub fn comparison_table(ui: &mut Ui, state: &AppState) {
    let groups = state.comparison();
    if groups.is_empty() {
        ui.label("No tests selected.");
        return;
    }
    let floor = state.settings.effective_range_floor_mbps;

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(160.0))
        .columns(Column::auto(), HEADERS.len() - 1)
        .header(20.0, |mut header| {
            for h in HEADERS {
                header.col(|ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|mut body| {
            for group in &groups {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(RichText::new(&group.config).strong());
                    });
                    for _ in 1..HEADERS.len() {
                        row.col(|_| {});
                    }
                });
                for r in &group.rows {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(r.device.as_str());
                        });
                        row.col(|ui| {
                            ui.label(r.software_version.as_str());
                        });
                        row.col(|ui| {
                            ui.label(r.band.as_str());
                        });
                        row.col(|ui| {
                            ui.label(r.mode.as_str());
                        });
                        row.col(|ui| {
                            ui.label(best(format!("{:.0}", r.summary.max_throughput), r.best_max));
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.0}", r.summary.avg_throughput));
                        });
                        row.col(|ui| {
                            ui.label(best(format!("{:.1}", r.summary.effective_range), r.best_range))
                                .on_hover_text(format!("Last attenuation above {floor} Mbps"));
                        });
                    });
                }
            }
        });
}

fn best(text: String, is_best: bool) -> RichText {
    let text = RichText::new(text);
    if is_best {
        text.strong().color(Color32::LIGHT_GREEN)
    } else {
        text
    }
}
