use eframe::egui::Ui;
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints};

use rvr_compare::color::{ColorMap, is_dashed};
use rvr_compare::state::AppState;

// ---------------------------------------------------------------------------
// Throughput vs attenuation plot (central panel)
// ---------------------------------------------------------------------------

/// Render the RvR chart for the selected tests.
pub fn rvr_plot(ui: &mut Ui, state: &AppState) {
    let selected = state.selected_tests();
    if selected.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.workbooks().is_empty() {
                ui.heading("Open a workbook (File → Open…) or load reports from the library");
            } else {
                ui.heading("Select tests to compare");
            }
        });
        return;
    }

    let colors = ColorMap::for_selection(&selected);

    Plot::new("rvr_plot")
        .legend(Legend::default())
        .x_axis_label("Attenuation (dB)")
        .y_axis_label("Throughput (Mbps)")
        .label_formatter(|name, value| {
            if name.is_empty() {
                format!("{:.1} dB", value.x)
            } else {
                format!("{name}\n{:.0} Mbps @ {:.1} dB", value.y, value.x)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for sel in &selected {
                let points: PlotPoints = sel
                    .test
                    .data
                    .iter()
                    .map(|p| [p.attenuation, p.throughput])
                    .collect();

                let mut line = Line::new(points)
                    .name(sel.legend_label())
                    .color(colors.color_for(sel))
                    .width(2.0);
                if is_dashed(sel.test) {
                    line = line.style(LineStyle::dashed_loose());
                }

                plot_ui.line(line);
            }
        });
}
