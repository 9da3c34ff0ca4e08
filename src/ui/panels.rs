use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rvr_compare::catalog::{ReportId, VersionEntry};
use rvr_compare::data::filter::{self, Facet};
use rvr_compare::data::loader::SUPPORTED_EXTENSIONS;
use rvr_compare::data::model::{SelectedTest, SelectionKey};
use rvr_compare::export;
use rvr_compare::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – report library, loaded files, test list
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            report_library(ui, state);
            ui.separator();
            loaded_files(ui, state);
            ui.separator();
            test_list(ui, state);
        });
}

fn report_library(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Report Library");

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search");
        ui.text_edit_singleline(&mut state.search);
    });

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("Refresh").clicked() {
            state.refresh_catalog();
        }
        if ui.small_button("Latest Versions").clicked() {
            state.select_latest_versions();
        }
        let n = state.selected_reports.len();
        let enabled = n > 0 && !state.is_batch_loading();
        if ui
            .add_enabled(enabled, egui::Button::new(format!("Load Selected ({n})")).small())
            .clicked()
        {
            if let Err(e) = state.load_selected_reports() {
                log::error!("Failed to load reports: {e}");
            }
        }
    });

    if state.catalog.is_empty() {
        ui.label(format!(
            "No reports under {}",
            state.report_root().root().display()
        ));
        return;
    }

    let matches: Option<BTreeSet<ReportId>> = {
        let term = state.search.trim();
        (!term.is_empty()).then(|| {
            state
                .catalog
                .search(term)
                .into_iter()
                .map(|h| ReportId::new(h.vendor, h.model, h.version))
                .collect()
        })
    };

    let root = state.report_root().root().to_path_buf();
    let mut toggled: Vec<ReportId> = Vec::new();
    let view: &AppState = state;

    for (vendor, vendor_entry) in &view.catalog.vendors {
        let visible = |model: &str, version: &str| {
            matches
                .as_ref()
                .map_or(true, |m| m.contains(&ReportId::new(vendor, model, version)))
        };
        let any_visible = vendor_entry
            .models
            .iter()
            .any(|(model, m)| m.versions.keys().any(|v| visible(model, v)));
        if !any_visible {
            continue;
        }

        egui::CollapsingHeader::new(RichText::new(vendor).strong())
            .id_salt(("vendor", vendor))
            .default_open(matches.is_some())
            .show(ui, |ui: &mut Ui| {
                if let Some(logo) = &vendor_entry.logo {
                    thumbnail(ui, &root, logo);
                }
                for (model, model_entry) in &vendor_entry.models {
                    egui::CollapsingHeader::new(model.as_str())
                        .id_salt(("model", vendor, model))
                        .default_open(matches.is_some())
                        .show(ui, |ui: &mut Ui| {
                            if let Some(image) = &model_entry.image {
                                thumbnail(ui, &root, image);
                            }
                            for (version, entry) in &model_entry.versions {
                                if !visible(model, version) {
                                    continue;
                                }
                                let id = ReportId::new(vendor, model, version);
                                let mut checked = view.selected_reports.contains(&id);
                                let label = format!("v{version} ({} tests)", entry.test_configs.len());
                                if ui.checkbox(&mut checked, label).changed() {
                                    toggled.push(id.clone());
                                }
                                report_links(ui, view, &id, entry);
                            }
                        });
                }
            });
    }

    for id in toggled {
        state.toggle_report(id);
    }
}

fn thumbnail(ui: &mut Ui, root: &Path, relative: &str) {
    let uri = format!("file://{}", root.join(relative).display());
    ui.add(egui::Image::new(uri).max_height(48.0).max_width(120.0));
}

/// Test configurations of one version, with their PDF renditions.
fn report_links(ui: &mut Ui, state: &AppState, id: &ReportId, entry: &VersionEntry) {
    egui::CollapsingHeader::new(RichText::new("reports").small())
        .id_salt(("reports", id.to_string()))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for (config, file) in &entry.test_configs {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(config.as_str());
                    match state.report_root().find_pdf(&file.path) {
                        Ok(pdf) => {
                            ui.hyperlink_to("PDF", format!("file://{}", pdf.display()));
                        }
                        Err(e) => {
                            ui.label(RichText::new("no PDF").weak())
                                .on_hover_text(e.to_string());
                        }
                    }
                });
            }
        });
}

fn loaded_files(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Loaded Devices");

    let groups = state.model_groups();
    if groups.is_empty() {
        ui.label("No workbooks loaded.");
        return;
    }

    let mut clear_model: Option<(String, String)> = None;
    for group in &groups {
        ui.horizontal(|ui: &mut Ui| {
            if ui.small_button("✕").on_hover_text("Remove these files").clicked() {
                clear_model = Some((group.name.clone(), group.model.clone()));
            }
            ui.label(format!(
                "{} / {}  ({} server, {} local)",
                group.name, group.model, group.server_files, group.local_files
            ))
            .on_hover_text(group.files.join("\n"));
        });
    }
    if let Some((name, model)) = clear_model {
        state.clear_device_model(&name, &model);
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("Clear Server").clicked() {
            state.clear_origin(true);
        }
        if ui.small_button("Clear Local").clicked() {
            state.clear_origin(false);
        }
        if ui.small_button("Clear All").clicked() {
            state.clear_all();
        }
    });
}

fn test_list(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Tests");
    if state.workbooks().is_empty() {
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all_tests();
        }
        if ui.small_button("None").clicked() {
            state.select_no_tests();
        }
        if ui
            .small_button("Matching")
            .on_hover_text("Configurations present on more than one device")
            .clicked()
        {
            state.select_matching_tests();
        }
    });

    facet_filters(ui, state);

    let mut toggled: Vec<SelectionKey> = Vec::new();
    let mut device_toggle: Option<(String, bool)> = None;
    let view: &AppState = state;

    for group in view.device_groups() {
        let tests: Vec<_> = group
            .tests
            .iter()
            .filter(|s| filter::passes(&view.filters, s.workbook, s.test))
            .collect();
        if tests.is_empty() {
            continue;
        }

        let n_selected = tests
            .iter()
            .filter(|s| view.is_selected(s.workbook, s.test))
            .count();
        let versions: Vec<&str> = group.software_versions.iter().map(String::as_str).collect();
        let header = if versions.is_empty() {
            format!("{}  ({n_selected}/{})", group.name, tests.len())
        } else {
            format!("{} v{}  ({n_selected}/{})", group.name, versions.join(", v"), tests.len())
        };

        egui::CollapsingHeader::new(RichText::new(header).strong())
            .id_salt(("device", &group.name))
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                let mut all = n_selected == tests.len();
                if ui.checkbox(&mut all, "all").changed() {
                    device_toggle = Some((group.name.clone(), all));
                }
                for sel in &tests {
                    let mut checked = view.is_selected(sel.workbook, sel.test);
                    let text = format!("{} {}", sel.test.test_name(), sel.test.direction_label());
                    let resp = ui.checkbox(&mut checked, text);
                    let resp = resp.on_hover_text(test_tooltip(sel));
                    if resp.changed() {
                        toggled.push(sel.key());
                    }
                }
            });
    }

    if let Some((name, on)) = device_toggle {
        state.select_device(&name, on);
    }
    for key in toggled {
        state.toggle_test(key);
    }
}

fn test_tooltip(sel: &SelectedTest<'_>) -> String {
    let mut lines = vec![
        format!("File: {}", sel.workbook.identity),
        format!("Sheet: {}", sel.test.sheet_name),
        format!("Key: {}", sel.test.name),
        format!("Points: {}", sel.test.data.len()),
    ];
    if let Some(sec) = &sel.test.security {
        lines.push(format!("Security: {sec}"));
    }
    if sel.workbook.skipped > 0 {
        lines.push(format!("Skipped points in file: {}", sel.workbook.skipped));
    }
    lines.join("\n")
}

/// Per-facet value checkboxes.
fn facet_filters(ui: &mut Ui, state: &mut AppState) {
    let unique = filter::unique_values(state.workbooks());

    for facet in Facet::ALL {
        let Some(all_values) = unique.get(&facet) else {
            continue;
        };
        let selected = state.filters.entry(facet).or_default();
        let header_text = format!("{}  ({}/{})", facet.label(), selected.len(), all_values.len());

        egui::CollapsingHeader::new(RichText::new(header_text).strong())
            .id_salt(("facet", facet.label()))
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.filters.insert(facet, all_values.clone());
                    }
                    if ui.small_button("None").clicked() {
                        state.filters.insert(facet, BTreeSet::new());
                    }
                });

                let selected = state.filters.entry(facet).or_default();
                for val in all_values {
                    let mut checked = selected.contains(val);
                    if ui.checkbox(&mut checked, val.as_str()).changed() {
                        if checked {
                            selected.insert(val.clone());
                        } else {
                            selected.remove(val);
                        }
                    }
                }
            });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
            let can_export = !state.selected_tests.is_empty();
            if ui.add_enabled(can_export, egui::Button::new("Export CSV…")).clicked() {
                if let Err(e) = export_csv_dialog(state) {
                    log::error!("CSV export failed: {e:#}");
                    state.status = Some(Status::Error(format!("Error: {e:#}")));
                }
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Clear all").clicked() {
                state.clear_all();
                ui.close_menu();
            }
        });

        ui.separator();

        let total_tests: usize = state.workbooks().iter().map(|wb| wb.tests.len()).sum();
        ui.label(format!(
            "{} workbooks, {} tests, {} selected",
            state.workbooks().len(),
            total_tests,
            state.selected_tests.len()
        ));

        if state.is_batch_loading() {
            ui.spinner();
        }

        if let Some(status) = &state.status {
            let color = if status.is_error() {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(status.text()).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open RvR workbooks")
        .add_filter("Spreadsheets", SUPPORTED_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_files();

    if let Some(paths) = files {
        let summary = state.load_local_files(&paths);
        log::info!(
            "Opened {} file(s), {} failed",
            summary.loaded.len(),
            summary.failures.len()
        );
    }
}

pub fn export_csv_dialog(state: &mut AppState) -> anyhow::Result<()> {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export comparison")
        .set_file_name(export::default_file_name())
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return Ok(());
    };

    let selected = state.selected_tests();
    let file = File::create(&path)
        .with_context(|| format!("could not create {}", path.display()))?;
    export::write_comparison_csv(BufWriter::new(file), &selected)
        .with_context(|| format!("could not write {}", path.display()))?;

    let message = format!("Exported {} tests to {}", selected.len(), path.display());
    state.status = Some(Status::Info(message));
    Ok(())
}
