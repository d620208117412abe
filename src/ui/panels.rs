use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{COUNTY_COLUMN, STATE_COLUMN};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(workbook) = &state.workbook else {
        ui.label("No file loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the widgets.
    let sheet_names = workbook.sheet_names();
    let Some(combined) = state.combined_table() else {
        return;
    };
    let state_options = state.state_options(&combined);
    let county_options = state.county_options(&combined);
    let metric_options = state.metric_options(&combined);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year (sheet) multi-select ----
            let n_selected = state.selection.sheets.len();
            let header_text = format!("Years (sheets)  ({n_selected}/{})", sheet_names.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("sheets")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_sheets();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_sheets();
                        }
                    });
                    for sheet in &sheet_names {
                        let mut checked = state.selection.sheets.contains(sheet);
                        if ui.checkbox(&mut checked, sheet).changed() {
                            state.toggle_sheet(sheet);
                        }
                    }
                });
            ui.separator();

            // ---- State single-select (only if the column exists) ----
            if combined.has_column(STATE_COLUMN) {
                ui.strong("State");
                let current = state
                    .selection
                    .state
                    .clone()
                    .unwrap_or_else(|| "(none)".to_string());
                egui::ComboBox::from_id_salt("state_select")
                    .selected_text(&current)
                    .show_ui(ui, |ui: &mut Ui| {
                        if ui
                            .selectable_label(state.selection.state.is_none(), "(none)")
                            .clicked()
                        {
                            state.selection.state = None;
                        }
                        for value in &state_options {
                            let is_selected = state.selection.state.as_deref() == Some(value);
                            if ui.selectable_label(is_selected, value).clicked() {
                                state.selection.state = Some(value.clone());
                            }
                        }
                    });
                ui.separator();
            }

            // ---- County multi-select (only if the column exists) ----
            if combined.has_column(COUNTY_COLUMN) {
                let n_selected = county_options
                    .iter()
                    .filter(|c| state.county_selected(c))
                    .count();
                let header_text = format!("Counties  ({n_selected}/{})", county_options.len());
                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt("counties")
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all_counties();
                            }
                            if ui.small_button("None").clicked() {
                                state.select_no_counties();
                            }
                        });
                        for county in &county_options {
                            let mut checked = state.county_selected(county);
                            if ui.checkbox(&mut checked, county).changed() {
                                state.toggle_county(county, &county_options);
                            }
                        }
                    });
                ui.separator();
            }

            // ---- Metric single-select ----
            ui.strong("Metric");
            let current = state
                .selection
                .metric
                .clone()
                .unwrap_or_else(|| "(select a metric)".to_string());
            egui::ComboBox::from_id_salt("metric_select")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for metric in &metric_options {
                        let is_selected = state.selection.metric.as_deref() == Some(metric);
                        if ui.selectable_label(is_selected, metric).clicked() {
                            state.selection.metric = Some(metric.clone());
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(wb) = &state.workbook {
            let combined_rows = state
                .combined_table()
                .map(|t| t.len())
                .unwrap_or(0);
            ui.label(format!(
                "{} sheets, {} rows in selection",
                wb.sheets.len(),
                combined_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open healthcare metrics workbook")
        .add_filter("Excel workbook", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(workbook) => {
                log::info!(
                    "Loaded workbook with sheets {:?}",
                    workbook.sheet_names()
                );
                state.set_workbook(workbook);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
