use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use sankey_tool::data::loader::FileFormat;

use crate::state::{AppState, ColumnSlot};

// ---------------------------------------------------------------------------
// Left side panel – column selection
// ---------------------------------------------------------------------------

/// Render the left panel: four column dropdowns and the generate button.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Sankey Chart Generator");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let (all_columns, numeric_columns) = match &state.table {
        Some(table) => (table.column_names(), table.numeric_column_names()),
        None => {
            ui.label("No file loaded.");
            ui.add_space(4.0);
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
            }
            return;
        }
    };

    for slot in ColumnSlot::ALL {
        let options = match slot {
            ColumnSlot::Value => &numeric_columns,
            _ => &all_columns,
        };
        let current = slot.current(&state.columns).unwrap_or_default().to_string();

        ui.strong(slot.label());
        egui::ComboBox::from_id_salt(slot.label())
            .selected_text(&current)
            .width(ui.available_width() - 8.0)
            .show_ui(ui, |ui: &mut Ui| {
                for col in options {
                    if ui.selectable_label(current == *col, col).clicked() {
                        state.set_column(slot, col.clone());
                    }
                }
            });
        ui.add_space(4.0);
    }

    if numeric_columns.is_empty() {
        ui.label(RichText::new("No numeric column to use as value.").color(Color32::RED));
    }

    ui.separator();
    if ui.button("Generate Sankey Chart").clicked() {
        state.generate();
    }

    if let Some(diagram) = &state.diagram {
        let [_, d1, d2, d3] = diagram.stage_sizes();
        ui.label(format!(
            "{} nodes ({d1} / {d2} / {d3}), {} links",
            diagram.node_count(),
            diagram.edges().len()
        ));

        if let Some(node) = state.hovered_node {
            let stage = match diagram.stage_of(node) {
                0 => "root",
                1 => "level 1",
                2 => "level 2",
                _ => "level 3",
            };
            let outgoing = diagram.edges().iter().filter(|e| e.source == node).count();
            ui.label(format!(
                "{} ({stage}), {outgoing} outgoing links",
                diagram.labels()[node]
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Bottom panel – data preview
// ---------------------------------------------------------------------------

/// Show the first rows of the loaded table.
pub fn preview_panel(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let rows = table.row_count().min(state.config.preview_rows);
    ui.label(format!("Preview: {rows} of {} rows", table.row_count()));

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(TableColumn::auto().at_least(60.0), table.columns().len())
            .header(20.0, |mut header| {
                for col in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&col.name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows, |mut row| {
                    let i = row.index();
                    for col in table.columns() {
                        row.col(|ui: &mut Ui| {
                            ui.label(col.values[i].to_string());
                        });
                    }
                });
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
            let can_export = state.diagram.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export diagram JSON…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(name), Some(table)) = (&state.file_name, &state.table) {
            ui.label(format!(
                "{name}: {} rows, {} columns",
                table.row_count(),
                table.columns().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", FileFormat::EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export Sankey diagram")
        .set_file_name("sankey.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_diagram(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
