use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, sankey_view};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SankeyApp {
    pub state: AppState,
}

impl SankeyApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SankeyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: column selection ----
        egui::SidePanel::left("column_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: data preview ----
        if self.state.table.is_some() {
            egui::TopBottomPanel::bottom("preview_panel")
                .resizable(true)
                .default_height(180.0)
                .show(ctx, |ui| {
                    panels::preview_panel(ui, &self.state);
                });
        }

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            sankey_view::sankey_chart(ui, &mut self.state);
        });
    }
}
