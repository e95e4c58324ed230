use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    page_size: usize,
}

impl DashboardApp {
    pub fn new(state: AppState, page_size: usize) -> Self {
        Self { state, page_size }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors + category pie ----
        egui::SidePanel::left("selector_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: data table ----
        egui::TopBottomPanel::bottom("table_panel")
            .resizable(true)
            .default_height(260.0)
            .show(ctx, |ui| {
                table::data_table(ui, &mut self.state, self.page_size);
            });

        // ---- Central panel: the two charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let view = &self.state.view;
            let options = &self.state.options;
            ui.columns(2, |cols| {
                if options.primary_pane_visible {
                    plot::chart(&mut cols[0], "primary_chart", &view.primary);
                }
                if options.secondary_pane_visible {
                    plot::chart(&mut cols[1], "secondary_chart", &view.secondary);
                }
            });
        });
    }
}
