mod app;
mod chart;
mod color;
mod config;
mod data;
mod error;
mod resolver;
mod rules;
mod state;
mod table;
mod ui;

use std::sync::Arc;

use app::DashboardApp;
use config::Config;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::load();
    let dataset = Arc::new(data::loader::load_dataset(&config));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "社群數據儀表板",
        options,
        Box::new(move |cc| {
            ui::fonts::install_cjk_font(&cc.egui_ctx, config.cjk_font.as_deref());
            let state = AppState::new(dataset);
            Ok(Box::new(DashboardApp::new(state, config.page_size)))
        }),
    )
}
