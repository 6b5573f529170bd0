mod app;
mod state;
mod ui;

use app::SankeyApp;
use eframe::egui;
use sankey_tool::config::AppConfig;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        log::warn!("Ignoring config: {e:#}");
        AppConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let mut state = AppState::new(config);
    // A file given on the command line is opened right away.
    if let Some(path) = std::env::args_os().nth(1) {
        state.open_path(std::path::Path::new(&path));
    }

    eframe::run_native(
        "Sankey Chart Tool",
        options,
        Box::new(|_cc| Ok(Box::new(SankeyApp::new(state)))),
    )
}
