mod app;
mod color;
mod config;
mod data;
mod error;
mod report;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyWingsApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load();
    // Optional positional argument: the dataset to open.
    let data_path = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Wings – Aviation Accident Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyWingsApp::new(config, data_path)))),
    )
}
