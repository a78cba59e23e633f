use std::path::PathBuf;

use eframe::egui;

use crate::config::{DashboardConfig, DEFAULT_DATA_FILE};
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyWingsApp {
    pub state: AppState,
}

impl RustyWingsApp {
    /// Build the app and open `data_path`, else the configured file, else
    /// `Aviation_Data.csv` if it exists.  A named file that fails to open
    /// shows up in the status line.
    pub fn new(config: DashboardConfig, data_path: Option<PathBuf>) -> Self {
        let named = data_path.or_else(|| config.data_path.clone());
        let mut state = AppState::new(config);
        match named {
            Some(path) => state.open(path),
            None => {
                let path = PathBuf::from(DEFAULT_DATA_FILE);
                if path.exists() {
                    state.open(path);
                } else {
                    log::info!("{DEFAULT_DATA_FILE} not found, waiting for File → Open…");
                }
            }
        }
        Self { state }
    }
}

impl eframe::App for RustyWingsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &self.state);
        });
    }
}
