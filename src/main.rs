//! GridMix - Energy-Project Spreadsheet Analysis & Interactive Chart Viewer
//!
//! Loads a spreadsheet of energy-project records, aggregates them by
//! administrative department, and displays the per-department metrics as
//! interactive charts.

mod agg;
mod charts;
mod config;
mod data;
mod gui;

use eframe::egui;
use gui::GridMixApp;
use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // An input path on the command line replaces the file dialog.
    let preset_path = std::env::args().nth(1).map(PathBuf::from);

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("GridMix"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "GridMix",
        options,
        Box::new(move |cc| Ok(Box::new(GridMixApp::new(cc, preset_path)))),
    )
}
