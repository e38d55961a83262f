//! Charts module - egui_plot chart construction

mod plotter;

pub use plotter::ChartPlotter;
