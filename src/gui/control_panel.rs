//! Control Panel Widget
//! Left side panel with input selection, run parameters, and progress.

use crate::config::AnalysisConfig;
use egui::{Color32, RichText};
use std::path::PathBuf;

/// Left side control panel with file selection and run controls.
pub struct ControlPanel {
    pub config: AnalysisConfig,
    pub input_path: Option<PathBuf>,
    pub progress: f32,
    pub status: String,
    pub run_enabled: bool,
}

impl ControlPanel {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            input_path: None,
            progress: 0.0,
            status: "Ready".to_string(),
            run_enabled: false,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("⚡ GridMix")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Department Energy Analyzer")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .input_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.input_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseFile;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Parameters Section =====
        ui.label(RichText::new("⚙️ Parameters").size(14.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.add_sized([110.0, 20.0], egui::Label::new("Subsidy ratio:"));
            ui.add(
                egui::DragValue::new(&mut self.config.subsidy_ratio)
                    .range(0.0..=1.0)
                    .speed(0.01)
                    .fixed_decimals(2),
            );
        });
        ui.label(
            RichText::new("Fraction of cost covered by subsidy")
                .size(10.0)
                .color(Color32::GRAY),
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Button =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.run_enabled, |ui| {
                let button = egui::Button::new(RichText::new("▶ Run Analysis").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Run;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    Run,
}
