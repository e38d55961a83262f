//! GridMix Main Application
//! Main window wiring the loader, cleaner, aggregator, and chart viewer.

use crate::agg::{Aggregator, DepartmentAggregate};
use crate::config::AnalysisConfig;
use crate::data::{CleanReport, DataLoader, RecordCleaner};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Pipeline result from background thread
enum PipelineResult {
    Progress(f32, String),
    Complete {
        aggregates: Vec<DepartmentAggregate>,
        report: CleanReport,
    },
    Error(String),
}

/// Main application window.
pub struct GridMixApp {
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async pipeline run
    pipeline_rx: Option<Receiver<PipelineResult>>,
    is_running: bool,
}

impl GridMixApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, preset_path: Option<PathBuf>) -> Self {
        let config = AnalysisConfig::load_or_default(Path::new("gridmix.json"));
        let mut app = Self::with_config(config);

        if let Some(path) = preset_path {
            info!("input preselected from command line: {}", path.display());
            app.set_input_file(path);
        }

        app
    }

    fn with_config(config: AnalysisConfig) -> Self {
        Self {
            control_panel: ControlPanel::new(config),
            chart_viewer: ChartViewer::new(),
            pipeline_rx: None,
            is_running: false,
        }
    }

    /// Handle spreadsheet selection
    fn handle_browse_file(&mut self) {
        if self.is_running {
            return; // Already running
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Spreadsheets", &["csv", "xlsx", "xls", "xlsb", "ods"])
            .pick_file()
        {
            self.set_input_file(path);
        }
    }

    /// Apply a newly selected input file
    fn set_input_file(&mut self, path: PathBuf) {
        self.chart_viewer.clear();
        self.control_panel.input_path = Some(path);
        self.control_panel.run_enabled = true;
        self.control_panel.set_progress(0.0, "Ready");
    }

    /// Start the load-clean-aggregate pipeline in a background thread
    fn start_run(&mut self) {
        let Some(path) = self.control_panel.input_path.clone() else {
            self.control_panel.set_progress(0.0, "No file selected");
            return;
        };
        let config = self.control_panel.config.clone();

        let (tx, rx) = channel();
        self.pipeline_rx = Some(rx);
        self.is_running = true;
        self.control_panel
            .set_progress(5.0, "Loading spreadsheet...");

        thread::spawn(move || {
            Self::run_pipeline(tx, path, config);
        });
    }

    /// Run the pipeline (called from background thread)
    fn run_pipeline(tx: Sender<PipelineResult>, path: PathBuf, config: AnalysisConfig) {
        let df = match DataLoader::read_table(&path) {
            Ok(df) => df,
            Err(e) => {
                let _ = tx.send(PipelineResult::Error(e.to_string()));
                return;
            }
        };
        info!("loaded {} rows from {}", df.height(), path.display());
        let _ = tx.send(PipelineResult::Progress(
            40.0,
            format!("Loaded {} rows, cleaning...", df.height()),
        ));

        let (records, report) = match RecordCleaner::clean(&df, &config) {
            Ok(cleaned) => cleaned,
            Err(e) => {
                let _ = tx.send(PipelineResult::Error(e.to_string()));
                return;
            }
        };
        let _ = tx.send(PipelineResult::Progress(
            70.0,
            format!("{} records kept, aggregating...", report.rows_kept),
        ));

        let aggregates = Aggregator::aggregate(&records, config.subsidy_ratio);
        let _ = tx.send(PipelineResult::Complete { aggregates, report });
    }

    /// Check for pipeline results
    fn check_pipeline_results(&mut self) {
        // Take the receiver temporarily to avoid borrow issues
        let rx = self.pipeline_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    PipelineResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    PipelineResult::Complete { aggregates, report } => {
                        let count = aggregates.len();
                        self.chart_viewer.set_aggregates(aggregates);
                        self.control_panel.set_progress(
                            100.0,
                            &format!(
                                "Complete! {} departments ({} of {} rows kept)",
                                count, report.rows_kept, report.rows_in
                            ),
                        );
                        self.is_running = false;
                        should_keep_receiver = false;
                    }
                    PipelineResult::Error(error) => {
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.is_running = false;
                        should_keep_receiver = false;
                    }
                }
            }

            // Put receiver back if still needed
            if should_keep_receiver {
                self.pipeline_rx = Some(rx);
            }
        }
    }
}

impl eframe::App for GridMixApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_pipeline_results();

        // Request repaint while the pipeline is running
        if self.is_running {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(330.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::Run => {
                            if !self.is_running {
                                self.start_run();
                            }
                        }
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
