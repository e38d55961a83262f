//! Chart Viewer Widget
//! Central scrollable panel showing the switchable metric chart and the
//! stacked source-mix chart.

use crate::agg::{DepartmentAggregate, Metric};
use crate::charts::ChartPlotter;
use egui::{Color32, RichText, ScrollArea};

const CHART_HEIGHT: f32 = 320.0;
const CARD_SPACING: f32 = 15.0;

/// Central chart display area.
pub struct ChartViewer {
    pub aggregates: Vec<DepartmentAggregate>,
    pub selected_metric: Metric,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            aggregates: Vec::new(),
            selected_metric: Metric::WeightedCost,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all charts
    pub fn clear(&mut self) {
        self.aggregates.clear();
    }

    /// Set the aggregates to display, in the aggregator's output order.
    pub fn set_aggregates(&mut self, aggregates: Vec<DepartmentAggregate>) {
        self.aggregates = aggregates;
    }

    /// Draw the chart viewer
    pub fn show(&mut self, ui: &mut egui::Ui) {
        if self.aggregates.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                self.draw_metric_card(ui);
                ui.add_space(CARD_SPACING);
                self.draw_mix_card(ui);
            });
    }

    /// Metric bar chart with the four-way metric selector.
    fn draw_metric_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(
                RichText::new(format!(
                    "{} by Department",
                    self.selected_metric.label()
                ))
                .size(16.0)
                .strong(),
            );
            ui.add_space(6.0);

            ui.horizontal(|ui| {
                for metric in Metric::ALL {
                    ui.radio_value(&mut self.selected_metric, metric, metric.label());
                }
            });
            ui.add_space(8.0);

            ChartPlotter::draw_metric_chart(
                ui,
                &self.aggregates,
                self.selected_metric,
                CHART_HEIGHT,
            );
        });
    }

    /// Stacked solar/biomass/diesel proportions.
    fn draw_mix_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(
                RichText::new("Source Mix by Department")
                    .size(16.0)
                    .strong(),
            );
            ui.add_space(8.0);

            ChartPlotter::draw_mix_chart(ui, &self.aggregates, CHART_HEIGHT);
        });
    }

    fn card_frame() -> egui::Frame {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.5, Color32::from_rgb(70, 70, 80)))
            .inner_margin(12.0)
    }
}
