//! Chart Plotter Module
//! Builds the interactive department charts using egui_plot.

use crate::agg::{DepartmentAggregate, Metric};
use egui::Color32;
use egui_plot::{Bar, BarChart, Legend, Plot};

/// Source-mix series colors (same assignment as the workbook charts).
pub const SOLAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const BIOMASS_COLOR: Color32 = Color32::from_rgb(46, 204, 113); // Green
pub const DIESEL_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red

/// Single-series metric bar color.
pub const METRIC_COLOR: Color32 = Color32::from_rgb(243, 156, 18); // Orange

const BAR_WIDTH: f64 = 0.6;

/// Creates the department bar charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw the single-series bar chart for the selected scalar metric.
    /// X-axis: departments, Y-axis: metric value.
    pub fn draw_metric_chart(
        ui: &mut egui::Ui,
        aggregates: &[DepartmentAggregate],
        metric: Metric,
        height: f32,
    ) {
        let x_labels: Vec<String> = aggregates.iter().map(|a| a.department.clone()).collect();

        let bars: Vec<Bar> = aggregates
            .iter()
            .enumerate()
            .map(|(i, aggregate)| {
                Bar::new(i as f64, metric.value(aggregate))
                    .width(BAR_WIDTH)
                    .name(&aggregate.department)
            })
            .collect();

        let chart = BarChart::new(bars)
            .color(METRIC_COLOR)
            .name(format!("{} ({})", metric.label(), metric.unit()));

        // One plot id per metric so auto-bounds reset on switch.
        Plot::new(format!("metric_{}", metric.label()))
            .height(height)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Department")
            .y_axis_label(format!("{} ({})", metric.label(), metric.unit()))
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if idx < x_labels.len() {
                    x_labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(chart);
            });
    }

    /// Draw the stacked source-mix chart.
    /// The three proportions stack to at most 1 per department.
    pub fn draw_mix_chart(ui: &mut egui::Ui, aggregates: &[DepartmentAggregate], height: f32) {
        let x_labels: Vec<String> = aggregates.iter().map(|a| a.department.clone()).collect();

        let bars_for = |values: Vec<f64>| -> Vec<Bar> {
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| Bar::new(i as f64, v).width(BAR_WIDTH))
                .collect()
        };

        let solar = BarChart::new(bars_for(
            aggregates.iter().map(|a| a.solar_prop).collect(),
        ))
        .color(SOLAR_COLOR)
        .name("Solar");

        let biomass = BarChart::new(bars_for(
            aggregates.iter().map(|a| a.biomass_prop).collect(),
        ))
        .color(BIOMASS_COLOR)
        .name("Biomass")
        .stack_on(&[&solar]);

        let diesel = BarChart::new(bars_for(
            aggregates.iter().map(|a| a.diesel_prop).collect(),
        ))
        .color(DIESEL_COLOR)
        .name("Diesel")
        .stack_on(&[&solar, &biomass]);

        Plot::new("source_mix")
            .height(height)
            .allow_scroll(false)
            .legend(Legend::default())
            .include_y(0.0)
            .include_y(1.0)
            .x_axis_label("Department")
            .y_axis_label("Share of generation")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if idx < x_labels.len() {
                    x_labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(solar);
                plot_ui.bar_chart(biomass);
                plot_ui.bar_chart(diesel);
            });
    }
}
