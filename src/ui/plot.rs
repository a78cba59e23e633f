use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, Pos2, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::SeriesColors;
use crate::data::aggregate::CrossTab;
use crate::report::{Chart, ChartData};

const PLOT_HEIGHT: f32 = 300.0;
const BAR_WIDTH: f64 = 0.6;
const TREND_COLOR: Color32 = Color32::from_rgb(40, 90, 200);
const BAR_COLOR: Color32 = Color32::from_rgb(60, 120, 190);

// ---------------------------------------------------------------------------
// Chart dispatch
// ---------------------------------------------------------------------------

/// Render one chart.  `id` keeps plot memory (zoom, pan) apart between
/// sections.
pub fn chart(ui: &mut Ui, chart: &Chart, id: &str) {
    match &chart.data {
        ChartData::Line { points } => line_chart(ui, chart, points, id),
        ChartData::Bar { bars } => bar_chart(ui, chart, bars, id),
        ChartData::StackedBar { table } => stacked_bar_chart(ui, chart, table, id),
        ChartData::Pie { .. } if chart.data.is_empty() => {
            ui.label("No data for the current filters.");
        }
        ChartData::Pie { slices } => pie_chart(ui, slices),
    }
}

/// Axis formatter that prints category labels at integer positions.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let pos = mark.value.round();
        if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
            return String::new();
        }
        labels.get(pos as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Line chart: year → count
// ---------------------------------------------------------------------------

fn line_chart(ui: &mut Ui, chart: &Chart, points: &[(i32, usize)], id: &str) {
    let xy: Vec<[f64; 2]> = points
        .iter()
        .map(|&(year, count)| [f64::from(year), count as f64])
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let line = Line::new(PlotPoints::from(xy.clone()))
                .name(&chart.title)
                .color(TREND_COLOR)
                .width(2.0);
            plot_ui.line(line);

            let markers = Points::new(PlotPoints::from(xy))
                .color(TREND_COLOR)
                .radius(3.0);
            plot_ui.points(markers);
        });
}

// ---------------------------------------------------------------------------
// Bar chart: category → count
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, chart: &Chart, bars: &[(String, usize)], id: &str) {
    let labels: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();
    let bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            Bar::new(i as f64, *count as f64)
                .width(BAR_WIDTH)
                .name(label)
        })
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .allow_scroll(false)
        .x_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name(&chart.y_label));
        });
}

// ---------------------------------------------------------------------------
// Stacked bar chart: row label × stack label → count
// ---------------------------------------------------------------------------

fn stacked_bar_chart(ui: &mut Ui, chart: &Chart, table: &CrossTab, id: &str) {
    let colors = SeriesColors::new(table.stacks.iter().map(String::as_str));

    let mut charts: Vec<BarChart> = Vec::with_capacity(table.stacks.len());
    for (s, stack) in table.stacks.iter().enumerate() {
        let bars: Vec<Bar> = table
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                Bar::new(r as f64, table.counts[r][s] as f64)
                    .width(BAR_WIDTH)
                    .name(format!("{row} / {stack}"))
            })
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let series = BarChart::new(bars)
            .name(stack)
            .color(colors.color_for(stack))
            .stack_on(&below);
        charts.push(series);
    }

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(chart.x_label.as_str())
        .y_axis_label(chart.y_label.as_str())
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_formatter(category_axis(table.rows.clone()))
        .show(ui, |plot_ui| {
            for series in charts {
                plot_ui.bar_chart(series);
            }
        });
}

// ---------------------------------------------------------------------------
// Pie chart: label → count
// ---------------------------------------------------------------------------

/// Wedges are filled as fans of small triangles so that slices wider than a
/// half circle still render as convex shapes.
fn pie_chart(ui: &mut Ui, slices: &[(String, usize)]) {
    let total: usize = slices.iter().map(|(_, c)| c).sum::<usize>().max(1);

    let colors = SeriesColors::new(slices.iter().map(|(label, _)| label.as_str()));

    ui.horizontal(|ui: &mut Ui| {
        let (rect, _response) =
            ui.allocate_exact_size(egui::vec2(PLOT_HEIGHT, PLOT_HEIGHT), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = rect.width().min(rect.height()) * 0.45;

        let mut start = -TAU / 4.0;
        for (label, count) in slices {
            let sweep = TAU * (*count as f32 / total as f32);
            let color = colors.color_for(label);
            let steps = ((sweep / TAU) * 90.0).ceil().max(1.0) as usize;
            for k in 0..steps {
                let a0 = start + sweep * k as f32 / steps as f32;
                let a1 = start + sweep * (k + 1) as f32 / steps as f32;
                painter.add(Shape::convex_polygon(
                    vec![center, point_on_circle(center, radius, a0), point_on_circle(center, radius, a1)],
                    color,
                    Stroke::NONE,
                ));
            }
            start += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            for (label, count) in slices {
                let share = 100.0 * *count as f64 / total as f64;
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, colors.color_for(label));
                    ui.label(format!("{label}: {count} ({share:.1}%)"));
                });
            }
        });
    });
}

fn point_on_circle(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + radius * egui::vec2(angle.cos(), angle.sin())
}
