use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, GridInput, GridMark, Legend, Plot, PlotPoints, Polygon, uniform_grid_spacer,
};

use crate::color::{generate_palette, heat_color};
use crate::data::aggregate::{CompanyChart, Heatmap, SegmentChart, Series};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// One bar chart per series, each stacked on all the previous ones.
fn stacked_bars(xs: &[f64], labels: Option<&[String]>, series: &[Series], width: f64) -> Vec<BarChart> {
    let colors = generate_palette(series.len());
    let mut charts: Vec<BarChart> = Vec::with_capacity(series.len());

    for (s, color) in series.iter().zip(colors) {
        let bars: Vec<Bar> = xs
            .iter()
            .zip(&s.values)
            .enumerate()
            .map(|(i, (&x, &v))| {
                let bar = Bar::new(x, v).width(width);
                match labels.and_then(|l| l.get(i)) {
                    Some(label) => bar.name(format!("{label}\n{}", s.name)),
                    None => bar.name(&s.name),
                }
            })
            .collect();

        let chart = {
            let below: Vec<&BarChart> = charts.iter().collect();
            BarChart::new(bars)
                .name(&s.name)
                .color(color)
                .stack_on(&below)
        };
        charts.push(chart);
    }

    charts
}

/// Grid marks on every integer, used for categorical axes.
fn unit_spacer(_input: GridInput) -> [f64; 3] {
    [1.0, 5.0, 10.0]
}

/// Axis formatter mapping integer positions to labels.
fn label_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn chart_title(ui: &mut Ui, title: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(title);
    });
}

// ---------------------------------------------------------------------------
// Figure 1: emissions vs year, stacked by industry segment
// ---------------------------------------------------------------------------

pub fn segment_chart(ui: &mut Ui, chart: &SegmentChart) {
    chart_title(ui, "Methane Emissions vs Year (Stacked by Industry Segment)");

    let xs: Vec<f64> = chart.years.iter().map(|&y| y as f64).collect();
    let bars = stacked_bars(&xs, None, &chart.series, 0.7);

    Plot::new("emissions_graph")
        .legend(Legend::default().position(egui_plot::Corner::RightTop))
        .height(420.0)
        .x_axis_label("Year")
        .y_axis_label("Methane Emissions (tons)")
        .x_grid_spacer(uniform_grid_spacer(unit_spacer))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in bars {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Figure 2: emissions vs company, stacked by emission source
// ---------------------------------------------------------------------------

pub fn company_chart(ui: &mut Ui, chart: &CompanyChart) {
    chart_title(ui, "Methane Emissions vs. Company (Stacked by Emission Source)");

    let xs: Vec<f64> = (0..chart.companies.len()).map(|i| i as f64).collect();
    let bars = stacked_bars(&xs, Some(chart.companies.as_slice()), &chart.series, 0.7);

    Plot::new("emissions_source_graph")
        .legend(Legend::default().position(egui_plot::Corner::RightTop))
        .height(420.0)
        .x_axis_label("Company Name")
        .y_axis_label("Methane Emissions (Total CH4 Emissions)")
        .x_grid_spacer(uniform_grid_spacer(unit_spacer))
        .x_axis_formatter(label_formatter(chart.companies.clone()))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in bars {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Figure 3: heat map by state
// ---------------------------------------------------------------------------

pub fn state_heatmap(ui: &mut Ui, heatmap: &Heatmap) {
    chart_title(ui, "Heat map of methane emissions by state");

    if heatmap.is_empty() {
        ui.label("No data for the current selection.");
        return;
    }

    let max = heatmap.max();
    let response = Plot::new("state_heatmap")
        .height(600.0)
        .x_axis_label("Emission Source")
        .y_axis_label("State")
        .x_grid_spacer(uniform_grid_spacer(unit_spacer))
        .y_grid_spacer(uniform_grid_spacer(unit_spacer))
        .x_axis_formatter(label_formatter(heatmap.categories.clone()))
        .y_axis_formatter(label_formatter(heatmap.states.clone()))
        .show_grid(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (row, values) in heatmap.z.iter().enumerate() {
                for (col, &v) in values.iter().enumerate() {
                    let (x, y) = (col as f64, row as f64);
                    let cell: PlotPoints = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ]
                    .into();
                    plot_ui.polygon(
                        Polygon::new(cell)
                            .fill_color(heat_color(v, max))
                            .stroke(Stroke::new(0.5, Color32::from_gray(30))),
                    );
                }
            }

            // hovered cell, if any
            plot_ui.pointer_coordinate().and_then(|p| {
                let (col, row) = (p.x.round(), p.y.round());
                if col < 0.0 || row < 0.0 {
                    return None;
                }
                let (col, row) = (col as usize, row as usize);
                heatmap.z.get(row)?.get(col).map(|&v| (row, col, v))
            })
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Log(Emissions+1):  0");
        color_bar(ui, max);
        ui.label(format!("{max:.2}"));

        if let Some((row, col, v)) = response.inner {
            ui.separator();
            let state = match heatmap.states[row].as_str() {
                "" => "(no state)",
                s => s,
            };
            ui.label(format!(
                "{state} / {}: {v:.2} (≈ {:.1} t)",
                heatmap.categories[col],
                v.exp_m1()
            ));
        }
    });
}

/// Horizontal strip showing the heat ramp.
fn color_bar(ui: &mut Ui, max: f64) {
    const STEPS: usize = 32;
    let (rect, _) = ui.allocate_exact_size(egui::vec2(200.0, 14.0), Sense::hover());
    let painter = ui.painter_at(rect);
    let step_width = rect.width() / STEPS as f32;

    for k in 0..STEPS {
        let x0 = rect.left() + k as f32 * step_width;
        let cell = Rect::from_min_max(Pos2::new(x0, rect.top()), Pos2::new(x0 + step_width, rect.bottom()));
        let v = max * k as f64 / (STEPS - 1) as f64;
        painter.rect_filled(cell, 0.0, heat_color(v, max));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(value: f64) -> GridMark {
        GridMark { value, step_size: 1.0 }
    }

    #[test]
    fn labels_only_on_integer_positions() {
        let fmt = label_formatter(vec!["Acme".into(), "Basin Co".into()]);
        let range = 0.0..=1.0;
        assert_eq!(fmt(mark(0.0), &range), "Acme");
        assert_eq!(fmt(mark(1.0), &range), "Basin Co");
        assert_eq!(fmt(mark(0.5), &range), "");
        assert_eq!(fmt(mark(2.0), &range), "");
        assert_eq!(fmt(mark(-1.0), &range), "");
    }
}
