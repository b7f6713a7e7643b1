use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color;
use crate::data::aggregate::{DashboardSummary, GroupMean};
use crate::ui::no_data;

const CHART_HEIGHT: f32 = 320.0;
const NO_ROWS: &str = "No data for the current filters.";

// ---------------------------------------------------------------------------
// Time patterns tab
// ---------------------------------------------------------------------------

pub fn time_patterns(ui: &mut Ui, summary: &DashboardSummary) {
    if summary.is_empty() {
        no_data(ui, NO_ROWS);
        return;
    }

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].heading("Mean rentals by hour");
        hourly_plot(&mut cols[0], summary);
        cols[0].label(caption("Typical commuter peaks around morning and evening hours."));

        cols[1].heading("Mean rentals by period of day");
        let bars: Vec<(String, Option<f64>, Color32)> = summary
            .by_period
            .iter()
            .map(|g| (g.key.name().to_string(), g.mean, color::period_color(g.key)))
            .collect();
        category_bars(&mut cols[1], "period_bars", "Period of day", &bars);
        cols[1].label(caption("Evening and morning windows highlight strong rush-hour usage."));
    });

    ui.separator();
    ui.heading("Hourly rentals by day of week");
    weekday_plot(ui, summary);
    ui.label(caption("Compare workdays vs weekend profiles to see commuting effects."));
}

/// Mean per hour with a ±1 standard deviation band.
fn hourly_plot(ui: &mut Ui, summary: &DashboardSummary) {
    let mean: Vec<[f64; 2]> = summary
        .hourly
        .iter()
        .map(|h| [h.hour as f64, h.mean])
        .collect();

    // Upper edge left→right, lower edge right→left.
    let mut band: Vec<[f64; 2]> = summary
        .hourly
        .iter()
        .map(|h| [h.hour as f64, h.mean + h.std.unwrap_or(0.0)])
        .collect();
    band.extend(
        summary
            .hourly
            .iter()
            .rev()
            .map(|h| [h.hour as f64, (h.mean - h.std.unwrap_or(0.0)).max(0.0)]),
    );

    Plot::new("hourly_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("Hour of day")
        .y_axis_label("Mean rentals")
        .include_x(0.0)
        .include_x(23.0)
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            if summary.hourly.len() > 1 {
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(band))
                        .name("±1 std")
                        .fill_color(color::ACCENT.gamma_multiply(0.15))
                        .stroke((0.0, Color32::TRANSPARENT)),
                );
            }
            plot_ui.line(Line::new(mean.clone()).name("Mean rentals").color(color::ACCENT).width(3.0));
            plot_ui.points(Points::new(mean).color(color::ACCENT).radius(4.0));
        });
}

/// One line per weekday, coloured from an evenly spaced palette.
fn weekday_plot(ui: &mut Ui, summary: &DashboardSummary) {
    let palette = color::generate_palette(7);

    Plot::new("weekday_plot")
        .height(CHART_HEIGHT + 40.0)
        .legend(Legend::default())
        .x_axis_label("Hour")
        .y_axis_label("Mean rentals")
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for series in &summary.by_weekday_hour {
                let c = palette[series.day.num_days_from_monday() as usize];
                let points: PlotPoints = series
                    .points
                    .iter()
                    .map(|&(h, m)| [h as f64, m])
                    .collect();
                plot_ui.line(Line::new(points).name(series.name).color(c).width(2.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Season & weather tab
// ---------------------------------------------------------------------------

pub fn season_weather(ui: &mut Ui, summary: &DashboardSummary) {
    if summary.is_empty() {
        no_data(ui, NO_ROWS);
        return;
    }

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].heading("Mean rentals by season");
        let bars = ranked_bars(&summary.by_season, |s| (s.name().to_string(), color::season_color(*s)));
        category_bars(&mut cols[0], "season_bars", "Season", &bars);
        cols[0].label(caption("Warm seasons boost usage; winter typically shows a drop."));

        cols[1].heading("Mean rentals by weather");
        let bars = ranked_bars(&summary.by_weather, |w| (w.label().to_string(), color::weather_color(*w)));
        category_bars(&mut cols[1], "weather_bars", "Weather category", &bars);
        cols[1].label(caption("Clear days drive more rides; harsh conditions dampen demand."));
    });
}

fn ranked_bars<K>(groups: &[GroupMean<K>], style: impl Fn(&K) -> (String, Color32)) -> Vec<(String, Option<f64>, Color32)> {
    groups
        .iter()
        .map(|g| {
            let (label, c) = style(&g.key);
            (label, g.mean, c)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Bar chart over named categories placed at x = 0, 1, 2, …
/// Categories without a mean keep their slot but draw no bar.
fn category_bars(ui: &mut Ui, id: &str, x_label: &str, bars: &[(String, Option<f64>, Color32)]) {
    let labels: Vec<String> = bars.iter().map(|(l, _, _)| l.clone()).collect();
    let chart = BarChart::new(
        bars.iter()
            .enumerate()
            .filter_map(|(i, (label, mean, c))| {
                mean.map(|m| Bar::new(i as f64, m).width(0.6).fill(*c).name(label))
            })
            .collect(),
    );

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label("Mean rentals")
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_grid([false, true])
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

fn caption(text: &str) -> eframe::egui::RichText {
    eframe::egui::RichText::new(text).small().weak()
}
