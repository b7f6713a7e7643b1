use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::DashboardSummary;
use crate::ui::{decimal, no_data, thousands};

// ---------------------------------------------------------------------------
// Descriptive statistics (Statistics tab)
// ---------------------------------------------------------------------------

/// `describe()`-style table over every numeric column for the filtered rows,
/// followed by the per-hour breakdown behind the hourly chart.
pub fn statistics_table(ui: &mut Ui, summary: &DashboardSummary) {
    ui.heading("Descriptive statistics");
    if summary.is_empty() {
        no_data(ui, "No data for the current filters.");
        return;
    }

    let stat = |v: Option<f64>| match v {
        Some(v) => format!("{v:.3}"),
        None => "–".to_string(),
    };

    ui.push_id("describe_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(100.0))
            .columns(Column::auto().at_least(80.0), 5)
            .header(20.0, |mut header| {
                for title in ["column", "count", "mean", "std", "min", "max"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for s in &summary.describe {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(s.column.name());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(thousands(s.count as u64));
                        });
                        for v in [s.mean, s.std, s.min, s.max] {
                            row.col(|ui: &mut Ui| {
                                ui.monospace(stat(v));
                            });
                        }
                    });
                }
            });
    });

    ui.add_space(16.0);
    ui.heading(format!("{} by hour", summary.target.label()));
    ui.label(RichText::new(format!("Column: {}", summary.target.column())).weak());

    ui.push_id("hourly_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(80.0), 4)
            .header(20.0, |mut header| {
                for title in ["hour", "rows", "mean", "std"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for h in &summary.hourly {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:02}", h.hour));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(thousands(h.rows as u64));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.monospace(decimal(Some(h.mean)));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.monospace(decimal(h.std));
                        });
                    });
                }
            });
    });
}
