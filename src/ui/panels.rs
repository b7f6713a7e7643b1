use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color;
use crate::data::filter::{FilterState, MAX_HOUR, MIN_HOUR, TargetMetric, WorkingDayFilter, is_selected, toggle_selection};
use crate::export::{self, SummaryExport};
use crate::state::AppState;
use crate::ui::{decimal, thousands};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Only mutates `state.filters`; the caller
/// decides whether a recompute is needed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let filters = &mut state.filters;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year ----
            ui.strong("Year");
            let year_text = filters.year.map_or("All".to_string(), |y| y.to_string());
            egui::ComboBox::from_id_salt("year")
                .selected_text(year_text)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut filters.year, None, "All");
                    for &y in &dataset.years {
                        ui.selectable_value(&mut filters.year, Some(y), y.to_string());
                    }
                });
            ui.separator();

            // ---- Season (multi-select) ----
            let n_seasons = if filters.seasons.is_empty() {
                dataset.seasons.len()
            } else {
                filters.seasons.len()
            };
            egui::CollapsingHeader::new(
                RichText::new(format!("Season  ({n_seasons}/{})", dataset.seasons.len())).strong(),
            )
            .id_salt("season")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    filters.seasons.clear();
                }
                for &season in &dataset.seasons {
                    let mut checked = is_selected(&filters.seasons, &season);
                    let text = RichText::new(season.name()).color(color::season_color(season));
                    if ui.checkbox(&mut checked, text).changed() {
                        toggle_selection(&mut filters.seasons, &dataset.seasons, season, checked);
                    }
                }
            });

            // ---- Weather (multi-select) ----
            let n_weather = if filters.weathers.is_empty() {
                dataset.weathers.len()
            } else {
                filters.weathers.len()
            };
            egui::CollapsingHeader::new(
                RichText::new(format!("Weather category  ({n_weather}/{})", dataset.weathers.len())).strong(),
            )
            .id_salt("weather")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    filters.weathers.clear();
                }
                for &weather in &dataset.weathers {
                    let mut checked = is_selected(&filters.weathers, &weather);
                    if ui.checkbox(&mut checked, weather.label()).changed() {
                        toggle_selection(&mut filters.weathers, &dataset.weathers, weather, checked);
                    }
                }
            });
            ui.separator();

            // ---- Working day ----
            ui.strong("Working day filter");
            egui::ComboBox::from_id_salt("working_day")
                .selected_text(filters.working_day.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in WorkingDayFilter::ALL {
                        ui.selectable_value(&mut filters.working_day, option, option.label());
                    }
                });
            ui.separator();

            // ---- Hour range ----
            ui.strong("Hour range");
            let mut from = filters.hour_min;
            let mut to = filters.hour_max;
            if ui.add(egui::Slider::new(&mut from, MIN_HOUR..=MAX_HOUR).text("from")).changed() {
                filters.set_hour_min(from);
            }
            if ui.add(egui::Slider::new(&mut to, MIN_HOUR..=MAX_HOUR).text("to")).changed() {
                filters.set_hour_max(to);
            }
            ui.separator();

            // ---- Target metric ----
            ui.strong("Show");
            egui::ComboBox::from_id_salt("target")
                .selected_text(filters.target.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in TargetMetric::ALL {
                        ui.selectable_value(&mut filters.target, option, option.label());
                    }
                });
            ui.separator();

            if ui.button("Reset filters").clicked() {
                let target = filters.target;
                *filters = FilterState {
                    target,
                    ..FilterState::default()
                };
            }
        });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

/// Total, mean, peak hour and row count for the current filters.
pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        return;
    };
    let metric = summary.target.label().to_lowercase();
    let peak = summary
        .peak_hour
        .map_or("–".to_string(), |h| format!("{h:02}:00"));

    ui.columns(4, |cols: &mut [Ui]| {
        kpi(&mut cols[0], &format!("Total {metric} (filtered)"), &thousands(summary.total));
        kpi(&mut cols[1], &format!("Average {metric} per hour"), &decimal(summary.mean));
        kpi(&mut cols[2], "Peak hour (filtered)", &peak);
        kpi(&mut cols[3], "Hours in selection", &thousands(summary.rows as u64));
    });
}

fn kpi(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(26.0).strong().color(color::ACCENT));
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.summary.is_some();
            if ui.add_enabled(can_export, egui::Button::new("Export summary…")).clicked() {
                export_summary_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new("🚲 Bike Sharing Demand").strong());
        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} visible",
                thousands(ds.len() as u64),
                thousands(state.visible_indices.len() as u64)
            ));
            if let Some((first, last)) = ds.span {
                ui.label(RichText::new(format!("{} – {}", first.date(), last.date())).weak());
            }
            if let Some(name) = state.source_name() {
                ui.label(RichText::new(name).weak());
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open rental data")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset, &path),
            Err(e) => {
                // Keep whatever was loaded before.
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_summary_dialog(state: &mut AppState) {
    let Some(summary) = &state.summary else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export summary")
        .set_file_name("bike_summary.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        let export = SummaryExport {
            source: state.source_name(),
            filters: &state.filters,
            summary,
        };
        match export::save_summary(&path, &export) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export summary: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
