use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{heatmap, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BikeDashboardApp {
    pub state: AppState,
}

impl BikeDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for BikeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let before = self.state.filters.clone();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // One recompute per filter change, before anything reads the summary.
        self.state.refilter_if_changed(&before);

        // ---- Central panel: KPIs + tabbed charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut egui::Ui| {
                    ui.heading("Open a dataset to start  (File → Open…)");
                });
                return;
            }

            panels::kpi_row(ui, &self.state);
            ui.separator();

            ui.horizontal(|ui: &mut egui::Ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.title());
                }
            });
            ui.separator();

            let Some(summary) = &self.state.summary else {
                return;
            };
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut egui::Ui| match self.state.tab {
                    Tab::TimePatterns => plot::time_patterns(ui, summary),
                    Tab::SeasonWeather => plot::season_weather(ui, summary),
                    Tab::Correlations => heatmap::correlation_heatmap(ui, summary),
                    Tab::Statistics => table::statistics_table(ui, summary),
                });
        });
    }
}
