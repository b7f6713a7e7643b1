use std::f32::consts::FRAC_PI_2;

use eframe::egui::{self, Align2, FontId, Pos2, Rect, Sense, Ui, Vec2};
use eframe::egui::epaint::TextShape;

use crate::color;
use crate::data::aggregate::DashboardSummary;
use crate::ui::no_data;

const LABEL_SPACE: f32 = 84.0;
const MIN_CELL: f32 = 22.0;
const MAX_CELL: f32 = 56.0;

// ---------------------------------------------------------------------------
// Correlation heatmap (painted directly)
// ---------------------------------------------------------------------------

pub fn correlation_heatmap(ui: &mut Ui, summary: &DashboardSummary) {
    ui.heading("Correlation heatmap (numeric features)");

    let Some(corr) = &summary.correlation else {
        no_data(ui, "Not enough numeric data after filtering to compute correlations.");
        return;
    };
    let k = corr.columns.len();

    let cell = ((ui.available_width() - LABEL_SPACE) / k as f32).clamp(MIN_CELL, MAX_CELL);
    let size = Vec2::splat(LABEL_SPACE + cell * k as f32);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min + Vec2::splat(LABEL_SPACE);

    let font = FontId::proportional((cell * 0.3).clamp(8.0, 12.0));
    let label_color = ui.visuals().text_color();

    for (i, col) in corr.columns.iter().enumerate() {
        // Row labels on the left, right-aligned against the grid.
        painter.text(
            Pos2::new(origin.x - 6.0, origin.y + cell * (i as f32 + 0.5)),
            Align2::RIGHT_CENTER,
            col.name(),
            font.clone(),
            label_color,
        );

        // Column labels above, rotated to read bottom-up.
        let galley = painter.layout_no_wrap(col.name().to_string(), font.clone(), label_color);
        let x = origin.x + cell * (i as f32 + 0.5) - galley.size().y / 2.0;
        let pos = Pos2::new(x, origin.y - 6.0);
        painter.add(TextShape::new(pos, galley, label_color).with_angle(-FRAC_PI_2));

        for j in 0..k {
            let value = corr.get(i, j);
            let rect = Rect::from_min_size(
                Pos2::new(origin.x + cell * j as f32, origin.y + cell * i as f32),
                Vec2::splat(cell),
            );
            let fill = color::diverging(value);
            painter.rect_filled(rect.shrink(0.5), 0.0, fill);
            if let Some(v) = value {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{v:.2}"),
                    font.clone(),
                    color::contrast_text(fill),
                );
            }
        }
    }

    if let Some(pointer) = response.hover_pos() {
        let rel = pointer - origin;
        if rel.x >= 0.0 && rel.y >= 0.0 {
            let (j, i) = ((rel.x / cell) as usize, (rel.y / cell) as usize);
            if i < k && j < k {
                let value = corr
                    .get(i, j)
                    .map_or("undefined (no variance)".to_string(), |v| format!("{v:.3}"));
                response.on_hover_text_at_pointer(format!(
                    "{} vs {}\nCorrelation: {value}",
                    corr.columns[i], corr.columns[j]
                ));
            }
        }
    }

    ui.label(
        egui::RichText::new("Check how temperature, humidity and other factors move with demand.")
            .small()
            .weak(),
    );
}
