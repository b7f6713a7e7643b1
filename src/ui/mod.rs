use eframe::egui::{RichText, Ui};

pub mod heatmap;
pub mod panels;
pub mod plot;
pub mod table;

/// Placeholder shown instead of a chart when the filters leave nothing.
pub fn no_data(ui: &mut Ui, what: &str) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(what).italics().weak());
    });
    ui.add_space(24.0);
}

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One decimal, or an en dash for "no data".
pub fn decimal(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.1}"),
        None => "–".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(2_085_476), "2,085,476");
    }

    #[test]
    fn test_decimal() {
        assert_eq!(decimal(Some(191.5741)), "191.6");
        assert_eq!(decimal(None), "–");
    }
}
