//! Font mode

use egui::{FontFamily, FontId, RichText};

use super::{ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

const FAMILIES: [&str; 2] = ["Sans", "Monospace"];
const DEFAULT_SIZE: f32 = 12.0;

pub struct FontWidget {
    family: String,
    size: f32,
    preview: String,
}

impl FontWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let (family, size) = config
            .options
            .font
            .as_deref()
            .map(parse_font_name)
            .unwrap_or_else(|| (FAMILIES[0].to_string(), DEFAULT_SIZE));
        Self {
            family,
            size,
            preview: "The quick brown fox jumps over the lazy dog".to_string(),
        }
    }

    fn egui_family(&self) -> FontFamily {
        if self.family.to_lowercase().contains("mono") {
            FontFamily::Monospace
        } else {
            FontFamily::Proportional
        }
    }

    fn preview_font(&self) -> FontId {
        FontId::new(self.size, self.egui_family())
    }
}

/// Split `"Family Name 12"` into family and size
pub fn parse_font_name(name: &str) -> (String, f32) {
    let name = name.trim();
    match name.rsplit_once(' ') {
        Some((family, size)) => match size.parse::<f32>() {
            Ok(size) if size > 0.0 => (family.trim().to_string(), size),
            _ => (name.to_string(), DEFAULT_SIZE),
        },
        None if !name.is_empty() => (name.to_string(), DEFAULT_SIZE),
        None => (FAMILIES[0].to_string(), DEFAULT_SIZE),
    }
}

impl ModeWidget for FontWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("font_family")
                .selected_text(self.family.as_str())
                .show_ui(ui, |ui| {
                    for family in FAMILIES {
                        ui.selectable_value(&mut self.family, family.to_string(), family);
                    }
                });
            ui.add(egui::DragValue::new(&mut self.size).range(4.0..=96.0).speed(0.5));
        });
        ui.add_space(8.0);
        let font = self.preview_font();
        ui.add(egui::TextEdit::singleline(&mut self.preview).font(font));
        ui.label(RichText::new(format!("{} {}", self.family, self.size)).weak().small());
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        Some(format!("{} {}", self.family, self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    #[test]
    fn test_parse_font_name() {
        assert_eq!(parse_font_name("DejaVu Sans Mono 10"), ("DejaVu Sans Mono".to_string(), 10.0));
        assert_eq!(parse_font_name("Serif"), ("Serif".to_string(), DEFAULT_SIZE));
        assert_eq!(parse_font_name("Noto Sans Bold"), ("Noto Sans Bold".to_string(), DEFAULT_SIZE));
    }

    #[test]
    fn test_result_format() {
        let mut config = DialogConfig::new(Mode::Font);
        config.options.font = Some("Monospace 14".into());
        assert_eq!(FontWidget::new(&config).result().as_deref(), Some("Monospace 14"));
        assert_eq!(FontWidget::new(&DialogConfig::new(Mode::Font)).result().as_deref(), Some("Sans 12"));
    }

    #[test]
    fn test_preview_renders_chosen_font() {
        let mut config = DialogConfig::new(Mode::Font);
        config.options.font = Some("DejaVu Sans Mono 18".into());
        let mut font = FontWidget::new(&config);
        assert_eq!(font.preview_font(), FontId::new(18.0, FontFamily::Monospace));

        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                assert_eq!(font.show(ui), WidgetSignal::None);
            });
        });
        assert_eq!(font.result().as_deref(), Some("DejaVu Sans Mono 18"));
    }
}
