//! Color mode

use egui::Color32;
use tracing::warn;

use super::{ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

pub struct ColorWidget {
    color: Color32,
}

impl ColorWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let color = match config.options.color.as_deref() {
            Some(spec) => parse_color(spec).unwrap_or_else(|| {
                warn!("Unrecognized color {:?}, starting from white", spec);
                Color32::WHITE
            }),
            None => Color32::WHITE,
        };
        Self { color }
    }
}

/// `#rgb` or `#rrggbb`, the hash is optional
pub fn parse_color(spec: &str) -> Option<Color32> {
    let hex = spec.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(Color32::from_rgb(rgb[0], rgb[1], rgb[2]))
        }
        6 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            Some(Color32::from_rgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
        }
        _ => None,
    }
}

impl ModeWidget for ColorWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        egui::widgets::color_picker::color_picker_color32(
            ui,
            &mut self.color,
            egui::widgets::color_picker::Alpha::Opaque,
        );
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        let [r, g, b, _] = self.color.to_array();
        Some(format!("#{r:02x}{g:02x}{b:02x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000"), Some(Color32::from_rgb(255, 128, 0)));
        assert_eq!(parse_color("0af"), Some(Color32::from_rgb(0, 170, 255)));
        assert_eq!(parse_color("red"), None);
        assert_eq!(parse_color("#12345"), None);
    }

    #[test]
    fn test_result_format() {
        let mut config = DialogConfig::new(Mode::Color);
        config.options.color = Some("#1A2b3C".into());
        assert_eq!(ColorWidget::new(&config).result().as_deref(), Some("#1a2b3c"));
    }
}
