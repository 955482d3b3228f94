//! Icons mode: a grid of launchers

use egui::{RichText, Vec2};

use super::{ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconItem {
    pub name: String,
    pub tooltip: String,
    pub command: String,
}

pub struct IconsWidget {
    items: Vec<IconItem>,
}

/// Group the extra data into `name, tooltip, command` triples, dropping a short tail
pub fn parse_items(values: &[String]) -> Vec<IconItem> {
    values
        .chunks_exact(3)
        .map(|chunk| IconItem {
            name: chunk[0].clone(),
            tooltip: chunk[1].clone(),
            command: chunk[2].clone(),
        })
        .collect()
}

impl IconsWidget {
    pub fn new(config: &DialogConfig) -> Self {
        Self {
            items: parse_items(&config.common.extra),
        }
    }
}

impl ModeWidget for IconsWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        let mut signal = WidgetSignal::None;
        ui.horizontal_wrapped(|ui| {
            for item in &self.items {
                let button = egui::Button::new(RichText::new(&item.name).size(13.0)).min_size(Vec2::new(96.0, 48.0));
                let mut response = ui.add(button);
                if !item.tooltip.is_empty() {
                    response = response.on_hover_text(&item.tooltip);
                }
                if response.clicked() && !item.command.is_empty() {
                    signal = WidgetSignal::Launch(item.command.clone());
                }
            }
        });
        signal
    }

    fn result(&self) -> Option<String> {
        None
    }
}
