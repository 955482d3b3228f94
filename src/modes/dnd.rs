//! Drag and drop mode
//!
//! Every dropped path is printed immediately, or handed to `--command`.

use std::collections::VecDeque;
use std::path::Path;

use egui::{RichText, Stroke};

use super::{ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

pub struct DndWidget {
    command: Option<String>,
    tooltip: Option<String>,
    pending: VecDeque<WidgetSignal>,
}

impl DndWidget {
    pub fn new(config: &DialogConfig) -> Self {
        Self {
            command: config.options.command.clone(),
            tooltip: config
                .options
                .tooltip
                .then(|| config.common.text.clone())
                .flatten(),
            pending: VecDeque::new(),
        }
    }

    /// Queue what has to happen for one dropped item
    pub fn dropped(&mut self, item: &str) {
        let signal = match &self.command {
            Some(cmd) => WidgetSignal::Launch(format!("{cmd} {}", shell_quote(item))),
            None => WidgetSignal::Emit(item.to_string()),
        };
        self.pending.push_back(signal);
    }

    pub fn next_signal(&mut self) -> WidgetSignal {
        self.pending.pop_front().unwrap_or_default()
    }
}

pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn dropped_name(path: Option<&Path>, name: &str) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => name.to_string(),
    }
}

impl ModeWidget for DndWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        let items: Vec<String> = ui.ctx().input(|i| {
            i.raw
                .dropped_files
                .iter()
                .map(|f| dropped_name(f.path.as_deref(), &f.name))
                .collect()
        });
        for item in &items {
            self.dropped(item);
        }

        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let (rect, response) = ui.allocate_exact_size(egui::vec2(ui.available_width().max(160.0), 120.0), egui::Sense::hover());
        let stroke_color = if hovering {
            ui.visuals().selection.stroke.color
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };
        ui.painter().rect_stroke(rect, egui::CornerRadius::same(8), Stroke::new(1.5, stroke_color), egui::StrokeKind::Inside);
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Drop files here",
            egui::FontId::proportional(14.0),
            ui.visuals().weak_text_color(),
        );
        if let Some(tip) = &self.tooltip {
            response.on_hover_text(RichText::new(tip));
        }

        if !self.pending.is_empty() {
            ui.ctx().request_repaint();
        }
        self.next_signal()
    }

    fn result(&self) -> Option<String> {
        None
    }
}
