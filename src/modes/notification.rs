//! Notification mode: a small clickable message window

use egui::{RichText, Sense};

use super::{ModeWidget, WidgetSignal};
use crate::config::DialogConfig;
use crate::response::ResultCode;

pub struct NotificationWidget {
    tooltip: Option<String>,
}

impl NotificationWidget {
    pub fn new(config: &DialogConfig) -> Self {
        Self {
            tooltip: config.common.text.clone(),
        }
    }
}

impl ModeWidget for NotificationWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        let response = ui
            .add(egui::Label::new(RichText::new("🔔").size(28.0)).sense(Sense::click()))
            .on_hover_cursor(egui::CursorIcon::PointingHand);
        let response = match &self.tooltip {
            Some(tip) => response.on_hover_text(tip),
            None => response,
        };
        if response.clicked() {
            WidgetSignal::Respond(ResultCode::OK)
        } else {
            WidgetSignal::None
        }
    }

    fn result(&self) -> Option<String> {
        None
    }
}
