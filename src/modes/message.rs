//! Message mode: image, text and buttons, no widget of its own

use super::{ModeWidget, WidgetSignal};

pub struct MessageWidget;

impl ModeWidget for MessageWidget {
    fn show(&mut self, _ui: &mut egui::Ui) -> WidgetSignal {
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        None
    }
}
