//! About mode

use egui::RichText;

use super::{ModeWidget, WidgetSignal};

pub struct AboutWidget;

impl ModeWidget for AboutWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(env!("CARGO_PKG_NAME")).size(22.0).strong());
            ui.label(RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION"))).weak());
            ui.add_space(8.0);
            ui.label(env!("CARGO_PKG_DESCRIPTION"));
            ui.add_space(8.0);
            ui.label(RichText::new(format!("License: {}", env!("CARGO_PKG_LICENSE"))).small().weak());
        });
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        None
    }
}
