//! Entry mode

use egui::RichText;

use super::{ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

pub struct EntryWidget {
    label: Option<String>,
    text: String,
    hide_text: bool,
    /// Predefined values from the extra data, shown as a combo box
    choices: Vec<String>,
    editable: bool,
    focused: bool,
}

impl EntryWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let opts = &config.options.entry;
        let choices = config.common.extra.clone();
        let text = if opts.text.is_empty() {
            choices.first().cloned().unwrap_or_default()
        } else {
            opts.text.clone()
        };
        Self {
            label: opts.label.clone(),
            text,
            hide_text: opts.hide_text,
            choices,
            editable: config.options.editable,
            focused: false,
        }
    }
}

impl ModeWidget for EntryWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        let mut signal = WidgetSignal::None;

        ui.horizontal(|ui| {
            if let Some(label) = &self.label {
                ui.label(RichText::new(label).strong());
            }

            if !self.choices.is_empty() && !self.editable {
                egui::ComboBox::from_id_salt("entry_choices")
                    .selected_text(self.text.as_str())
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        for choice in &self.choices {
                            ui.selectable_value(&mut self.text, choice.clone(), choice);
                        }
                    });
                return;
            }

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.text)
                    .password(self.hide_text)
                    .desired_width(f32::INFINITY),
            );
            if !self.focused {
                response.request_focus();
                self.focused = true;
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                signal = WidgetSignal::Activate;
            }

            if !self.choices.is_empty() {
                egui::ComboBox::from_id_salt("entry_choices")
                    .selected_text("")
                    .width(24.0)
                    .show_ui(ui, |ui| {
                        for choice in &self.choices {
                            ui.selectable_value(&mut self.text, choice.clone(), choice);
                        }
                    });
            }
        });

        signal
    }

    fn result(&self) -> Option<String> {
        Some(self.text.clone())
    }
}
