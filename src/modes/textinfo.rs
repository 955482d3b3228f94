//! Text info mode

use std::sync::mpsc::Receiver;

use tracing::warn;

use super::{drain, stdin_lines, ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

pub struct TextInfoWidget {
    text: String,
    editable: bool,
    input: Option<Receiver<String>>,
}

impl TextInfoWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let (text, input) = match &config.options.file.filename {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(text) => (text, None),
                Err(e) => {
                    warn!("Unable to read {:?}: {}", path, e);
                    (String::new(), None)
                }
            },
            None => (String::new(), Some(stdin_lines())),
        };
        Self {
            text,
            editable: config.options.editable,
            input,
        }
    }
}

impl ModeWidget for TextInfoWidget {
    fn poll(&mut self) -> WidgetSignal {
        for line in drain(self.input.as_ref()) {
            self.text.push_str(&line);
            self.text.push('\n');
        }
        WidgetSignal::None
    }

    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        egui::ScrollArea::vertical()
            .id_salt("text_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.text)
                        .interactive(self.editable)
                        .desired_width(f32::INFINITY)
                        .code_editor(),
                );
            });
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        Some(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    #[test]
    fn test_text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let mut config = DialogConfig::new(Mode::TextInfo);
        config.options.file.filename = Some(path);
        assert_eq!(
            TextInfoWidget::new(&config).result().as_deref(),
            Some("line one\nline two\n")
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let mut config = DialogConfig::new(Mode::TextInfo);
        config.options.file.filename = Some("/nonexistent/notes.txt".into());
        assert_eq!(TextInfoWidget::new(&config).result().as_deref(), Some(""));
    }

    #[test]
    fn test_input_appended_on_poll() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut widget = TextInfoWidget {
            text: String::new(),
            editable: false,
            input: Some(rx),
        };
        tx.send("first".to_string()).unwrap();
        tx.send("second".to_string()).unwrap();
        widget.poll();
        assert_eq!(widget.result().as_deref(), Some("first\nsecond\n"));
    }
}
