//! Html mode: a markdown document from a file or stdin

use std::sync::mpsc::Receiver;

use egui_commonmark::{CommonMarkCache, CommonMarkViewer};
use tracing::warn;

use super::{drain, stdin_lines, ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

pub struct HtmlWidget {
    document: String,
    cache: CommonMarkCache,
    input: Option<Receiver<String>>,
}

impl HtmlWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let (document, input) = match &config.options.uri {
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
            document,
            cache: CommonMarkCache::default(),
            input,
        }
    }
}

impl ModeWidget for HtmlWidget {
    fn poll(&mut self) -> WidgetSignal {
        for line in drain(self.input.as_ref()) {
            self.document.push_str(&line);
            self.document.push('\n');
        }
        WidgetSignal::None
    }

    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        egui::ScrollArea::vertical()
            .id_salt("html_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                CommonMarkViewer::new().show(ui, &mut self.cache, &self.document);
            });
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        None
    }
}
