//! Progress mode
//!
//! Reads stdin: a line that parses as a number sets the percentage, a line
//! starting with `#` replaces the caption.

use std::sync::mpsc::Receiver;

use tracing::debug;

use super::{drain, stdin_lines, ModeWidget, WidgetSignal};
use crate::config::DialogConfig;
use crate::response::ResultCode;

pub struct ProgressWidget {
    percent: u32,
    caption: Option<String>,
    pulsate: bool,
    auto_close: bool,
    input: Option<Receiver<String>>,
    done: bool,
}

impl ProgressWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let mut widget = Self::detached(config);
        widget.input = Some(stdin_lines());
        widget
    }

    /// Widget without a stdin reader
    pub fn detached(config: &DialogConfig) -> Self {
        let opts = &config.options.progress;
        Self {
            percent: opts.percentage.min(100),
            caption: None,
            pulsate: opts.pulsate,
            auto_close: opts.auto_close,
            input: None,
            done: false,
        }
    }

    /// Read lines from `input` instead of stdin
    pub fn with_input(mut self, input: Receiver<String>) -> Self {
        self.input = Some(input);
        self
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Apply one input line, true when the dialog should close now
    pub fn apply_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        if let Some(caption) = line.strip_prefix('#') {
            self.caption = Some(caption.trim().to_string());
            return false;
        }
        match line.parse::<f64>() {
            Ok(value) => {
                self.percent = value.clamp(0.0, 100.0) as u32;
                self.pulsate = false;
            }
            Err(_) => {
                debug!("Ignoring progress input {:?}", line);
                return false;
            }
        }
        self.percent >= 100 && self.auto_close && !self.done
    }
}

impl ModeWidget for ProgressWidget {
    fn poll(&mut self) -> WidgetSignal {
        let mut signal = WidgetSignal::None;
        for line in drain(self.input.as_ref()) {
            if self.apply_line(&line) {
                self.done = true;
                signal = WidgetSignal::Respond(ResultCode::OK);
            }
        }
        signal
    }

    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        let bar = if self.pulsate {
            egui::ProgressBar::new(0.0).animate(true)
        } else {
            egui::ProgressBar::new(self.percent as f32 / 100.0).show_percentage()
        };
        let bar = match &self.caption {
            Some(caption) => bar.text(caption.as_str()),
            None => bar,
        };
        ui.add(bar.desired_width(ui.available_width()));
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    #[test]
    fn test_input_lines() {
        let config = DialogConfig::new(Mode::Progress);
        let mut progress = ProgressWidget::detached(&config);
        assert!(!progress.apply_line("40"));
        assert_eq!(progress.percent(), 40);
        assert!(!progress.apply_line("# Copying files"));
        assert_eq!(progress.caption(), Some("Copying files"));
        assert!(!progress.apply_line("not a number"));
        assert_eq!(progress.percent(), 40);
        assert!(!progress.apply_line("250"));
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_auto_close_at_full() {
        let mut config = DialogConfig::new(Mode::Progress);
        config.options.progress.auto_close = true;
        let mut progress = ProgressWidget::detached(&config);
        assert!(!progress.apply_line("99.5"));
        assert!(progress.apply_line("100"));
        assert!(progress.result().is_none());
    }

    #[test]
    fn test_poll_reads_input_without_drawing() {
        let mut config = DialogConfig::new(Mode::Progress);
        config.options.progress.auto_close = true;
        let (tx, rx) = std::sync::mpsc::channel();
        let mut progress = ProgressWidget::detached(&config).with_input(rx);

        tx.send("# Working".to_string()).unwrap();
        tx.send("50".to_string()).unwrap();
        assert_eq!(progress.poll(), WidgetSignal::None);
        assert_eq!(progress.percent(), 50);
        assert_eq!(progress.caption(), Some("Working"));

        tx.send("100".to_string()).unwrap();
        assert_eq!(progress.poll(), WidgetSignal::Respond(ResultCode::OK));
        tx.send("100".to_string()).unwrap();
        assert_eq!(progress.poll(), WidgetSignal::None);
    }
}
