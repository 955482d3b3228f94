//! Mode widgets
//!
//! Every dialog mode is one implementation of [`ModeWidget`]. The window
//! only knows this trait: it asks the widget to draw itself each frame and,
//! once the dialog is over, for its result text.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;

use crate::config::{DialogConfig, Mode};
use crate::emission::ProcessControl;
use crate::error::Result;
use crate::response::ResultCode;

pub mod about;
pub mod calendar;
pub mod color;
pub mod container;
pub mod dnd;
pub mod entry;
pub mod file;
pub mod font;
pub mod form;
pub mod html;
pub mod icons;
pub mod list;
pub mod message;
pub mod notification;
pub mod picture;
pub mod progress;
pub mod scale;
pub mod textinfo;

/// What a widget asks of the dialog after a frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WidgetSignal {
    #[default]
    None,
    /// Finish with the default response (Enter in an entry, double click in a list)
    Activate,
    /// Finish with a specific code
    Respond(ResultCode),
    /// Start a detached shell command
    Launch(String),
    /// Print a line to stdout right away, without ending the dialog
    Emit(String),
}

pub trait ModeWidget {
    /// Draw the widget for this frame
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal;

    /// Called every frame, also while the widget is collapsed or hidden
    fn poll(&mut self) -> WidgetSignal {
        WidgetSignal::None
    }

    /// Text printed on an approved exit, `None` when the mode prints nothing
    fn result(&self) -> Option<String>;

    /// File that an affirmative exit would overwrite
    fn overwrite_target(&self) -> Option<PathBuf> {
        None
    }

    /// Called once with the native handle of the realized top-level window
    fn realized(&mut self, _handle: u64) {}

    /// Release anything that outlives the window (embedded children)
    fn teardown(&mut self, _procs: &dyn ProcessControl) {}
}

/// Build the widget for `config.mode`.
///
/// Container modes block here until all their plug children have reported.
pub fn build(config: &DialogConfig) -> Result<Box<dyn ModeWidget>> {
    let widget: Box<dyn ModeWidget> = match config.mode {
        Mode::Message | Mode::Version | Mode::Print => Box::new(message::MessageWidget),
        Mode::Calendar => Box::new(calendar::CalendarWidget::new(config)),
        Mode::Color => Box::new(color::ColorWidget::new(config)),
        Mode::Entry => Box::new(entry::EntryWidget::new(config)),
        Mode::File => Box::new(file::FileWidget::new(config)),
        Mode::Font => Box::new(font::FontWidget::new(config)),
        Mode::Form => Box::new(form::FormWidget::new(config)),
        Mode::Html => Box::new(html::HtmlWidget::new(config)),
        Mode::Icons => Box::new(icons::IconsWidget::new(config)),
        Mode::List => Box::new(list::ListWidget::new(config)),
        Mode::Notebook | Mode::Paned => Box::new(container::ContainerWidget::open(config)?),
        Mode::Picture => Box::new(picture::PictureWidget::new(config)),
        Mode::Progress => Box::new(progress::ProgressWidget::new(config)),
        Mode::Scale => Box::new(scale::ScaleWidget::new(config)),
        Mode::TextInfo => Box::new(textinfo::TextInfoWidget::new(config)),
        Mode::DragAndDrop => Box::new(dnd::DndWidget::new(config)),
        Mode::About => Box::new(about::AboutWidget),
        Mode::Notification => Box::new(notification::NotificationWidget::new(config)),
    };
    Ok(widget)
}

/// Read stdin line by line on a background thread
pub(crate) fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Everything queued on a line channel so far
pub(crate) fn drain(input: Option<&mpsc::Receiver<String>>) -> Vec<String> {
    input.map(|rx| rx.try_iter().collect()).unwrap_or_default()
}

/// Join values, terminating each one with `separator`
pub(crate) fn terminated<I, S>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for value in values {
        out.push_str(value.as_ref());
        out.push_str(separator);
    }
    out
}
