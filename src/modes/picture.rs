//! Picture mode

use std::path::PathBuf;

use tracing::warn;

use super::{ModeWidget, WidgetSignal};
use crate::config::{DialogConfig, PictureSize};

pub struct PictureWidget {
    path: Option<PathBuf>,
    size: PictureSize,
}

impl PictureWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let path = config.options.file.filename.clone();
        match &path {
            Some(p) if !p.exists() => warn!("Picture {:?} not found", p),
            None => warn!("No picture given"),
            _ => {}
        }
        Self {
            path: path.filter(|p| p.exists()),
            size: config.options.picture_size,
        }
    }
}

impl ModeWidget for PictureWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        let Some(path) = &self.path else {
            return WidgetSignal::None;
        };
        let image = egui::Image::new(format!("file://{}", path.display()));
        match self.size {
            PictureSize::Fit => {
                ui.add(image.max_size(ui.available_size()).maintain_aspect_ratio(true));
            }
            PictureSize::Orig => {
                egui::ScrollArea::both().show(ui, |ui| {
                    ui.add(image.fit_to_original_size(1.0));
                });
            }
        }
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        None
    }
}
