//! Notebook and paned containers
//!
//! The container creates the slot table, waits for every plug child to
//! publish its window, and once its own window exists reparents the
//! children into it. Each frame the children are moved over the area the
//! container reserved in the layout.

use egui::{Rect, RichText};
use tracing::{debug, warn};

use super::{ModeWidget, WidgetSignal};
use crate::config::{DialogConfig, Mode, Orientation};
use crate::embed::{ChildArea, Embedder};
use crate::emission::ProcessControl;
use crate::error::{DialogError, Result};
use crate::plug::{ChildSlot, SharedSegment, SlotTable};

/// Paned containers always hold two children
const PANED_CHILDREN: usize = 2;

pub struct ContainerWidget {
    notebook: bool,
    labels: Vec<String>,
    orientation: Orientation,
    table: SlotTable<SharedSegment>,
    children: Vec<ChildSlot>,
    embedder: Option<Embedder>,
    active: usize,
    placed: Vec<Option<ChildArea>>,
}

impl ContainerWidget {
    pub fn open(config: &DialogConfig) -> Result<Self> {
        let key = config
            .embed
            .key
            .ok_or_else(|| DialogError::invalid("key", "notebook and paned dialogs need a key"))?;
        let notebook = config.mode == Mode::Notebook;
        let count = if notebook {
            config.embed.tabs.len()
        } else {
            PANED_CHILDREN
        };

        let table = SlotTable::create(key, config.embed.max_tab, count, std::process::id() as i32)?;
        debug!("Container key {} waiting for {} children", key, count);
        let children = table.wait_children(config.embed.wait)?;

        Ok(Self {
            notebook,
            labels: tab_labels(&config.embed.tabs, count),
            orientation: config.embed.orientation,
            placed: vec![None; children.len()],
            table,
            children,
            embedder: None,
            active: 0,
        })
    }

    fn place(&mut self, index: usize, area: Option<ChildArea>) {
        if self.placed[index] == area {
            return;
        }
        let Some(embedder) = &self.embedder else { return };
        let child = self.children[index].handle;
        let result = match area {
            Some(area) => embedder.place(child, area),
            None => embedder.hide(child),
        };
        match result {
            Ok(()) => self.placed[index] = area,
            Err(e) => warn!("Unable to place plug {}: {}", index + 1, e),
        }
    }
}

/// Tab captions, `Tab N` for children without one
pub fn tab_labels(tabs: &[String], count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match tabs.get(i) {
            Some(label) if !label.is_empty() => label.replace('_', ""),
            _ => format!("Tab {}", i + 1),
        })
        .collect()
}

/// Split the container area between two panes
pub fn split(rect: Rect, orientation: Orientation) -> [Rect; 2] {
    match orientation {
        Orientation::Horizontal => {
            let mid = rect.center().x;
            [
                Rect::from_min_max(rect.min, egui::pos2(mid, rect.max.y)),
                Rect::from_min_max(egui::pos2(mid, rect.min.y), rect.max),
            ]
        }
        Orientation::Vertical => {
            let mid = rect.center().y;
            [
                Rect::from_min_max(rect.min, egui::pos2(rect.max.x, mid)),
                Rect::from_min_max(egui::pos2(rect.min.x, mid), rect.max),
            ]
        }
    }
}

impl ModeWidget for ContainerWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        if self.notebook {
            ui.horizontal(|ui| {
                for (i, label) in self.labels.iter().enumerate() {
                    if ui.selectable_label(self.active == i, RichText::new(label)).clicked() {
                        self.active = i;
                    }
                }
            });
            ui.separator();
        }

        let size = ui.available_size().max(egui::vec2(200.0, 120.0));
        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        let ppp = ui.ctx().pixels_per_point();

        if self.notebook {
            for i in 0..self.children.len() {
                let area = (i == self.active).then(|| ChildArea::from_rect(rect, ppp));
                self.place(i, area);
            }
        } else {
            let panes = split(rect, self.orientation);
            for i in 0..self.children.len().min(PANED_CHILDREN) {
                self.place(i, Some(ChildArea::from_rect(panes[i], ppp)));
            }
        }
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        None
    }

    fn realized(&mut self, handle: u64) {
        let embedder = match Embedder::connect(handle) {
            Ok(embedder) => embedder,
            Err(e) => {
                warn!("Unable to embed plug children: {}", e);
                return;
            }
        };
        for child in &self.children {
            if let Err(e) = embedder.adopt(child.handle) {
                warn!("Unable to adopt plug {} (0x{:X}): {}", child.tabnum, child.handle, e);
            }
        }
        self.embedder = Some(embedder);
    }

    fn teardown(&mut self, procs: &dyn ProcessControl) {
        self.table.teardown(&self.children, procs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_labels() {
        let tabs = vec!["_General".to_string(), String::new()];
        assert_eq!(tab_labels(&tabs, 3), ["General", "Tab 2", "Tab 3"]);
    }

    #[test]
    fn test_split() {
        let rect = Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(200.0, 100.0));
        let [a, b] = split(rect, Orientation::Horizontal);
        assert_eq!(a.width(), 100.0);
        assert_eq!(b.min.x, 100.0);

        let [a, b] = split(rect, Orientation::Vertical);
        assert_eq!(a.height(), 50.0);
        assert_eq!(b.max.y, 100.0);
    }
}
