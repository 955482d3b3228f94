//! File mode: a small file browser drawn inside the dialog

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use egui::RichText;
use tracing::warn;

use super::{ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Listing {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

pub struct FileWidget {
    cwd: PathBuf,
    entries: Vec<Listing>,
    /// Typed file name (save mode) or location
    name: String,
    selected: BTreeSet<PathBuf>,
    multiple: bool,
    directory: bool,
    save: bool,
    separator: String,
}

impl FileWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let opts = &config.options.file;
        let start = opts.filename.clone().unwrap_or_default();
        let (cwd, name) = split_start(&start);
        let mut widget = Self {
            cwd,
            entries: Vec::new(),
            name,
            selected: BTreeSet::new(),
            multiple: opts.multiple,
            directory: opts.directory,
            save: opts.save,
            separator: config.common.separator.clone(),
        };
        widget.refresh();
        widget
    }

    fn refresh(&mut self) {
        self.entries = match read_listing(&self.cwd, self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Unable to list {:?}: {}", self.cwd, e);
                Vec::new()
            }
        };
    }

    fn enter(&mut self, dir: PathBuf) {
        self.cwd = dir;
        self.selected.clear();
        self.refresh();
    }

    fn toggle(&mut self, path: PathBuf) {
        if self.multiple {
            if !self.selected.remove(&path) {
                self.selected.insert(path);
            }
        } else {
            self.selected.clear();
            self.selected.insert(path);
        }
    }

    /// Double click: the entry ends up selected, whatever the first click did
    fn choose(&mut self, path: PathBuf) {
        if self.save {
            self.take_name(&path);
        } else if !self.selected.contains(&path) {
            self.toggle(path);
        }
    }

    fn take_name(&mut self, path: &Path) {
        if let Some(name) = path.file_name() {
            self.name = name.to_string_lossy().into_owned();
        }
    }

    /// Path built from the typed name, relative names resolve against the current directory
    fn typed_path(&self) -> Option<PathBuf> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let path = Path::new(name);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        })
    }

    fn chosen(&self) -> Vec<PathBuf> {
        if self.save {
            return self.typed_path().into_iter().collect();
        }
        if !self.selected.is_empty() {
            return self.selected.iter().cloned().collect();
        }
        if let Some(path) = self.typed_path() {
            return vec![path];
        }
        if self.directory {
            return vec![self.cwd.clone()];
        }
        Vec::new()
    }
}

/// Starting directory and file name from `--filename`
fn split_start(start: &Path) -> (PathBuf, String) {
    let fallback = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    if start.as_os_str().is_empty() {
        return (fallback(), String::new());
    }
    if start.is_dir() {
        return (start.to_path_buf(), String::new());
    }
    let name = start
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = match start.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => fallback(),
    };
    (dir, name)
}

fn read_listing(dir: &Path, dirs_only: bool) -> std::io::Result<Vec<Listing>> {
    let mut entries: Vec<Listing> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                return None;
            }
            let is_dir = e.path().is_dir();
            (is_dir || !dirs_only).then(|| Listing {
                name,
                path: e.path(),
                is_dir,
            })
        })
        .collect();
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

impl ModeWidget for FileWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        let mut signal = WidgetSignal::None;
        let mut navigate = None;
        let mut toggled = None;
        let mut activated = None;

        ui.horizontal(|ui| {
            if ui.button("⬆").on_hover_text("Parent folder").clicked() {
                navigate = self.cwd.parent().map(Path::to_path_buf);
            }
            ui.label(RichText::new(self.cwd.display().to_string()).monospace());
        });

        egui::ScrollArea::vertical()
            .id_salt("file_scroll")
            .max_height(280.0)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in &self.entries {
                    let icon = if entry.is_dir { "📁" } else { "📄" };
                    let response = ui.selectable_label(
                        self.selected.contains(&entry.path),
                        format!("{icon} {}", entry.name),
                    );
                    if response.double_clicked() {
                        if entry.is_dir && !self.directory {
                            navigate = Some(entry.path.clone());
                        } else {
                            activated = Some(entry.path.clone());
                            signal = WidgetSignal::Activate;
                        }
                    } else if response.clicked() {
                        toggled = Some(entry.path.clone());
                    }
                }
            });

        ui.horizontal(|ui| {
            ui.label(if self.save { "Name:" } else { "Location:" });
            let response = ui.add(egui::TextEdit::singleline(&mut self.name).desired_width(f32::INFINITY));
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                signal = WidgetSignal::Activate;
            }
        });

        if let Some(path) = toggled {
            if self.save {
                self.take_name(&path);
            } else {
                self.toggle(path);
            }
        }
        if let Some(path) = activated {
            self.choose(path);
        }
        if let Some(dir) = navigate {
            self.enter(dir);
            signal = WidgetSignal::None;
        }

        signal
    }

    fn result(&self) -> Option<String> {
        let paths: Vec<String> = self.chosen().iter().map(|p| p.display().to_string()).collect();
        Some(paths.join(&self.separator))
    }

    fn overwrite_target(&self) -> Option<PathBuf> {
        if self.save {
            self.typed_path()
        } else {
            None
        }
    }
}
