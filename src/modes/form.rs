//! Form mode
//!
//! Fields are declared as `LABEL[:TYPE]`, initial values come from the extra
//! data in the same order. Combo box values are split on the item separator
//! and a leading `^` marks the preselected entry.

use egui::RichText;

use super::{terminated, ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Hidden,
    ReadOnly,
    Numeric,
    Check,
    Combo,
    MultiLine,
    Label,
}

impl FieldKind {
    fn parse(tag: &str) -> Self {
        match tag {
            "H" => Self::Hidden,
            "RO" => Self::ReadOnly,
            "NUM" => Self::Numeric,
            "CHK" => Self::Check,
            "CB" | "CBE" => Self::Combo,
            "TXT" => Self::MultiLine,
            "LBL" => Self::Label,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(String),
    Number(i64),
    Check(bool),
    Choice { items: Vec<String>, selected: usize },
    None,
}

#[derive(Debug, Clone)]
struct Field {
    label: String,
    kind: FieldKind,
    value: FieldValue,
}

pub struct FormWidget {
    fields: Vec<Field>,
    separator: String,
}

/// Split `LABEL[:TYPE]`; only a known type tag after the last colon counts
pub fn parse_field(spec: &str) -> (String, FieldKind) {
    match spec.rsplit_once(':') {
        Some((label, tag)) if tag.chars().all(|c| c.is_ascii_uppercase()) && !tag.is_empty() => {
            (label.to_string(), FieldKind::parse(tag))
        }
        _ => (spec.to_string(), FieldKind::Text),
    }
}

impl FormWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let item_sep = config.common.item_separator.as_str();
        let fields = config
            .options
            .fields
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let (label, kind) = parse_field(spec);
                let initial = config.common.extra.get(i).map(String::as_str).unwrap_or("");
                Field {
                    label: label.replace('_', ""),
                    kind,
                    value: initial_value(kind, initial, item_sep),
                }
            })
            .collect();
        Self {
            fields,
            separator: config.common.separator.clone(),
        }
    }
}

fn initial_value(kind: FieldKind, initial: &str, item_sep: &str) -> FieldValue {
    match kind {
        FieldKind::Label => FieldValue::None,
        FieldKind::Check => FieldValue::Check(initial.eq_ignore_ascii_case("true")),
        FieldKind::Numeric => {
            let first = initial.split(item_sep).next().unwrap_or("");
            FieldValue::Number(first.trim().parse::<f64>().map(|v| v as i64).unwrap_or(0))
        }
        FieldKind::Combo => {
            let mut selected = 0;
            let items = initial
                .split(item_sep)
                .filter(|s| !s.is_empty())
                .enumerate()
                .map(|(i, item)| match item.strip_prefix('^') {
                    Some(item) => {
                        selected = i;
                        item.to_string()
                    }
                    None => item.to_string(),
                })
                .collect();
            FieldValue::Choice { items, selected }
        }
        _ => FieldValue::Text(initial.to_string()),
    }
}

impl ModeWidget for FormWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        egui::Grid::new("form_grid")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for (index, field) in self.fields.iter_mut().enumerate() {
                    if field.kind == FieldKind::Label {
                        ui.label(RichText::new(&field.label).strong());
                        ui.end_row();
                        continue;
                    }
                    ui.label(&field.label);
                    match (&mut field.value, field.kind) {
                        (FieldValue::Text(text), FieldKind::MultiLine) => {
                            ui.add(egui::TextEdit::multiline(text).desired_rows(4));
                        }
                        (FieldValue::Text(text), kind) => {
                            ui.add(
                                egui::TextEdit::singleline(text)
                                    .password(kind == FieldKind::Hidden)
                                    .interactive(kind != FieldKind::ReadOnly),
                            );
                        }
                        (FieldValue::Number(n), _) => {
                            ui.add(egui::DragValue::new(n));
                        }
                        (FieldValue::Check(checked), _) => {
                            ui.checkbox(checked, "");
                        }
                        (FieldValue::Choice { items, selected }, _) => {
                            let current = items.get(*selected).cloned().unwrap_or_default();
                            egui::ComboBox::from_id_salt(("form_combo", index))
                                .selected_text(current)
                                .show_ui(ui, |ui| {
                                    for (i, item) in items.iter().enumerate() {
                                        ui.selectable_value(selected, i, item);
                                    }
                                });
                        }
                        (FieldValue::None, _) => {}
                    }
                    ui.end_row();
                }
            });
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        let values = self.fields.iter().map(|field| match &field.value {
            FieldValue::Text(text) => text.replace('\n', "\\n"),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Check(true) => "TRUE".to_string(),
            FieldValue::Check(false) => "FALSE".to_string(),
            FieldValue::Choice { items, selected } => items.get(*selected).cloned().unwrap_or_default(),
            FieldValue::None => String::new(),
        });
        Some(terminated(values, &self.separator))
    }
}
