//! List mode
//!
//! Rows come from the extra data (grouped by the number of columns) or,
//! when there is none, from stdin one field per line. With `--checklist`
//! the first column is a check box holding `TRUE`/`FALSE`.

use std::collections::BTreeSet;
use std::sync::mpsc::Receiver;

use egui::RichText;
use egui_extras::{Column, TableBuilder};

use super::{drain, stdin_lines, terminated, ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

pub struct ListWidget {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Fields of a row still being read from stdin
    partial: Vec<String>,
    selected: BTreeSet<usize>,
    multiple: bool,
    checklist: bool,
    separator: String,
    input: Option<Receiver<String>>,
}

impl ListWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let mut widget = Self::with_rows(config, &config.common.extra);
        if config.common.extra.is_empty() {
            widget.input = Some(stdin_lines());
        }
        widget
    }

    pub fn with_rows(config: &DialogConfig, values: &[String]) -> Self {
        let columns = if config.options.columns.is_empty() {
            vec![String::new()]
        } else {
            config.options.columns.clone()
        };
        let mut widget = Self {
            columns,
            rows: Vec::new(),
            partial: Vec::new(),
            selected: BTreeSet::new(),
            multiple: config.options.file.multiple,
            checklist: config.options.checklist,
            separator: config.common.separator.clone(),
            input: None,
        };
        for value in values {
            widget.push_field(value.clone());
        }
        widget
    }

    /// Read further rows from `input`, one field per line
    pub fn with_input(mut self, input: Receiver<String>) -> Self {
        self.input = Some(input);
        self
    }

    pub fn push_field(&mut self, value: String) {
        self.partial.push(value);
        if self.partial.len() == self.columns.len() {
            let row = std::mem::take(&mut self.partial);
            self.rows.push(row);
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn select(&mut self, index: usize) {
        if index >= self.rows.len() {
            return;
        }
        if self.checklist {
            let cell = &mut self.rows[index][0];
            *cell = if is_checked(cell) { "FALSE" } else { "TRUE" }.to_string();
            return;
        }
        if self.multiple {
            if !self.selected.remove(&index) {
                self.selected.insert(index);
            }
        } else {
            self.selected.clear();
            self.selected.insert(index);
        }
    }

    fn is_row_selected(&self, index: usize) -> bool {
        if self.checklist {
            is_checked(&self.rows[index][0])
        } else {
            self.selected.contains(&index)
        }
    }
}

fn is_checked(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

impl ModeWidget for ListWidget {
    fn poll(&mut self) -> WidgetSignal {
        for line in drain(self.input.as_ref()) {
            self.push_field(line);
        }
        WidgetSignal::None
    }

    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        let mut clicked = None;
        let mut activated = false;

        TableBuilder::new(ui)
            .striped(true)
            .sense(egui::Sense::click())
            .columns(Column::auto().resizable(true), self.columns.len().saturating_sub(1))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for title in &self.columns {
                    header.col(|ui| {
                        ui.label(RichText::new(title).strong());
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, self.rows.len(), |mut row| {
                    let index = row.index();
                    row.set_selected(self.is_row_selected(index));
                    for (col, value) in self.rows[index].iter().enumerate() {
                        row.col(|ui| {
                            if self.checklist && col == 0 {
                                let mut checked = is_checked(value);
                                if ui.checkbox(&mut checked, "").clicked() {
                                    clicked = Some(index);
                                }
                            } else {
                                ui.label(value);
                            }
                        });
                    }
                    let response = row.response();
                    if response.clicked() {
                        clicked = Some(index);
                    }
                    if response.double_clicked() {
                        activated = true;
                    }
                });
            });

        if let Some(index) = clicked {
            self.select(index);
        }
        if activated {
            WidgetSignal::Activate
        } else {
            WidgetSignal::None
        }
    }

    fn result(&self) -> Option<String> {
        let mut out = String::new();
        for (index, row) in self.rows.iter().enumerate() {
            if self.is_row_selected(index) {
                out.push_str(&terminated(row, &self.separator));
                out.push('\n');
            }
        }
        Some(out)
    }
}
