//! Calendar mode

use chrono::{Datelike, Local, Months, NaiveDate, Weekday};
use egui::RichText;

use super::{ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

const DEFAULT_FORMAT: &str = "%x";

pub struct CalendarWidget {
    selected: NaiveDate,
    /// First day of the month on display
    shown: NaiveDate,
    format: String,
}

impl CalendarWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let opts = &config.options.calendar;
        let today = Local::now().date_naive();
        let selected = initial_date(today, opts.year, opts.month, opts.day);
        let format = if opts.date_format.is_empty() {
            DEFAULT_FORMAT.to_string()
        } else {
            opts.date_format.clone()
        };
        Self {
            selected,
            shown: first_of_month(selected),
            format,
        }
    }
}

/// Today with any given parts replaced; impossible dates fall back to today
pub fn initial_date(today: NaiveDate, year: Option<i32>, month: Option<u32>, day: Option<u32>) -> NaiveDate {
    NaiveDate::from_ymd_opt(
        year.unwrap_or(today.year()),
        month.unwrap_or(today.month()),
        day.unwrap_or(today.day()),
    )
    .unwrap_or(today)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

impl ModeWidget for CalendarWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        let mut signal = WidgetSignal::None;

        ui.horizontal(|ui| {
            if ui.button("◀").clicked() {
                if let Some(prev) = self.shown.checked_sub_months(Months::new(1)) {
                    self.shown = prev;
                }
            }
            ui.label(RichText::new(self.shown.format("%B %Y").to_string()).strong());
            if ui.button("▶").clicked() {
                if let Some(next) = self.shown.checked_add_months(Months::new(1)) {
                    self.shown = next;
                }
            }
        });

        egui::Grid::new("calendar_grid").spacing([4.0, 4.0]).show(ui, |ui| {
            for wd in ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"] {
                ui.label(RichText::new(wd).weak());
            }
            ui.end_row();

            let offset = self.shown.weekday().num_days_from_monday();
            for _ in 0..offset {
                ui.label("");
            }

            let mut day = self.shown;
            while day.month() == self.shown.month() {
                let is_selected = day == self.selected;
                let response = ui.selectable_label(is_selected, format!("{:>2}", day.day()));
                if response.clicked() {
                    self.selected = day;
                }
                if response.double_clicked() {
                    self.selected = day;
                    signal = WidgetSignal::Activate;
                }
                if day.weekday() == Weekday::Sun {
                    ui.end_row();
                }
                match day.succ_opt() {
                    Some(next) => day = next,
                    None => break,
                }
            }
        });

        signal
    }

    fn result(&self) -> Option<String> {
        Some(self.selected.format(&self.format).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    #[test]
    fn test_initial_date_overrides() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(initial_date(today, None, None, None), today);
        assert_eq!(
            initial_date(today, Some(2020), None, Some(1)),
            NaiveDate::from_ymd_opt(2020, 5, 1).unwrap()
        );
        assert_eq!(initial_date(today, None, Some(2), Some(30)), today);
    }

    #[test]
    fn test_result_uses_date_format() {
        let mut config = DialogConfig::new(Mode::Calendar);
        config.options.calendar.year = Some(2023);
        config.options.calendar.month = Some(12);
        config.options.calendar.day = Some(24);
        config.options.calendar.date_format = "%Y-%m-%d".into();
        assert_eq!(CalendarWidget::new(&config).result().as_deref(), Some("2023-12-24"));
    }
}
