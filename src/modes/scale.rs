//! Scale mode

use super::{ModeWidget, WidgetSignal};
use crate::config::DialogConfig;

pub struct ScaleWidget {
    value: i64,
    min: i64,
    max: i64,
    step: i64,
}

impl ScaleWidget {
    pub fn new(config: &DialogConfig) -> Self {
        let opts = &config.options.scale;
        let (min, max) = if opts.min <= opts.max {
            (opts.min, opts.max)
        } else {
            (opts.max, opts.min)
        };
        Self {
            value: opts.value.clamp(min, max),
            min,
            max,
            step: opts.step.max(1),
        }
    }
}

impl ModeWidget for ScaleWidget {
    fn show(&mut self, ui: &mut egui::Ui) -> WidgetSignal {
        ui.spacing_mut().slider_width = ui.available_width() - 60.0;
        ui.add(
            egui::Slider::new(&mut self.value, self.min..=self.max)
                .step_by(self.step as f64)
                .integer(),
        );
        WidgetSignal::None
    }

    fn result(&self) -> Option<String> {
        Some(self.value.to_string())
    }
}
