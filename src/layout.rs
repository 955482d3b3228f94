//! Layout composer
//!
//! Arranges the optional image, text label and mode widget into one region
//! tree. Missing parts are simply left out.

/// Which parts a dialog has
#[derive(Debug, Clone, Default)]
pub struct LayoutParts {
    pub image: bool,
    pub label: bool,
    pub widget: bool,
    /// Caption of the disclosure wrapping the widget
    pub expander: Option<String>,
    pub image_on_top: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    Image,
    Label,
    /// The mode widget, inside a collapsed disclosure when `expander` is set
    Widget { expander: Option<String> },
    Row(Vec<Region>),
    Column(Vec<Region>),
}

pub fn compose(parts: &LayoutParts) -> Option<Region> {
    let image = parts.image.then_some(Region::Image);
    let label = parts.label.then_some(Region::Label);
    let widget = parts.widget.then(|| Region::Widget {
        expander: parts.expander.clone().filter(|e| !e.is_empty()),
    });

    if parts.image_on_top {
        let header = container(Region::Row, [image, label]);
        container(Region::Column, [header, widget])
    } else {
        let body = container(Region::Column, [label, widget]);
        container(Region::Row, [image, body])
    }
}

fn container<const N: usize>(make: fn(Vec<Region>) -> Region, items: [Option<Region>; N]) -> Option<Region> {
    let items: Vec<Region> = items.into_iter().flatten().collect();
    (!items.is_empty()).then(|| make(items))
}

/// Draws the leaves of a region tree
pub trait RegionPainter {
    fn image(&mut self, ui: &mut egui::Ui);
    fn label(&mut self, ui: &mut egui::Ui);
    fn widget(&mut self, ui: &mut egui::Ui);
}

pub fn show(region: &Region, ui: &mut egui::Ui, painter: &mut dyn RegionPainter) {
    match region {
        Region::Image => painter.image(ui),
        Region::Label => painter.label(ui),
        Region::Widget { expander: None } => painter.widget(ui),
        Region::Widget { expander: Some(caption) } => {
            egui::CollapsingHeader::new(caption.as_str())
                .default_open(false)
                .show(ui, |ui| painter.widget(ui));
        }
        Region::Row(items) => {
            ui.horizontal_top(|ui| {
                for item in items {
                    show(item, ui, painter);
                }
            });
        }
        Region::Column(items) => {
            ui.vertical(|ui| {
                for item in items {
                    show(item, ui, painter);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Region {
        Region::Widget { expander: None }
    }

    #[test]
    fn test_image_at_side() {
        let parts = LayoutParts {
            image: true,
            label: true,
            widget: true,
            ..Default::default()
        };
        assert_eq!(
            compose(&parts),
            Some(Region::Row(vec![Region::Image, Region::Column(vec![Region::Label, widget()])]))
        );
    }

    #[test]
    fn test_image_on_top() {
        let parts = LayoutParts {
            image: true,
            label: true,
            widget: true,
            image_on_top: true,
            ..Default::default()
        };
        assert_eq!(
            compose(&parts),
            Some(Region::Column(vec![Region::Row(vec![Region::Image, Region::Label]), widget()]))
        );
    }

    #[test]
    fn test_expander_wraps_widget() {
        let parts = LayoutParts {
            widget: true,
            expander: Some("Details".into()),
            ..Default::default()
        };
        assert_eq!(
            compose(&parts),
            Some(Region::Row(vec![Region::Column(vec![Region::Widget {
                expander: Some("Details".into())
            }])]))
        );
    }

    #[test]
    fn test_empty_parts_are_omitted() {
        assert_eq!(compose(&LayoutParts::default()), None);

        let parts = LayoutParts {
            label: true,
            image_on_top: true,
            expander: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            compose(&parts),
            Some(Region::Column(vec![Region::Row(vec![Region::Label])]))
        );
    }
}
