//! GUI rendering using egui/eframe
//!
//! One window per process. Every frame drains the event channel (signals,
//! ticks), handles keys, close and focus changes, draws the layout and the
//! button bar, and routes everything that may end the dialog through the
//! session.

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use eframe::egui::{self, Color32, CornerRadius, Key, Margin, Modifiers, RichText, Stroke, Vec2};
use tracing::{debug, info, warn};

use crate::arbiter::{Step, TerminationEvent};
use crate::config::{ButtonLayout, ButtonSpec, DialogConfig, IndicatorPlacement, Mode, TextAlign};
use crate::countdown::IndicatorUpdate;
use crate::error::{DialogError, Result};
use crate::geometry::{self, GeometryRequest};
use crate::layout::{self, LayoutParts, Region, RegionPainter};
use crate::modes::{ModeWidget, WidgetSignal};
use crate::plug::{PlugSlot, SharedSegment};
use crate::session::{DialogSession, LoopEvent};
use crate::window;

/// Frames drawn before the natural size is trusted
const SETTLE_FRAMES: u32 = 2;

/// Thickness of the timeout indicator
const INDICATOR_SIZE: f32 = 8.0;

const IMAGE_SIZE: f32 = 64.0;

/// Minimum button width plus spacing
const BUTTON_SLOT: f32 = 98.0;

struct Theme {
    bg_primary: Color32,
    bg_secondary: Color32,
    fg_primary: Color32,
    fg_secondary: Color32,
    accent: Color32,
    danger: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg_primary: Color32::from_rgb(24, 24, 27),      // zinc-900
            bg_secondary: Color32::from_rgb(39, 39, 42),    // zinc-800
            fg_primary: Color32::from_rgb(250, 250, 250),   // zinc-50
            fg_secondary: Color32::from_rgb(161, 161, 170), // zinc-400
            accent: Color32::from_rgb(59, 130, 246),        // blue-500
            danger: Color32::from_rgb(239, 68, 68),         // red-500
        }
    }
}

/// Sizes measured while drawing, used to find the natural window size
#[derive(Debug, Default, Clone, Copy)]
struct Measured {
    content: Vec2,
    buttons: Vec2,
    indicator: Vec2,
}

pub struct DialogApp {
    session: Rc<RefCell<DialogSession>>,
    config: std::sync::Arc<DialogConfig>,
    /// Signals and ticks from the tokio bridge
    events: Receiver<LoopEvent>,
    theme: Theme,
    label: Option<String>,
    image: Option<PathBuf>,
    region: Option<Region>,
    buttons: Vec<ButtonSpec>,
    geometry: GeometryRequest,
    plug: Option<PlugSlot<SharedSegment>>,
    frames: u32,
    realized: bool,
    was_focused: bool,
    closing: bool,
    measured: Measured,
}

impl DialogApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        session: Rc<RefCell<DialogSession>>,
        events: Receiver<LoopEvent>,
        plug: Option<PlugSlot<SharedSegment>>,
    ) -> Self {
        let config = session.borrow().shared_config();

        let label = if config.mode == Mode::DragAndDrop && config.options.tooltip {
            None
        } else {
            window::label_text(&config)
        };
        let image = config.common.image.clone().filter(|p| {
            let exists = p.exists();
            if !exists {
                warn!("Image {:?} not found, leaving it out", p);
            }
            exists
        });
        let has_widget = !matches!(config.mode, Mode::Message | Mode::Version | Mode::Print);
        let region = layout::compose(&LayoutParts {
            image: image.is_some(),
            label: label.is_some(),
            widget: has_widget,
            expander: config.common.expander.clone(),
            image_on_top: config.common.image_on_top,
        });

        Self {
            buttons: window::button_bar(&config),
            geometry: window::geometry_request(&config),
            session,
            events,
            theme: Theme::default(),
            label,
            image,
            region,
            plug,
            frames: 0,
            realized: false,
            was_focused: false,
            closing: false,
            measured: Measured::default(),
            config,
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, event: LoopEvent) {
        let step = self.session.borrow_mut().dispatch(event);
        self.handle_step(ctx, step);
    }

    fn handle_step(&mut self, ctx: &egui::Context, step: Step) {
        match step {
            Step::Continue | Step::ConfirmOverwrite(_) => {}
            Step::Exit => {
                if !self.closing {
                    debug!("Closing window");
                    self.closing = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
            Step::Launch(cmd) => launch_detached(&cmd),
            Step::PrintNow => {
                if let Some(output) = self.session.borrow().current_output() {
                    emit(&output);
                }
            }
        }
    }

    /// First frame with a live window: publish the native handle
    fn realize(&mut self, frame: &eframe::Frame) {
        self.realized = true;
        let Some(handle) = window::native_handle(frame) else {
            return;
        };
        info!("Window realized as 0x{:X}", handle);
        std::env::set_var("DIALOGBOX_XID", format!("0x{handle:X}"));

        if let Some(target) = &self.config.window.print_xid {
            if let Err(e) = window::export_xid(target, handle) {
                warn!("Unable to export window id: {}", e);
            }
        }
        if let Some(plug) = self.plug.take() {
            plug.publish(std::process::id() as i32, handle);
        }
        self.session.borrow_mut().widget_mut().realized(handle);
    }

    fn route(&mut self, ctx: &egui::Context, signal: WidgetSignal) {
        match signal {
            WidgetSignal::Emit(line) => emit(&line),
            signal => {
                let step = self.session.borrow_mut().apply(signal);
                self.handle_step(ctx, step);
            }
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        // the overwrite prompt owns the keyboard while it is open
        let prompting = self.session.borrow().awaiting_confirmation();
        if !self.config.is_plug() && !prompting {
            if ctx.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Escape)) {
                self.dispatch(ctx, LoopEvent::Termination(TerminationEvent::KeyEscape));
            }
            if ctx.input_mut(|i| i.consume_key(Modifiers::CTRL, Key::Enter)) {
                self.dispatch(ctx, LoopEvent::Termination(TerminationEvent::KeyConfirm));
            }
        }

        if ctx.input(|i| i.viewport().close_requested()) && !self.closing {
            self.closing = true;
            let step = self
                .session
                .borrow_mut()
                .dispatch(LoopEvent::Termination(TerminationEvent::WindowClosed));
            debug!("Close requested, {:?}", step);
        }

        let focused = ctx.input(|i| i.viewport().focused).unwrap_or(self.was_focused);
        if self.was_focused && !focused {
            self.dispatch(ctx, LoopEvent::Termination(TerminationEvent::FocusLost));
        }
        self.was_focused = focused;
    }

    /// Resize and move once the content has been laid out
    fn settle_geometry(&mut self, ctx: &egui::Context) {
        if self.config.is_plug() || self.geometry.is_whole_screen() {
            return;
        }
        let margin = 2.0 * self.config.borders() as f32;
        let m = self.measured;
        let natural = Vec2::new(
            m.content.x.max(m.buttons.x) + margin + m.indicator.x,
            m.content.y + margin + m.buttons.y + m.indicator.y,
        )
        .max(Vec2::new(240.0, 60.0));

        let (current, monitor) = ctx.input(|i| {
            let vp = i.viewport();
            (vp.outer_rect.map(|r| r.min), vp.monitor_size)
        });
        let placement = geometry::resolve(&self.geometry, natural, current, monitor);
        debug!("Natural size {:?}, placement {:?}", natural, placement);

        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(placement.size));
        if let Some(pos) = placement.position {
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(pos));
        }
    }

    fn render_indicator(&mut self, ctx: &egui::Context, indicator: &IndicatorUpdate) {
        let placement = self.config.termination.indicator;
        let frame = egui::Frame::new().fill(self.theme.bg_primary).inner_margin(Margin::same(2));
        let theme = &self.theme;
        let draw = |ui: &mut egui::Ui| paint_indicator(ui, theme, indicator, placement.is_vertical());

        let rect = match placement {
            IndicatorPlacement::None => return,
            IndicatorPlacement::Top => egui::TopBottomPanel::top("indicator")
                .exact_height(INDICATOR_SIZE + 4.0)
                .frame(frame)
                .show(ctx, draw)
                .response
                .rect,
            IndicatorPlacement::Bottom => egui::TopBottomPanel::bottom("indicator")
                .exact_height(INDICATOR_SIZE + 4.0)
                .frame(frame)
                .show(ctx, draw)
                .response
                .rect,
            IndicatorPlacement::Left => egui::SidePanel::left("indicator")
                .exact_width(INDICATOR_SIZE + 4.0)
                .resizable(false)
                .frame(frame)
                .show(ctx, draw)
                .response
                .rect,
            IndicatorPlacement::Right => egui::SidePanel::right("indicator")
                .exact_width(INDICATOR_SIZE + 4.0)
                .resizable(false)
                .frame(frame)
                .show(ctx, draw)
                .response
                .rect,
        };
        self.measured.indicator = if placement.is_vertical() {
            Vec2::new(rect.width(), 0.0)
        } else {
            Vec2::new(0.0, rect.height())
        };
    }

    fn render_buttons(&mut self, ctx: &egui::Context) -> Option<TerminationEvent> {
        if self.buttons.is_empty() {
            self.measured.buttons = Vec2::ZERO;
            return None;
        }
        let margin = Margin::same(self.config.borders().min(120) as i8 + 4);
        let mut pressed = None;
        let layout = self.config.buttons.layout;
        let buttons = &self.buttons;
        let theme = &self.theme;

        let response = egui::TopBottomPanel::bottom("button_bar")
            .frame(egui::Frame::new().fill(theme.bg_primary).inner_margin(margin))
            .show(ctx, |ui| {
                let mut add = |ui: &mut egui::Ui, spec: &ButtonSpec| {
                    let fill = if spec.response.is_affirmative() {
                        theme.accent
                    } else {
                        theme.bg_secondary
                    };
                    let button = egui::Button::new(RichText::new(&spec.label).size(14.0))
                        .fill(fill)
                        .corner_radius(CornerRadius::same(4))
                        .min_size(Vec2::new(90.0, 30.0));
                    if ui.add(button).clicked() {
                        pressed = Some(TerminationEvent::ButtonPressed {
                            response: spec.response,
                            command: spec.command.clone(),
                        });
                    }
                };

                match layout {
                    ButtonLayout::Start => {
                        ui.horizontal(|ui| buttons.iter().for_each(|b| add(ui, b)))
                            .response
                            .rect
                            .width()
                    }
                    ButtonLayout::End => {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            buttons.iter().rev().for_each(|b| add(ui, b))
                        });
                        buttons.len() as f32 * BUTTON_SLOT
                    }
                    ButtonLayout::Center => {
                        ui.vertical_centered(|ui| ui.horizontal(|ui| buttons.iter().for_each(|b| add(ui, b))).response)
                            .inner
                            .rect
                            .width()
                    }
                    ButtonLayout::Spread | ButtonLayout::Edge => {
                        let last = buttons.len() - 1;
                        ui.columns(buttons.len(), |cols| {
                            for (i, (col, spec)) in cols.iter_mut().zip(buttons).enumerate() {
                                let align = match (layout, i) {
                                    (ButtonLayout::Edge, 0) => egui::Align::Min,
                                    (ButtonLayout::Edge, i) if i == last => egui::Align::Max,
                                    _ => egui::Align::Center,
                                };
                                col.with_layout(egui::Layout::top_down(align), |ui| add(ui, spec));
                            }
                        });
                        buttons.len() as f32 * BUTTON_SLOT
                    }
                }
            });

        self.measured.buttons = Vec2::new(response.inner, response.response.rect.height());
        pressed
    }

    fn render_body(&mut self, ctx: &egui::Context) -> WidgetSignal {
        let margin = Margin::same(self.config.borders().min(127) as i8);
        let session = Rc::clone(&self.session);
        let mut session = session.borrow_mut();

        let mut painter = BodyPainter {
            label: self.label.as_deref(),
            image: self.image.as_ref(),
            align: self.config.common.text_align,
            selectable: self.config.common.selectable_labels,
            theme: &self.theme,
            widget: session.widget_mut(),
            signal: WidgetSignal::None,
        };

        let content = egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(self.theme.bg_primary).inner_margin(margin))
            .show(ctx, |ui| {
                if let Some(region) = &self.region {
                    layout::show(region, ui, &mut painter);
                }
                ui.min_rect().size()
            })
            .inner;

        self.measured.content = content;
        painter.signal
    }

    fn render_overwrite_prompt(&mut self, ctx: &egui::Context) {
        let target = self.session.borrow().overwrite_target();
        let modal = egui::Modal::new(egui::Id::new("overwrite_prompt")).show(ctx, |ui| {
            ui.set_width(320.0);
            ui.label(RichText::new("File exists").strong().size(16.0));
            ui.add_space(8.0);
            if let Some(path) = &target {
                ui.label(format!("{} already exists. Overwrite it?", path.display()));
            }
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    return Some(false);
                }
                if ui
                    .add(egui::Button::new("Overwrite").fill(self.theme.danger))
                    .clicked()
                {
                    return Some(true);
                }
                None
            })
            .inner
        });

        let answer = modal.inner.or_else(|| modal.should_close().then_some(false));
        if let Some(accepted) = answer {
            let step = self.session.borrow_mut().resolve_overwrite(accepted);
            self.handle_step(ctx, step);
        }
    }

    fn apply_style(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        style.visuals.dark_mode = true;
        style.visuals.override_text_color = Some(self.theme.fg_primary);
        style.visuals.panel_fill = self.theme.bg_primary;
        style.visuals.widgets.noninteractive.bg_fill = self.theme.bg_secondary;
        style.visuals.widgets.inactive.bg_fill = self.theme.bg_secondary;
        style.visuals.widgets.hovered.bg_fill = self.theme.accent;
        style.visuals.selection.bg_fill = self.theme.accent.linear_multiply(0.5);
        ctx.set_style(style);
    }
}

impl eframe::App for DialogApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if !self.realized {
            self.apply_style(ctx);
            self.realize(frame);
        }

        while let Ok(event) = self.events.try_recv() {
            self.dispatch(ctx, event);
        }
        self.handle_input(ctx);

        let indicator = self.session.borrow().indicator().cloned();
        if let Some(indicator) = &indicator {
            self.render_indicator(ctx, indicator);
        }

        if let Some(event) = self.render_buttons(ctx) {
            self.dispatch(ctx, LoopEvent::Termination(event));
        }

        let polled = self.session.borrow_mut().widget_mut().poll();
        self.route(ctx, polled);
        let signal = self.render_body(ctx);
        self.route(ctx, signal);

        if self.session.borrow().awaiting_confirmation() {
            self.render_overwrite_prompt(ctx);
        }

        self.frames += 1;
        if self.frames == SETTLE_FRAMES {
            self.settle_geometry(ctx);
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

struct BodyPainter<'a> {
    label: Option<&'a str>,
    image: Option<&'a PathBuf>,
    align: TextAlign,
    selectable: bool,
    theme: &'a Theme,
    widget: &'a mut dyn ModeWidget,
    signal: WidgetSignal,
}

impl RegionPainter for BodyPainter<'_> {
    fn image(&mut self, ui: &mut egui::Ui) {
        if let Some(path) = self.image {
            ui.add(
                egui::Image::new(format!("file://{}", path.display()))
                    .max_size(Vec2::splat(IMAGE_SIZE))
                    .maintain_aspect_ratio(true),
            );
        }
    }

    fn label(&mut self, ui: &mut egui::Ui) {
        let Some(text) = self.label else { return };
        let layout = match self.align {
            TextAlign::Left => egui::Layout::top_down(egui::Align::Min),
            TextAlign::Right => egui::Layout::top_down(egui::Align::Max),
            TextAlign::Center => egui::Layout::top_down(egui::Align::Center),
            TextAlign::Fill => egui::Layout::top_down_justified(egui::Align::Min),
        };
        ui.with_layout(layout, |ui| {
            let label = egui::Label::new(RichText::new(text).size(14.0).color(self.theme.fg_secondary))
                .selectable(self.selectable)
                .wrap();
            ui.add(label);
        });
        ui.add_space(8.0);
    }

    fn widget(&mut self, ui: &mut egui::Ui) {
        let signal = self.widget.show(ui);
        if signal != WidgetSignal::None {
            self.signal = signal;
        }
    }
}

/// Horizontal or vertical fraction bar, in the style of a shrinking timer
fn paint_indicator(ui: &mut egui::Ui, theme: &Theme, indicator: &IndicatorUpdate, vertical: bool) {
    let full = ui.available_rect_before_wrap();
    let fraction = indicator.fraction.clamp(0.0, 1.0);
    let color = if fraction > 0.3 { theme.accent } else { theme.danger };

    let filled = if vertical {
        egui::Rect::from_min_max(egui::pos2(full.min.x, full.max.y - full.height() * fraction), full.max)
    } else {
        egui::Rect::from_min_size(full.min, Vec2::new(full.width() * fraction, full.height()))
    };
    ui.painter().rect_filled(full, CornerRadius::same(3), theme.bg_secondary);
    ui.painter().rect_filled(filled, CornerRadius::same(3), color);

    if let Some(caption) = &indicator.caption {
        ui.painter().text(
            full.center(),
            egui::Align2::CENTER_CENTER,
            caption,
            egui::FontId::proportional(9.0),
            theme.fg_primary,
        );
    }
    ui.painter()
        .rect_stroke(full, CornerRadius::same(3), Stroke::new(1.0, theme.fg_secondary.linear_multiply(0.2)), egui::StrokeKind::Inside);
    ui.allocate_rect(full, egui::Sense::hover());
}

/// Print one line of result text to stdout
pub fn emit(text: &str) {
    let mut out = std::io::stdout().lock();
    let result = if text.ends_with('\n') {
        out.write_all(text.as_bytes())
    } else {
        writeln!(out, "{text}")
    };
    if let Err(e) = result.and_then(|_| out.flush()) {
        warn!("Unable to write result: {}", e);
    }
}

/// Fire and forget: the dialog never waits for or kills the command
pub fn launch_detached(cmd: &str) {
    debug!("Launching {:?}", cmd);
    let spawned = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .spawn();
    if let Err(e) = spawned {
        warn!("Unable to launch {:?}: {}", cmd, e);
    }
}

/// Run the dialog window on the current thread until it closes
pub fn run(
    session: Rc<RefCell<DialogSession>>,
    events: Receiver<LoopEvent>,
    plug: Option<PlugSlot<SharedSegment>>,
) -> Result<()> {
    let config = session.borrow().shared_config();
    let mut viewport = window::viewport(&config);
    if config.window.geometry.width.is_none() || config.window.geometry.height.is_none() {
        viewport = viewport.with_inner_size([360.0, 160.0]);
    }
    let options = eframe::NativeOptions {
        viewport,
        centered: config.window.geometry.center || config.window.splash,
        ..Default::default()
    };

    eframe::run_native(
        "dialogbox",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DialogApp::new(cc, session, events, plug)))
        }),
    )
    .map_err(|e| DialogError::Window(e.to_string()))
}
