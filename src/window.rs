//! Window assembler
//!
//! Turns a `DialogConfig` into viewport settings, the button bar, the text
//! label and the effective geometry request. Everything that needs a live
//! frame is in `gui.rs`.

use std::io::Write;
use std::sync::Arc;

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use tracing::{debug, warn};

use crate::config::{ButtonSpec, DialogConfig, XidTarget};
use crate::error::Result;
use crate::geometry::{self, GeometryRequest};
use crate::response::ResultCode;
use crate::text;

pub fn viewport(config: &DialogConfig) -> egui::ViewportBuilder {
    let win = &config.window;
    let plugged = config.is_plug();

    let mut vp = egui::ViewportBuilder::default()
        .with_title(config.title())
        .with_app_id("dialogbox")
        .with_decorations(!(win.undecorated || win.splash || plugged))
        .with_taskbar(!(win.skip_taskbar || win.splash || plugged))
        .with_resizable(!win.fixed)
        .with_active(!win.no_focus);

    if win.on_top {
        vp = vp.with_always_on_top();
    }
    if let Some(layer) = win.layer {
        debug!("No layer-shell surface, emulating {:?} with the window level", layer);
        vp = vp.with_window_level(geometry::layer_level(layer));
    }
    if win.sticky {
        debug!("Sticky windows are not supported, ignoring");
    }
    if let Some(icon) = config.common.window_icon.as_deref().and_then(load_icon) {
        vp = vp.with_icon(Arc::new(icon));
    }

    let geo = &win.geometry;
    if let (Some(w), Some(h)) = (geo.width, geo.height) {
        vp = vp.with_inner_size([w, h]);
    }
    if geo.maximized {
        vp = vp.with_maximized(true);
    }
    if geo.fullscreen {
        vp = vp.with_fullscreen(true);
    }
    vp
}

/// Geometry after splash and edge anchoring are folded in
pub fn geometry_request(config: &DialogConfig) -> GeometryRequest {
    let mut request = config.window.geometry.clone();
    if config.window.splash {
        request.center = true;
    }
    if request.anchor.is_none() {
        request.anchor = config.window.edge;
    }
    if config.window.mouse {
        debug!("Placing at the pointer is not supported, leaving position to the window manager");
    }
    request
}

/// The buttons to show, left to right
pub fn button_bar(config: &DialogConfig) -> Vec<ButtonSpec> {
    if config.buttons.no_buttons {
        return Vec::new();
    }
    if config.has_custom_buttons() {
        return config.buttons.buttons.clone();
    }
    if config.mode.uses_close_button() {
        return vec![ButtonSpec::new("Close", ResultCode::OK)];
    }

    let ok = ButtonSpec::new("OK", ResultCode::OK);
    let cancel = ButtonSpec::new("Cancel", ResultCode::CANCEL);
    if config.buttons.alt_order {
        vec![ok, cancel]
    } else {
        vec![cancel, ok]
    }
}

/// Dialog text with escapes processed and markup removed
pub fn label_text(config: &DialogConfig) -> Option<String> {
    let raw = config.common.text.as_deref().filter(|t| !t.is_empty())?;
    let text = text::unescape(raw);
    Some(if config.common.no_markup {
        text
    } else {
        text::strip_markup(&text)
    })
}

pub fn load_icon(path: &std::path::Path) -> Option<egui::IconData> {
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            Some(egui::IconData {
                rgba: rgba.into_raw(),
                width,
                height,
            })
        }
        Err(e) => {
            warn!("Window icon {:?} not loaded: {}", path, e);
            None
        }
    }
}

/// X11 window id of the realized window, `None` on other backends
pub fn native_handle(frame: &eframe::Frame) -> Option<u64> {
    let handle = frame.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Xlib(h) => Some(h.window as u64),
        RawWindowHandle::Xcb(h) => Some(u64::from(h.window.get())),
        other => {
            debug!("No X11 window id for {:?}", other);
            None
        }
    }
}

pub fn format_xid(handle: u64) -> String {
    format!("0x{handle:X}\n")
}

pub fn export_xid(target: &XidTarget, handle: u64) -> Result<()> {
    let line = format_xid(handle);
    match target {
        XidTarget::Stderr => std::io::stderr().write_all(line.as_bytes())?,
        XidTarget::File(path) => std::fs::write(path, line)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    fn labels(buttons: &[ButtonSpec]) -> Vec<&str> {
        buttons.iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn test_default_buttons() {
        let config = DialogConfig::new(Mode::Entry);
        assert_eq!(labels(&button_bar(&config)), ["Cancel", "OK"]);

        let mut config = DialogConfig::new(Mode::Entry);
        config.buttons.alt_order = true;
        assert_eq!(labels(&button_bar(&config)), ["OK", "Cancel"]);
    }

    #[test]
    fn test_close_button_modes() {
        let bar = button_bar(&DialogConfig::new(Mode::Progress));
        assert_eq!(bar, vec![ButtonSpec::new("Close", ResultCode::OK)]);
    }

    #[test]
    fn test_custom_and_suppressed_buttons() {
        let mut config = DialogConfig::new(Mode::Progress);
        config.buttons.buttons = vec![ButtonSpec::new("Stop", ResultCode(3))];
        assert_eq!(labels(&button_bar(&config)), ["Stop"]);

        config.buttons.no_buttons = true;
        assert!(button_bar(&config).is_empty());
    }

    #[test]
    fn test_label_text() {
        let mut config = DialogConfig::new(Mode::Message);
        assert_eq!(label_text(&config), None);

        config.common.text = Some("<b>Hello</b>\\nworld".into());
        assert_eq!(label_text(&config).as_deref(), Some("Hello\nworld"));

        config.common.no_markup = true;
        assert_eq!(label_text(&config).as_deref(), Some("<b>Hello</b>\nworld"));
    }

    #[test]
    fn test_splash_centers() {
        let mut config = DialogConfig::new(Mode::Message);
        config.window.splash = true;
        assert!(geometry_request(&config).center);
    }

    #[test]
    fn test_xid_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xid");
        export_xid(&XidTarget::File(path.clone()), 0x3a00007).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "0x3A00007\n");
    }
}
