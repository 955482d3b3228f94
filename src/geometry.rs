//! Window geometry
//!
//! Size and position are resolved only after the first frame has been laid
//! out, because the natural content size is not known before that.

use egui::{Pos2, Vec2};

use crate::config::{Edge, Layer};
use crate::error::{DialogError, Result};

/// Margins used when a window is anchored to a screen edge
pub const EDGE_MARGIN_LEFT: f32 = 20.0;
pub const EDGE_MARGIN_RIGHT: f32 = 20.0;
pub const EDGE_MARGIN_TOP: f32 = 10.0;
pub const EDGE_MARGIN_BOTTOM: f32 = 20.0;

/// Offset along one screen axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    /// From the left/top edge
    Near(i32),
    /// From the right/bottom edge
    Far(i32),
}

impl Offset {
    /// Command line coordinates: negative values count from the far edge
    pub fn from_signed(value: i32) -> Self {
        if value < 0 {
            Offset::Far(-value)
        } else {
            Offset::Near(value)
        }
    }

    fn resolve(self, screen: f32, window: f32) -> f32 {
        match self {
            Offset::Near(v) => v as f32,
            Offset::Far(v) => screen - window - v as f32,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryRequest {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub x: Option<Offset>,
    pub y: Option<Offset>,
    pub center: bool,
    pub anchor: Option<Edge>,
    pub maximized: bool,
    pub fullscreen: bool,
}

impl GeometryRequest {
    /// Maximized and fullscreen windows skip size and position handling
    pub fn is_whole_screen(&self) -> bool {
        self.maximized || self.fullscreen
    }

    /// Apply an X11 style `WxH+X+Y` string on top of the current request
    pub fn apply_geometry_string(&mut self, spec: &str) -> Result<()> {
        let parsed = parse_geometry(spec)?;
        if let Some((w, h)) = parsed.size {
            self.width = Some(w as f32);
            self.height = Some(h as f32);
        }
        if let Some((x, y)) = parsed.position {
            self.x = Some(x);
            self.y = Some(y);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParsedGeometry {
    pub size: Option<(u32, u32)>,
    pub position: Option<(Offset, Offset)>,
}

pub fn parse_geometry(spec: &str) -> Result<ParsedGeometry> {
    let bad = |msg: &str| DialogError::invalid("geometry", format!("{spec:?}: {msg}"));
    let spec = spec.trim().trim_start_matches('=');
    let split = spec.find(['+', '-']).unwrap_or(spec.len());
    let (size_part, pos_part) = spec.split_at(split);

    let mut parsed = ParsedGeometry::default();

    if !size_part.is_empty() {
        let (w, h) = size_part
            .split_once(['x', 'X'])
            .ok_or_else(|| bad("size must be WIDTHxHEIGHT"))?;
        let w = w.parse().map_err(|_| bad("bad width"))?;
        let h = h.parse().map_err(|_| bad("bad height"))?;
        parsed.size = Some((w, h));
    }

    if !pos_part.is_empty() {
        let mut offsets = Vec::with_capacity(2);
        let mut rest = pos_part;
        while !rest.is_empty() {
            let sign = &rest[..1];
            let body = &rest[1..];
            let end = body.find(['+', '-']).unwrap_or(body.len());
            let value: i32 = body[..end].parse().map_err(|_| bad("bad offset"))?;
            offsets.push(if sign == "-" { Offset::Far(value) } else { Offset::Near(value) });
            rest = &body[end..];
        }
        match offsets.as_slice() {
            [x, y] => parsed.position = Some((*x, *y)),
            _ => return Err(bad("expected two offsets")),
        }
    }

    Ok(parsed)
}

/// Final window size and, when not left to the window manager, its position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub size: Vec2,
    pub position: Option<Pos2>,
}

/// Resolve the requested geometry against the measured content size.
///
/// `current` is where the window manager put the window; it fills in a
/// missing coordinate when only one of x/y was given. `screen` is the
/// monitor size; without it only absolute near-edge offsets can be honored.
pub fn resolve(request: &GeometryRequest, natural: Vec2, current: Option<Pos2>, screen: Option<Vec2>) -> Placement {
    let size = Vec2::new(
        request.width.unwrap_or(natural.x),
        request.height.unwrap_or(natural.y),
    );

    let position = if request.center {
        screen.map(|s| Pos2::new(((s.x - size.x) / 2.0).max(0.0), ((s.y - size.y) / 2.0).max(0.0)))
    } else if request.x.is_some() || request.y.is_some() {
        let current = current.unwrap_or(Pos2::ZERO);
        let sw = screen.map(|s| s.x);
        let sh = screen.map(|s| s.y);
        let x = match (request.x, sw) {
            (Some(off @ Offset::Near(_)), _) => off.resolve(0.0, size.x),
            (Some(off), Some(sw)) => off.resolve(sw, size.x),
            _ => current.x,
        };
        let y = match (request.y, sh) {
            (Some(off @ Offset::Near(_)), _) => off.resolve(0.0, size.y),
            (Some(off), Some(sh)) => off.resolve(sh, size.y),
            _ => current.y,
        };
        Some(Pos2::new(x, y))
    } else if let (Some(edge), Some(screen)) = (request.anchor, screen) {
        Some(anchor_position(edge, size, screen))
    } else {
        None
    };

    Placement { size, position }
}

/// Position of a window anchored to an edge or corner, centered on the free axis
pub fn anchor_position(edge: Edge, size: Vec2, screen: Vec2) -> Pos2 {
    let left = EDGE_MARGIN_LEFT;
    let right = screen.x - size.x - EDGE_MARGIN_RIGHT;
    let top = EDGE_MARGIN_TOP;
    let bottom = screen.y - size.y - EDGE_MARGIN_BOTTOM;
    let mid_x = (screen.x - size.x) / 2.0;
    let mid_y = (screen.y - size.y) / 2.0;

    match edge {
        Edge::Top => Pos2::new(mid_x, top),
        Edge::Bottom => Pos2::new(mid_x, bottom),
        Edge::Left => Pos2::new(left, mid_y),
        Edge::Right => Pos2::new(right, mid_y),
        Edge::Topleft => Pos2::new(left, top),
        Edge::Topright => Pos2::new(right, top),
        Edge::Bottomleft => Pos2::new(left, bottom),
        Edge::Bottomright => Pos2::new(right, bottom),
    }
}

/// Window level a stacking layer maps to
pub fn layer_level(layer: Layer) -> egui::WindowLevel {
    match layer {
        Layer::Background | Layer::Bottom => egui::WindowLevel::AlwaysOnBottom,
        Layer::Top | Layer::Overlay => egui::WindowLevel::AlwaysOnTop,
    }
}
