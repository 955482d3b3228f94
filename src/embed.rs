//! X11 embedding of plug windows into a container window

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConfigureWindowAux, ConnectionExt};
use x11rb::rust_connection::RustConnection;

use tracing::debug;

use crate::error::Result;

/// Is an X11 display reachable for this process
pub fn x11_available() -> bool {
    std::env::var_os("DISPLAY").is_some_and(|d| !d.is_empty())
}

/// Area a child occupies inside the container, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildArea {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ChildArea {
    pub fn from_rect(rect: egui::Rect, pixels_per_point: f32) -> Self {
        Self {
            x: (rect.min.x * pixels_per_point).round() as i32,
            y: (rect.min.y * pixels_per_point).round() as i32,
            width: (rect.width() * pixels_per_point).round().max(1.0) as u32,
            height: (rect.height() * pixels_per_point).round().max(1.0) as u32,
        }
    }
}

pub struct Embedder {
    conn: RustConnection,
    parent: u32,
}

impl Embedder {
    pub fn connect(parent: u64) -> Result<Self> {
        let (conn, _screen) = x11rb::connect(None)?;
        Ok(Self {
            conn,
            parent: parent as u32,
        })
    }

    /// Make `child` a subwindow of the container
    pub fn adopt(&self, child: u64) -> Result<()> {
        debug!("Reparenting 0x{:X} into 0x{:X}", child, self.parent);
        self.conn.unmap_window(child as u32)?;
        self.conn.reparent_window(child as u32, self.parent, 0, 0)?;
        self.conn.flush()?;
        Ok(())
    }

    pub fn place(&self, child: u64, area: ChildArea) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(area.x)
            .y(area.y)
            .width(area.width)
            .height(area.height);
        self.conn.configure_window(child as u32, &aux)?;
        self.conn.map_window(child as u32)?;
        self.conn.flush()?;
        Ok(())
    }

    pub fn hide(&self, child: u64) -> Result<()> {
        self.conn.unmap_window(child as u32)?;
        self.conn.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_area_scaling() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(100.0, 50.0));
        let area = ChildArea::from_rect(rect, 2.0);
        assert_eq!(
            area,
            ChildArea {
                x: 20,
                y: 40,
                width: 200,
                height: 100
            }
        );
    }
}
