//! Compositor Module
//!
//! Damage-driven XRender repaint. Each screen's visible windows are composed
//! into an off-screen buffer which is then copied to the screen's window.

pub mod overview;

use anyhow::Result;
use tracing::trace;

use crate::shared::Geometry;
use crate::wm::display::{Color, DisplayConn, PictOp};
use crate::wm::screen::Screen;
use crate::wm::session::Session;

/// Draws a summary of a screen's workspaces over its composed buffer
pub trait OverlayRenderer {
    /// `active` is true for the screen that currently has focus
    fn draw(&mut self, conn: &dyn DisplayConn, screen: &Screen, active: bool) -> Result<()>;
}

pub struct Compositor {
    overlay: Box<dyn OverlayRenderer>,
    /// Clip incremental repaints to the damaged rectangles
    partial_clip: bool,
}

impl Compositor {
    pub fn new(overlay: Box<dyn OverlayRenderer>, partial_clip: bool) -> Self {
        Self {
            overlay,
            partial_clip,
        }
    }

    /// Whether anything on screen is stale
    pub fn needs_repaint(session: &Session) -> bool {
        session.repaint_all || session.damage_pending
    }

    /// Recompose every screen that needs it and present the result
    pub fn paint<D: DisplayConn>(&mut self, conn: &D, session: &mut Session) -> Result<()> {
        let repaint_all = session.repaint_all;
        let showing_overlay = session.showing_overlay;
        let active_screen = session.active_screen;

        for (idx, screen) in session.screens.iter_mut().enumerate() {
            let (buffer, front) = match &screen.surfaces {
                Some(s) => (s.buffer, s.picture),
                None => continue,
            };
            let draw_overlay = showing_overlay || screen.active_is_empty();
            let full = draw_overlay || repaint_all;

            if !full && screen.damage.is_empty() {
                continue;
            }

            let clip = (!full && self.partial_clip).then_some(screen.damage.as_slice());
            conn.set_clip_rectangles(buffer, clip)?;

            let g = screen.geometry;
            let area = Geometry::new(0, 0, g.width, g.height);
            trace!("Painting screen {} (full={}, overlay={})", idx, full, draw_overlay);

            conn.fill_rectangle(PictOp::Src, buffer, Color::BLACK, area)?;

            for c in screen.ancillary.iter().chain(screen.active_windows()) {
                let Some(picture) = c.picture() else {
                    continue;
                };
                let r = c.real_position;
                let (x, y) = (r.x - g.x, r.y - g.y);
                conn.composite(PictOp::Src, picture, buffer, x, y, r.width, r.height)?;
            }

            if draw_overlay {
                self.overlay.draw(conn, screen, idx == active_screen)?;
            }

            conn.composite(PictOp::Src, buffer, front, 0, 0, area.width, area.height)?;
            screen.damage.clear();
        }

        session.repaint_all = false;
        session.damage_pending = false;

        Ok(())
    }
}
