//! Workspace overview
//!
//! Two rows of twelve workspace thumbnails along the bottom of a screen.
//! Thumbnails are built by halving each window through the screen's resize
//! buffers before the final scale, which keeps the bilinear filter from
//! skipping most of the source pixels.

use anyhow::Result;

use crate::compositor::OverlayRenderer;
use crate::shared::Geometry;
use crate::wm::display::{Color, DisplayConn, PictOp, Picture};
use crate::wm::focus::GRID_COLUMNS;
use crate::wm::screen::{Screen, WORKSPACE_COUNT};

const MARGIN: i32 = 10;
/// Gap between the lower thumbnail row and the bottom of the screen
const BOTTOM_SKIP: i32 = 10;

const ACTIVE: Color = Color::rgba(0xffff, 0x5050, 0x5050, 0xffff);
const ACTIVE_UNFOCUSED: Color = Color::rgba(0xa0a0, 0x5050, 0x5050, 0xffff);
const EMPTY: Color = Color::rgba(0x5050, 0x5050, 0x5050, 0xffff);
const OCCUPIED: Color = Color::rgba(0x7070, 0x7070, 0x7070, 0xffff);
const SHADE: Color = Color::rgba(0, 0, 0, 0x7f7f);

/// Thumbnail size for a screen: twelve across with margins and group gaps
pub fn thumbnail_size(screen: &Geometry) -> (u32, u32) {
    let width = (screen.width as i64 - MARGIN as i64 * 17).max(0) as u32 / GRID_COLUMNS as u32;
    let height = (screen.height as u64 * width as u64 / screen.width.max(1) as u64) as u32;

    (width, height)
}

/// Top-left corner of workspace `index`'s thumbnail, relative to the screen.
/// Columns are grouped 4 + 4 + 4 with wider gaps between the groups.
pub fn thumbnail_origin(screen: &Geometry, index: usize) -> (i32, i32) {
    let (tw, th) = thumbnail_size(screen);
    let (tw, th) = (tw as i32, th as i32);
    let col = (index % GRID_COLUMNS) as i32;

    let mut x = MARGIN + col * (tw + MARGIN);
    if col > 7 {
        x += 4 * MARGIN;
    } else if col > 3 {
        x += 2 * MARGIN;
    }

    let h = screen.height as i32;
    let y = if index < GRID_COLUMNS {
        h - 2 * th - 2 * MARGIN - BOTTOM_SKIP
    } else {
        h - th - MARGIN - BOTTOM_SKIP
    };

    (x, y)
}

/// The default overlay: a thumbnail grid of all 24 workspaces
#[derive(Debug, Default)]
pub struct WorkspaceGrid;

impl WorkspaceGrid {
    fn border(
        conn: &dyn DisplayConn,
        dst: Picture,
        color: Color,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) -> Result<()> {
        let rects = [
            Geometry::new(x - 1, y - 1, 1, h + 2),
            Geometry::new(x + w as i32, y - 1, 1, h + 2),
            Geometry::new(x - 1, y - 1, w + 2, 1),
            Geometry::new(x - 1, y + h as i32, w + 2, 1),
        ];
        for r in rects {
            conn.fill_rectangle(PictOp::Src, dst, color, r)?;
        }

        Ok(())
    }

    /// Draw `src`, `size` pixels large, into the `to` rectangle of `dst`.
    /// `scale` is the ratio between the two.
    fn scaled(
        conn: &dyn DisplayConn,
        resize_buffers: &[Picture],
        src: Picture,
        size: (u32, u32),
        dst: Picture,
        to: Geometry,
        scale: f64,
    ) -> Result<()> {
        let mut current = src;
        let mut remaining = scale;
        let (mut w, mut h) = size;

        for &buf in resize_buffers {
            if remaining > 0.5 {
                break;
            }
            w /= 2;
            h /= 2;
            conn.set_picture_scale(current, 0.5)?;
            conn.composite(PictOp::Src, current, buf, 0, 0, w, h)?;
            conn.set_picture_scale(current, 1.0)?;
            current = buf;
            remaining *= 2.0;
        }

        conn.set_picture_scale(current, remaining)?;
        conn.composite(PictOp::Src, current, dst, to.x, to.y, to.width, to.height)?;
        conn.set_picture_scale(current, 1.0)
    }
}

impl OverlayRenderer for WorkspaceGrid {
    fn draw(&mut self, conn: &dyn DisplayConn, screen: &Screen, active: bool) -> Result<()> {
        let Some(surfaces) = &screen.surfaces else {
            return Ok(());
        };
        let g = screen.geometry;
        let (tw, th) = thumbnail_size(&g);
        if tw == 0 || th == 0 {
            return Ok(());
        }
        let scale = tw as f64 / g.width as f64;

        for i in 0..WORKSPACE_COUNT {
            let (x, y) = thumbnail_origin(&g, i);
            let windows = &screen.workspaces[i];

            let color = if i == screen.active_workspace {
                if active {
                    ACTIVE
                } else {
                    ACTIVE_UNFOCUSED
                }
            } else if windows.is_empty() {
                EMPTY
            } else {
                OCCUPIED
            };
            Self::border(conn, surfaces.buffer, color, x, y, tw, th)?;

            if windows.is_empty() {
                let tile = Geometry::new(x, y, tw, th);
                conn.fill_rectangle(PictOp::Over, surfaces.buffer, SHADE, tile)?;
                continue;
            }

            for c in windows {
                let Some(picture) = c.picture() else {
                    continue;
                };
                let p = c.position;
                let to = Geometry::new(
                    x + ((p.x - g.x) as i64 * tw as i64 / g.width as i64) as i32,
                    y + ((p.y - g.y) as i64 * tw as i64 / g.width as i64) as i32,
                    (p.width as u64 * tw as u64 / g.width as u64) as u32,
                    (p.height as u64 * tw as u64 / g.width as u64) as u32,
                );
                Self::scaled(
                    conn,
                    &surfaces.resize_buffers,
                    picture,
                    (p.width, p.height),
                    surfaces.buffer,
                    to,
                    scale,
                )?;
            }
        }

        Ok(())
    }
}
